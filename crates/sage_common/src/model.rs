//! Local model client and session.
//!
//! HTTP client for an Ollama-compatible endpoint on loopback. All inference
//! is on-device; nothing leaves the machine.
//!
//! Endpoints used:
//! - GET / - health check
//! - GET /api/tags - list installed models
//! - POST /api/generate - one prompt, one completion
//! - POST /api/pull - download a model (streaming NDJSON)

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ModelConfig;
use crate::error::SageError;

/// Default local endpoint.
pub const DEFAULT_MODEL_URL: &str = "http://127.0.0.1:11434";

/// Timeout for health checks and tag listing (ms).
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 2000;

/// Capability state of the local model host, as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Service unreachable: no local inference possible.
    Unavailable,
    /// Service up, but the configured model is not installed yet.
    Downloadable,
    /// Service up and the model is ready to run.
    Available,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Availability::Unavailable => "unavailable",
            Availability::Downloadable => "downloadable",
            Availability::Available => "available",
        };
        f.write_str(s)
    }
}

/// Full capability probe result, for `sagectl status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub availability: Availability,
    pub url: String,
    pub models: Vec<String>,
    pub selected_model: Option<String>,
    pub error: Option<String>,
}

/// A model known to the local service.
#[derive(Debug, Clone, Deserialize)]
pub struct InstalledModel {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<InstalledModel>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

/// Generation options sent with every request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub num_predict: i32,
    pub top_p: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Clone, Serialize)]
struct PullRequest {
    name: String,
    stream: bool,
}

/// One progress line from a streaming pull.
#[derive(Debug, Clone, Deserialize)]
pub struct PullProgress {
    pub status: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl PullProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}

/// Client for the local model service.
#[derive(Debug, Clone)]
pub struct ModelClient {
    base_url: String,
    timeout_ms: u64,
    options: GenerateOptions,
}

impl ModelClient {
    /// Build a client from configuration.
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.num_predict,
                top_p: config.top_p,
            },
        }
    }

    fn http(&self, timeout_ms: u64) -> Result<reqwest::Client, SageError> {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| SageError::ModelCallFailed(e.to_string()))
    }

    /// Quick reachability probe against the service root.
    pub async fn is_reachable(&self) -> bool {
        let Ok(client) = self.http(HEALTH_CHECK_TIMEOUT_MS) else {
            return false;
        };
        match client.get(&self.base_url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List models installed on the local service.
    pub async fn list_models(&self) -> Result<Vec<InstalledModel>, SageError> {
        let client = self.http(HEALTH_CHECK_TIMEOUT_MS)?;
        let url = format!("{}/api/tags", self.base_url);
        let resp = client.get(&url).send().await.map_err(map_transport_error)?;

        if !resp.status().is_success() {
            return Err(SageError::ModelCallFailed(format!(
                "tags request returned {}",
                resp.status()
            )));
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| SageError::ModelCallFailed(format!("bad tags response: {}", e)))?;
        Ok(tags.models)
    }

    /// Capability state for one configured model.
    ///
    /// Unreachable service dominates; a reachable service without the model
    /// reports `Downloadable`.
    pub async fn availability(&self, model: &str) -> Availability {
        match self.list_models().await {
            Ok(models) => {
                if model_installed(&models, model) {
                    Availability::Available
                } else {
                    Availability::Downloadable
                }
            }
            Err(_) => Availability::Unavailable,
        }
    }

    /// Full probe for the status command.
    pub async fn status(&self, selected_model: Option<&str>) -> ModelStatus {
        let mut status = ModelStatus {
            availability: Availability::Unavailable,
            url: self.base_url.clone(),
            models: Vec::new(),
            selected_model: selected_model.map(str::to_string),
            error: None,
        };

        match self.list_models().await {
            Ok(models) => {
                status.models = models.iter().map(|m| m.name.clone()).collect();
                match selected_model {
                    Some(model) if model_installed(&models, model) => {
                        status.availability = Availability::Available;
                    }
                    Some(model) => {
                        status.availability = Availability::Downloadable;
                        status.error = Some(format!("Model '{}' not downloaded", model));
                    }
                    None => {
                        // No model picked: report the service state only.
                        status.availability = if status.models.is_empty() {
                            Availability::Downloadable
                        } else {
                            Availability::Available
                        };
                    }
                }
            }
            Err(e) => {
                status.error = Some(e.to_string());
            }
        }

        status
    }

    /// Create a reusable session against one model.
    ///
    /// The session holds a pooled HTTP client; callers create it lazily on
    /// first use, keep it for the life of the invocation, and drop it when
    /// done.
    pub fn create_session(&self, model: &str) -> Result<ModelSession, SageError> {
        Ok(ModelSession {
            http: self.http(self.timeout_ms)?,
            base_url: self.base_url.clone(),
            model: model.to_string(),
            options: self.options,
        })
    }

    /// Download a model, reporting streamed progress through `on_progress`.
    /// Blocks until the pull completes or fails.
    pub async fn pull(
        &self,
        model: &str,
        mut on_progress: impl FnMut(&PullProgress),
    ) -> Result<(), SageError> {
        // Large models take a while; the generate timeout does not apply.
        let client = self.http(3_600_000)?;
        let url = format!("{}/api/pull", self.base_url);
        let request = PullRequest {
            name: model.to_string(),
            stream: true,
        };

        let resp = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !resp.status().is_success() {
            return Err(SageError::ModelCallFailed(format!(
                "pull request returned {}",
                resp.status()
            )));
        }

        let mut stream = resp.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| SageError::ModelCallFailed(e.to_string()))?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            // Progress arrives as newline-delimited JSON.
            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].trim().to_string();
                buffer.drain(..=pos);
                if line.is_empty() {
                    continue;
                }
                if let Ok(progress) = serde_json::from_str::<PullProgress>(&line) {
                    if let Some(err) = &progress.error {
                        return Err(SageError::ModelCallFailed(err.clone()));
                    }
                    on_progress(&progress);
                }
            }
        }

        Ok(())
    }
}

/// A stateful handle to the on-device completion capability.
///
/// Created once per invocation and reused; one request in flight at a time.
pub struct ModelSession {
    http: reqwest::Client,
    base_url: String,
    model: String,
    options: GenerateOptions,
}

impl ModelSession {
    /// Name of the model this session targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the raw completion text.
    ///
    /// No retries: callers surface the error and let the user re-invoke.
    pub async fn prompt(&self, prompt_text: &str) -> Result<String, SageError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt_text.to_string(),
            stream: false,
            options: self.options,
        };

        let resp = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if status.as_u16() == 404 {
                return Err(SageError::ModelDeclined(format!(
                    "model '{}' is not installed",
                    self.model
                )));
            }
            return Err(SageError::ModelCallFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| SageError::ModelCallFailed(format!("bad response body: {}", e)))?;

        Ok(generated.response)
    }
}

fn map_transport_error(e: reqwest::Error) -> SageError {
    if e.is_connect() {
        SageError::ModelUnavailable(e.to_string())
    } else if e.is_timeout() {
        SageError::ModelCallFailed("request timed out".to_string())
    } else {
        SageError::ModelCallFailed(e.to_string())
    }
}

/// Match a configured model name against the installed list, ignoring the
/// `:tag` suffix the way the service itself does.
pub fn model_installed(installed: &[InstalledModel], model: &str) -> bool {
    let base = model.split(':').next().unwrap_or(model);
    installed.iter().any(|m| {
        let m_base = m.name.split(':').next().unwrap_or(&m.name);
        m.name == model || m_base == base
    })
}

/// Pick a default model from the installed list.
///
/// Small code-tuned models first; falls back to whatever is installed.
pub fn select_default_model(installed: &[String]) -> Option<String> {
    let preference_order = [
        "qwen2.5-coder:1.5b",
        "qwen2.5-coder:3b",
        "deepseek-coder:1.3b",
        "codegemma:2b",
        "qwen2.5-coder",
        "deepseek-coder",
        "codellama:7b",
        "codellama",
        "llama3.2:3b",
        "llama3.2",
        "qwen2.5",
    ];

    for preferred in preference_order {
        for model in installed {
            let base = model.split(':').next().unwrap_or(model);
            if model == preferred || base == preferred || model.starts_with(preferred) {
                return Some(model.clone());
            }
        }
    }

    installed.first().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(names: &[&str]) -> Vec<InstalledModel> {
        names
            .iter()
            .map(|n| InstalledModel {
                name: n.to_string(),
                size: 0,
                modified_at: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_model_installed_ignores_tag() {
        let models = installed(&["qwen2.5-coder:1.5b", "llama3.2:latest"]);
        assert!(model_installed(&models, "qwen2.5-coder"));
        assert!(model_installed(&models, "qwen2.5-coder:1.5b"));
        assert!(model_installed(&models, "llama3.2"));
        assert!(!model_installed(&models, "mistral"));
    }

    #[test]
    fn test_select_default_prefers_small_code_models() {
        let models = vec![
            "llama3.2:3b".to_string(),
            "qwen2.5-coder:1.5b".to_string(),
            "codellama:7b".to_string(),
        ];
        assert_eq!(
            select_default_model(&models),
            Some("qwen2.5-coder:1.5b".to_string())
        );
    }

    #[test]
    fn test_select_default_falls_back_to_first() {
        let models = vec!["custom-model:latest".to_string()];
        assert_eq!(
            select_default_model(&models),
            Some("custom-model:latest".to_string())
        );
        assert_eq!(select_default_model(&[]), None);
    }

    #[test]
    fn test_pull_progress_percent() {
        let progress = PullProgress {
            status: "pulling".to_string(),
            total: 200,
            completed: 50,
            error: None,
        };
        assert!((progress.percent() - 25.0).abs() < f64::EPSILON);

        let unknown = PullProgress {
            status: "pulling".to_string(),
            total: 0,
            completed: 0,
            error: None,
        };
        assert_eq!(unknown.percent(), 0.0);
    }
}
