//! Error types for codesage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SageError {
    #[error("Empty input. Provide some code or a question first.")]
    InvalidRequest,

    #[error("Local model service unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model cannot run on this device: {0}")]
    ModelDeclined(String),

    #[error("Model call failed: {0}")]
    ModelCallFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SageError {
    /// Remediation hint shown alongside the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SageError::InvalidRequest => {
                Some("Pass a file, pipe code on stdin, or record one with 'sagectl select'.")
            }
            SageError::ModelUnavailable(_) => {
                Some("Start the local model service (e.g. 'ollama serve') and try again.")
            }
            SageError::ModelDeclined(_) => {
                Some("Download the configured model with 'sagectl model pull'.")
            }
            SageError::ModelCallFailed(_) => {
                Some("No automatic retry is attempted. Re-run the command to try again.")
            }
            SageError::Io(_) | SageError::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_carry_hints() {
        assert!(SageError::InvalidRequest.hint().is_some());
        assert!(SageError::ModelUnavailable("x".into()).hint().is_some());
        assert!(SageError::ModelDeclined("x".into()).hint().is_some());
        assert!(SageError::ModelCallFailed("x".into()).hint().is_some());
    }
}
