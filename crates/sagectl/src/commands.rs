//! Command implementations.
//!
//! Each subcommand resolves its input, drives the pipeline in
//! sage_common, and renders the result. Model calls sit behind a single
//! recovery boundary per invocation: on failure the error kind and a
//! remediation hint are printed and the process exits re-triable. Usage
//! recording is best-effort and never affects the request path.

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use sage_common::config::{ColorMode, SageConfig};
use sage_common::model::{
    model_installed, select_default_model, Availability, ModelClient, ModelSession,
};
use sage_common::selection::SelectionStore;
use sage_common::stats::{UsageRecord, UsageStore};
use sage_common::{build_prompt, looks_like_code, normalize, Action, SageError};

use crate::render;
use crate::spinner::thinking_spinner;

/// Context resolved once per invocation.
pub struct AppContext {
    pub config: SageConfig,
    pub data_dir: PathBuf,
    pub color: bool,
}

impl AppContext {
    pub fn init(model_override: Option<String>, url_override: Option<String>) -> Result<Self> {
        let mut config = SageConfig::load()?;
        if let Some(url) = url_override {
            config.model.url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = model_override {
            config.model.name = Some(model);
        }

        let color = match config.output.color {
            ColorMode::None => false,
            ColorMode::Auto => console::Term::stdout().features().colors_supported(),
        };

        Ok(Self {
            config,
            data_dir: sage_common::paths::data_dir()?,
            color,
        })
    }

    fn client(&self) -> ModelClient {
        ModelClient::new(&self.config.model)
    }

    fn selection_store(&self) -> SelectionStore {
        SelectionStore::new(&self.data_dir)
    }
}

/// Print the failure and exit, leaving nothing in flight. No retry: the
/// user re-invokes the command.
fn fail(err: &SageError, color: bool) -> ! {
    render::print_error(err, color);
    std::process::exit(1);
}

/// Run one code action end to end.
pub async fn run_action(
    ctx: &AppContext,
    action: Action,
    file: Option<&Path>,
    lang: &str,
) -> Result<()> {
    let source = match resolve_input(ctx, file)? {
        Some(text) => text,
        None => fail(&SageError::InvalidRequest, ctx.color),
    };

    if !looks_like_code(&source) {
        render::notice("Input does not look like code; sending it anyway.", ctx.color);
    }

    run_pipeline(ctx, action, &source, lang).await
}

/// The shared prompt → model → normalize → render pipeline.
async fn run_pipeline(ctx: &AppContext, action: Action, source: &str, lang: &str) -> Result<()> {
    let prompt = match build_prompt(action, source, lang) {
        Ok(p) => p,
        Err(e) => fail(&e, ctx.color),
    };

    let client = ctx.client();
    let (session, _) = match prepare_session(ctx, &client).await {
        Ok(s) => s,
        Err(e) => fail(&e, ctx.color),
    };

    let started = Instant::now();
    let spinner = thinking_spinner(action.loading_label());
    let result = session.prompt(&prompt).await;
    spinner.finish_and_clear();
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(raw) => {
            let output = normalize(action, &raw);
            render::print_output(action, &output, ctx.color);
            record_usage(ctx, action, duration_ms, true);
            Ok(())
        }
        Err(e) => {
            record_usage(ctx, action, duration_ms, false);
            fail(&e, ctx.color);
        }
    }
}

/// Answer one question, or run an interactive loop when none was given.
///
/// The loop holds a single session across turns; it is released when the
/// loop ends. A failed turn is printed and the loop continues.
pub async fn chat(ctx: &AppContext, question: Option<String>) -> Result<()> {
    if let Some(question) = question {
        return run_pipeline(ctx, Action::Chat, &question, sage_common::LANG_AUTO).await;
    }

    let client = ctx.client();
    let (session, model) = match prepare_session(ctx, &client).await {
        Ok(s) => s,
        Err(e) => fail(&e, ctx.color),
    };

    render::notice(
        &format!("Chatting with {} locally. Empty line or 'exit' to leave.", model),
        ctx.color,
    );

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() || question == "exit" || question == "quit" {
            break;
        }

        let prompt = match build_prompt(Action::Chat, question, sage_common::LANG_AUTO) {
            Ok(p) => p,
            Err(e) => {
                render::print_error(&e, ctx.color);
                continue;
            }
        };

        let started = Instant::now();
        let spinner = thinking_spinner(Action::Chat.loading_label());
        let result = session.prompt(&prompt).await;
        spinner.finish_and_clear();
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(raw) => {
                let output = normalize(Action::Chat, &raw);
                render::print_output(Action::Chat, &output, ctx.color);
                record_usage(ctx, Action::Chat, duration_ms, true);
            }
            Err(e) => {
                // Re-triable: keep the loop (and the session) alive.
                record_usage(ctx, Action::Chat, duration_ms, false);
                render::print_error(&e, ctx.color);
            }
        }
    }

    Ok(())
}

/// CodeSniffer verdict for a text blob.
pub fn detect(ctx: &AppContext, file: Option<&Path>) -> Result<()> {
    let text = read_file_or_stdin(file)?;
    if looks_like_code(&text) {
        if ctx.color {
            println!("{} looks like code", "✓".green());
        } else {
            println!("✓ looks like code");
        }
    } else if ctx.color {
        println!("{} does not look like code", "✗".red());
    } else {
        println!("✗ does not look like code");
    }
    Ok(())
}

/// Record a selection for a follow-up command.
pub fn select(ctx: &AppContext, file: Option<&Path>, action: Option<&str>) -> Result<()> {
    let action = match action {
        Some(name) => Some(
            Action::from_name(name)
                .with_context(|| format!("Unknown action: '{}'", name))?,
        ),
        None => None,
    };

    let text = read_file_or_stdin(file)?;
    if text.trim().is_empty() {
        fail(&SageError::InvalidRequest, ctx.color);
    }

    ctx.selection_store().record(&text, action)?;
    render::notice("Selection recorded (fresh for 5 seconds).", ctx.color);
    Ok(())
}

/// Run the recorded selection with its recorded action.
pub async fn resume(ctx: &AppContext) -> Result<()> {
    let Some(selection) = ctx.selection_store().take()? else {
        bail!("No fresh selection. Record one with 'sagectl select' and resume within 5 seconds.");
    };

    let Some(action) = selection.action else {
        bail!("The recorded selection has no action. Re-record with 'sagectl select --action ...'.");
    };

    run_pipeline(ctx, action, &selection.text, sage_common::LANG_AUTO).await
}

/// Model service availability, the badge analog.
pub async fn status(ctx: &AppContext, json: bool) -> Result<()> {
    let client = ctx.client();
    let status = client.status(ctx.config.model.name.as_deref()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let (symbol, label) = match status.availability {
        Availability::Available => ("✓", "available"),
        Availability::Downloadable => ("⚠", "downloadable"),
        Availability::Unavailable => ("✗", "unavailable"),
    };
    if ctx.color {
        let styled = match status.availability {
            Availability::Available => symbol.green().to_string(),
            Availability::Downloadable => symbol.yellow().to_string(),
            Availability::Unavailable => symbol.red().to_string(),
        };
        println!("{} model service: {} ({})", styled, label, status.url);
    } else {
        println!("{} model service: {} ({})", symbol, label, status.url);
    }

    match &status.selected_model {
        Some(model) => println!("  configured model: {}", model),
        None => match select_default_model(&status.models) {
            Some(model) => println!("  auto-selected model: {}", model),
            None => println!("  no models installed"),
        },
    }

    if !status.models.is_empty() {
        println!("  installed: {}", status.models.join(", "));
    }
    if let Some(error) = &status.error {
        render::notice(&format!("  {}", error), ctx.color);
    }

    Ok(())
}

/// Aggregated usage counters.
pub fn stats(ctx: &AppContext) -> Result<()> {
    let totals = UsageStore::new(&ctx.data_dir).totals()?;

    if totals.total_uses == 0 {
        println!("No usage recorded yet.");
        return Ok(());
    }

    println!("Total requests: {}", totals.total_uses);
    println!(
        "Success rate:   {:.0}% ({} of {})",
        totals.success_rate() * 100.0,
        totals.successful,
        totals.total_uses
    );
    println!("Average time:   {} ms", totals.average_duration_ms);
    println!();
    for (action, count) in &totals.per_action {
        println!("  {:<10} {}", action.name(), count);
    }

    Ok(())
}

/// List models installed on the local service.
pub async fn model_list(ctx: &AppContext) -> Result<()> {
    let client = ctx.client();
    let models = match client.list_models().await {
        Ok(m) => m,
        Err(e) => fail(&e, ctx.color),
    };

    if models.is_empty() {
        println!("No models installed. Download one with 'sagectl model pull <name>'.");
        return Ok(());
    }

    for model in models {
        println!("{:<28} {}", model.name, render::format_size(model.size));
    }
    Ok(())
}

/// Download a model, with streamed progress.
pub async fn model_pull(ctx: &AppContext, name: Option<String>) -> Result<()> {
    let Some(model) = name.or_else(|| ctx.config.model.name.clone()) else {
        bail!("No model named. Pass one, or set it with 'sagectl config --set model.name=...'.");
    };

    let bar = indicatif::ProgressBar::new(100);
    bar.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{msg} [{bar:30}] {pos}%")
            .expect("progress template is static"),
    );
    bar.set_message(format!("pulling {}", model));

    let client = ctx.client();
    let result = client
        .pull(&model, |progress| {
            bar.set_position(progress.percent() as u64);
            if !progress.status.is_empty() {
                bar.set_message(progress.status.clone());
            }
        })
        .await;
    bar.finish_and_clear();

    match result {
        Ok(()) => {
            println!("Model '{}' ready.", model);
            Ok(())
        }
        Err(e) => fail(&e, ctx.color),
    }
}

/// Show or update configuration.
pub fn config(ctx: &AppContext, set: Option<String>) -> Result<()> {
    match set {
        None => {
            print!("{}", toml::to_string_pretty(&ctx.config)?);
            Ok(())
        }
        Some(kv) => {
            let (key, value) = kv
                .split_once('=')
                .context("Expected key=value, e.g. model.name=qwen2.5-coder:1.5b")?;

            let mut config = SageConfig::load()?;
            config.set(key.trim(), value.trim())?;
            config.save()?;
            println!("Set {} = {}", key.trim(), value.trim());
            Ok(())
        }
    }
}

/// Resolve the model and open the session used for this invocation.
///
/// Reachability and model presence are checked up front so the failure
/// surfaces as the right error kind instead of a failed generation.
async fn prepare_session(
    ctx: &AppContext,
    client: &ModelClient,
) -> Result<(ModelSession, String), SageError> {
    let installed = client.list_models().await?;
    let names: Vec<String> = installed.iter().map(|m| m.name.clone()).collect();

    let model = match &ctx.config.model.name {
        Some(name) => {
            if !model_installed(&installed, name) {
                return Err(SageError::ModelDeclined(format!(
                    "model '{}' is not downloaded",
                    name
                )));
            }
            name.clone()
        }
        None => select_default_model(&names).ok_or_else(|| {
            SageError::ModelDeclined("no models installed on the local service".to_string())
        })?,
    };

    let session = client.create_session(&model)?;
    Ok((session, model))
}

/// Input priority: explicit file, then a fresh recorded selection, then
/// piped stdin. Returns None when nothing usable is found.
fn resolve_input(ctx: &AppContext, file: Option<&Path>) -> Result<Option<String>> {
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(Some(text));
    }

    if let Some(selection) = ctx.selection_store().take()? {
        render::notice("Using the selection recorded moments ago.", ctx.color);
        return Ok(Some(selection.text));
    }

    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

fn read_file_or_stdin(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Best-effort usage recording: failures are logged, never surfaced.
fn record_usage(ctx: &AppContext, action: Action, duration_ms: u64, success: bool) {
    let record = UsageRecord {
        timestamp: chrono::Utc::now(),
        action,
        duration_ms,
        success,
    };
    if let Err(e) = UsageStore::new(&ctx.data_dir).record(&record) {
        tracing::warn!("usage recording failed: {}", e);
    }
}
