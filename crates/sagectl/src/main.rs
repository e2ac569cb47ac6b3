//! sagectl - local AI code assistant.
//!
//! Select or pipe code, pick an action, get the answer from a model that
//! runs entirely on this machine.

use anyhow::Result;
use clap::Parser;

use sagectl::cli::{Cli, Commands, ModelCommands};
use sagectl::commands::{self, AppContext};
use sagectl::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let ctx = AppContext::init(cli.model, cli.url)?;

    match cli.command {
        Commands::Explain { file, lang } => {
            commands::run_action(&ctx, sage_common::Action::Explain, file.as_deref(), &lang).await
        }
        Commands::Refactor { file, lang } => {
            commands::run_action(&ctx, sage_common::Action::Refactor, file.as_deref(), &lang).await
        }
        Commands::Review { file, lang } => {
            commands::run_action(&ctx, sage_common::Action::Review, file.as_deref(), &lang).await
        }
        Commands::Comments { file, lang } => {
            commands::run_action(&ctx, sage_common::Action::Comments, file.as_deref(), &lang).await
        }
        Commands::Chat { question } => commands::chat(&ctx, question).await,
        Commands::Detect { file } => commands::detect(&ctx, file.as_deref()),
        Commands::Select { file, action } => {
            commands::select(&ctx, file.as_deref(), action.as_deref())
        }
        Commands::Resume => commands::resume(&ctx).await,
        Commands::Status { json } => commands::status(&ctx, json).await,
        Commands::Stats => commands::stats(&ctx),
        Commands::Model { action } => match action {
            ModelCommands::List => commands::model_list(&ctx).await,
            ModelCommands::Pull { name } => commands::model_pull(&ctx, name).await,
        },
        Commands::Config { set } => commands::config(&ctx, set),
    }
}
