//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// codesage CLI
#[derive(Parser)]
#[command(name = "sagectl")]
#[command(about = "codesage - local AI code assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Model to use (overrides config)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Model endpoint URL (overrides config)
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Explain what the code does, line by line
    Explain {
        /// File to read; falls back to a fresh selection, then stdin
        file: Option<PathBuf>,

        /// Language hint ("auto" = detect)
        #[arg(long, default_value = "auto")]
        lang: String,
    },

    /// Rewrite the code with better names, structure, and performance
    Refactor {
        file: Option<PathBuf>,

        #[arg(long, default_value = "auto")]
        lang: String,
    },

    /// Review the code for bugs, edge cases, and improvements
    Review {
        file: Option<PathBuf>,

        #[arg(long, default_value = "auto")]
        lang: String,
    },

    /// Add comments to the code without changing it
    Comments {
        file: Option<PathBuf>,

        #[arg(long, default_value = "auto")]
        lang: String,
    },

    /// Ask a free-form programming question (interactive when omitted)
    Chat {
        question: Option<String>,
    },

    /// Check whether text looks like code
    Detect {
        file: Option<PathBuf>,
    },

    /// Record a selection for a follow-up command (fresh for 5 seconds)
    Select {
        file: Option<PathBuf>,

        /// Action to auto-run on resume
        #[arg(long)]
        action: Option<String>,
    },

    /// Run the recorded selection with its recorded action
    Resume,

    /// Show model service availability
    Status {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Show usage statistics
    Stats,

    /// Manage local models
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },

    /// Show or update configuration
    Config {
        /// Set a configuration value (key=value)
        #[arg(long)]
        set: Option<String>,
    },
}

/// Model subcommands
#[derive(Subcommand)]
pub enum ModelCommands {
    /// List models installed on the local service
    List,

    /// Download a model (defaults to the configured one)
    Pull {
        name: Option<String>,
    },
}
