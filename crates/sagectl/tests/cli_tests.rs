//! CLI argument-parsing tests.

use clap::Parser;
use sagectl::cli::{Cli, Commands, ModelCommands};

#[test]
fn parses_action_with_file_and_lang() {
    let cli = Cli::try_parse_from(["sagectl", "refactor", "src/main.js", "--lang", "javascript"])
        .unwrap();
    match cli.command {
        Commands::Refactor { file, lang } => {
            assert_eq!(file.unwrap().to_str(), Some("src/main.js"));
            assert_eq!(lang, "javascript");
        }
        _ => panic!("expected refactor"),
    }
}

#[test]
fn lang_defaults_to_auto() {
    let cli = Cli::try_parse_from(["sagectl", "explain"]).unwrap();
    match cli.command {
        Commands::Explain { file, lang } => {
            assert!(file.is_none());
            assert_eq!(lang, "auto");
        }
        _ => panic!("expected explain"),
    }
}

#[test]
fn chat_question_is_optional() {
    let cli = Cli::try_parse_from(["sagectl", "chat"]).unwrap();
    assert!(matches!(cli.command, Commands::Chat { question: None }));

    let cli = Cli::try_parse_from(["sagectl", "chat", "what is a trait?"]).unwrap();
    match cli.command {
        Commands::Chat { question } => assert_eq!(question.as_deref(), Some("what is a trait?")),
        _ => panic!("expected chat"),
    }
}

#[test]
fn global_overrides_apply_anywhere() {
    let cli = Cli::try_parse_from(["sagectl", "review", "--model", "codellama"]).unwrap();
    assert_eq!(cli.model.as_deref(), Some("codellama"));

    let cli = Cli::try_parse_from(["sagectl", "--url", "http://127.0.0.1:9999", "status"]).unwrap();
    assert_eq!(cli.url.as_deref(), Some("http://127.0.0.1:9999"));
}

#[test]
fn model_subcommands_parse() {
    let cli = Cli::try_parse_from(["sagectl", "model", "pull", "qwen2.5-coder:1.5b"]).unwrap();
    match cli.command {
        Commands::Model {
            action: ModelCommands::Pull { name },
        } => assert_eq!(name.as_deref(), Some("qwen2.5-coder:1.5b")),
        _ => panic!("expected model pull"),
    }

    let cli = Cli::try_parse_from(["sagectl", "model", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Model {
            action: ModelCommands::List
        }
    ));
}

#[test]
fn select_accepts_action_flag() {
    let cli = Cli::try_parse_from(["sagectl", "select", "--action", "review"]).unwrap();
    match cli.command {
        Commands::Select { action, .. } => assert_eq!(action.as_deref(), Some("review")),
        _ => panic!("expected select"),
    }
}

#[test]
fn unknown_command_rejected() {
    assert!(Cli::try_parse_from(["sagectl", "summarize"]).is_err());
}
