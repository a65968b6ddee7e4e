//! Command-line interface parsing and handling
//!
//! This module parses arguments, assembles the conversation from config and
//! credentials, and dispatches to the chat loop or one of the subcommands.

pub mod auth;
pub mod chat;
pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::cli::auth::{run_auth, run_deauth};
use crate::cli::chat::run_chat;
use crate::cli::say::run_say;
use crate::cli::settings::error::SettingError;
use crate::cli::settings::{set_at_path, unset_at_path, SettingRegistry};
use crate::core::app::App;
use crate::core::config::Config;
use crate::core::conversation::{Conversation, ConversationOptions};
use crate::core::credentials::resolve_api_key;
use crate::core::gemini::GeminiClient;
use crate::core::mode::UiMode;
use crate::utils::diagnostics::init_tracing;
use crate::utils::logging::LoggingState;

#[derive(Parser)]
#[command(name = "genui-chat")]
#[command(about = "Chat with Gemini and render its replies as sanitized HTML")]
#[command(
    long_about = "genui-chat streams Gemini replies and turns them into sanitized HTML or \
whitelisted UI components. In Generative UI mode the model is asked to answer with \
Tailwind-styled markup; in Text Only mode it answers in plain text.\n\n\
Authentication:\n\
  Use 'genui-chat auth' to store an API key in your system keyring.\n\n\
Environment Variables (take precedence over the keyring):\n\
  GEMINI_API_KEY    Your Gemini API key\n\
  API_KEY           Accepted as a fallback\n\
  RUST_LOG          Diagnostic log filter (e.g. genui_chat=debug)\n\n\
Commands:\n\
  /help             List chat commands\n\
  /mode [gen-ui|text]  Toggle or set the reply mode\n\
  /html [file]      Export the conversation as an HTML page\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this session
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Starting mode: generative-ui or text-only
    #[arg(long, global = true, value_name = "MODE", value_parser = parse_mode)]
    pub mode: Option<UiMode>,

    /// Keep an HTML copy of the conversation at this path
    #[arg(long, global = true, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<PathBuf>,

    /// Write diagnostic traces to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,

    /// Only read the API key from the environment, never the keyring
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one prompt and print the reply
    Say {
        /// Prompt text; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Store a Gemini API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
    /// Set configuration values, or list them when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

fn parse_mode(value: &str) -> Result<UiMode, String> {
    value.parse()
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    init_tracing(args.debug_log.as_deref())?;

    match args.command.take().unwrap_or(Commands::Chat) {
        Commands::Auth => run_auth(),
        Commands::Deauth => run_deauth(),
        Commands::Set { key, value } => {
            let path = Config::get_config_path()?;
            let registry = SettingRegistry::new();
            report_setting(set_at_path(&registry, &path, key.as_deref(), &value))
        }
        Commands::Unset { key } => {
            let path = Config::get_config_path()?;
            let registry = SettingRegistry::new();
            report_setting(unset_at_path(&registry, &path, &key))
        }
        Commands::Say { prompt } => {
            let config = Config::load()?;
            let options = session_options(&config, &args);
            let client = build_client(&config, args.env_only)?;
            run_say(Box::new(client), options, prompt).await
        }
        Commands::Chat => {
            let config = Config::load()?;
            let options = session_options(&config, &args);
            let client = build_client(&config, args.env_only)?;

            let conversation = Conversation::new(Box::new(client), options);
            let logging = LoggingState::new(args.log.clone())?;
            let html_export = args.html.clone().or_else(|| config.html_export.clone());
            let app = App::new(conversation, logging).with_html_export(html_export);
            run_chat(app).await
        }
    }
}

/// Config values overridden by whatever was given on the command line.
fn session_options(config: &Config, args: &Args) -> ConversationOptions {
    let mut options = config.conversation_options();
    if let Some(model) = args.model.as_deref().filter(|m| !m.trim().is_empty()) {
        options.model = model.to_string();
    }
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    options
}

/// A missing key is not fatal here; the first turn reports it in the
/// transcript so the chat can still start.
fn build_client(config: &Config, env_only: bool) -> Result<GeminiClient, Box<dyn Error>> {
    let resolved = resolve_api_key(!env_only)?;
    match &resolved {
        Some(key) => info!(source = ?key.source, "using Gemini API key"),
        None => debug!("no Gemini API key found"),
    }
    Ok(GeminiClient::new(
        resolved.map(|key| key.key),
        Some(config.base_url().to_string()),
    ))
}

fn report_setting(result: Result<String, Box<dyn Error>>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => match err.downcast_ref::<SettingError>() {
            Some(setting_error) => {
                setting_error.print();
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_chat() {
        let args = Args::try_parse_from(["genui-chat"]).expect("parse");
        assert!(args.command.is_none());
    }

    #[test]
    fn global_flags_override_config() {
        let args = Args::try_parse_from([
            "genui-chat",
            "--mode",
            "text",
            "-m",
            "gemini-2.5-pro",
            "say",
            "what",
            "is",
            "rust",
        ])
        .expect("parse");

        let config = Config {
            mode: Some(UiMode::GenerativeUi),
            grounding: Some(false),
            ..Config::default()
        };
        let options = session_options(&config, &args);
        assert_eq!(options.mode, UiMode::TextOnly);
        assert_eq!(options.model, "gemini-2.5-pro");
        assert!(!options.grounding);

        match args.command {
            Some(Commands::Say { prompt }) => assert_eq!(prompt.join(" "), "what is rust"),
            _ => panic!("expected say"),
        }
    }

    #[test]
    fn invalid_mode_is_rejected() {
        assert!(Args::try_parse_from(["genui-chat", "--mode", "sideways"]).is_err());
    }

    #[test]
    fn bare_set_has_no_key() {
        let args = Args::try_parse_from(["genui-chat", "set"]).expect("parse");
        assert!(matches!(args.command, Some(Commands::Set { key: None, .. })));
    }

    #[test]
    fn set_collects_trailing_words() {
        let args =
            Args::try_parse_from(["genui-chat", "set", "html-export", "my chats.html"]).expect("parse");
        match args.command {
            Some(Commands::Set { key, value }) => {
                assert_eq!(key.as_deref(), Some("html-export"));
                assert_eq!(value, vec!["my chats.html".to_string()]);
            }
            _ => panic!("expected set"),
        }
    }
}
