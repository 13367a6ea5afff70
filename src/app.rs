//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the command
//! handlers. With no subcommand, `record` runs with its defaults.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

use crate::commands;
use crate::config::Leg;
use crate::logging;

const DEFAULT_DURATION_SECS: u64 = 5;

/// Record speech, transcribe and format it with an AI provider, and copy the
/// result to the clipboard
#[derive(Parser)]
#[command(name = "voxclip")]
#[command(version)]
#[command(about = "Record speech, transcribe and format it, copy the result to the clipboard")]
#[command(
    long_about = "Record speech from the default microphone, transcribe it through the\n\
configured speech provider, clean the transcript up through the configured\n\
text provider, and copy the result to the clipboard.\n\n\
DEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\n\
EXAMPLES:\n    # Record for 5 seconds (the default), then transcribe and copy\n    $ voxclip\n\n    \
# Record for 10 seconds and auto-paste into the focused window\n    $ voxclip 10 --paste\n\n    \
# Use a one-off formatting instruction\n    $ voxclip record 5 --prompt \"Turn this into a bullet list\"\n\n    \
# Inspect the provider catalog\n    $ voxclip providers"
)]
#[command(
    after_help = "CONFIGURATION:\n    Settings file:      ~/.config/voxclip/voxclip.toml\n    Logs:               ~/.local/state/voxclip/voxclip.log.*\n\n\
    OPENAI_API_KEY, when set, substitutes for both legs' stored API keys."
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Recording duration in whole seconds (record default command)
    #[arg(value_name = "DURATION", value_parser = clap::value_parser!(u64).range(1..))]
    duration: Option<u64>,

    /// Send a paste keystroke after copying (record default command)
    #[arg(short, long)]
    paste: bool,

    /// Custom formatting prompt replacing the built-in one (record default command)
    #[arg(long, value_name = "PROMPT")]
    prompt: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record for a fixed duration, then transcribe, format, and copy (default)
    ///
    /// Drives the whole pipeline end to end and prints each stage's result.
    #[command(visible_alias = "r")]
    Record {
        /// Recording duration in whole seconds
        #[arg(value_name = "DURATION", value_parser = clap::value_parser!(u64).range(1..))]
        duration: Option<u64>,

        /// Send a paste keystroke after copying
        #[arg(short, long)]
        paste: bool,

        /// Custom formatting prompt replacing the built-in one
        #[arg(long, value_name = "PROMPT")]
        prompt: Option<String>,
    },

    /// Update provider settings for one pipeline leg
    ///
    /// A provider switch resets the leg's base URL and model to the new
    /// provider's defaults; pass --base-url/--model in the same call to
    /// override them.
    ///
    /// Examples:
    ///   voxclip auth speech --provider openai --api-key sk-...
    ///   voxclip auth text --provider azure --deployment gpt4-prod
    #[command(visible_alias = "a")]
    Auth {
        /// Which leg to configure
        #[arg(value_parser = ["speech", "text"])]
        leg: String,

        /// Provider id (see 'voxclip providers')
        #[arg(long, value_name = "ID")]
        provider: Option<String>,

        /// API key for the selected provider
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,

        /// Override the provider's base URL
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Override the provider's default model
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// API version (Azure only)
        #[arg(long, value_name = "VERSION")]
        api_version: Option<String>,

        /// Deployment name (Azure only)
        #[arg(long, value_name = "NAME")]
        deployment: Option<String>,
    },

    /// Set the global toggle-recording hotkey string
    Hotkey {
        /// Hotkey combination, e.g. "Ctrl+Alt+R"
        #[arg(value_name = "KEYS")]
        keys: String,
    },

    /// List the supported AI providers and their default values
    Providers,

    /// Open the settings file in your preferred editor
    ///
    /// Edit provider selection, API keys, base URLs, models, and the global
    /// hotkey. Uses $EDITOR, falling back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that don't need logging or settings
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voxclip", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Providers) => {
            commands::handle_providers();
            return Ok(());
        }
        Some(Commands::Logs) => {
            return commands::handle_logs();
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Record { .. }) => {
            let (duration, paste, prompt) = match cli.command {
                Some(Commands::Record {
                    duration,
                    paste,
                    prompt,
                }) => (duration, paste, prompt),
                None => (cli.duration, cli.paste, cli.prompt),
                _ => unreachable!(),
            };
            commands::handle_record(duration.unwrap_or(DEFAULT_DURATION_SECS), paste, prompt)
                .await?;
        }
        Some(Commands::Auth {
            leg,
            provider,
            api_key,
            base_url,
            model,
            api_version,
            deployment,
        }) => {
            let leg = match leg.as_str() {
                "speech" => Leg::Speech,
                _ => Leg::Text,
            };
            commands::handle_auth(
                leg,
                commands::AuthUpdate {
                    provider,
                    api_key,
                    base_url,
                    model,
                    api_version,
                    deployment,
                },
            )?;
        }
        Some(Commands::Hotkey { keys }) => {
            commands::handle_hotkey(&keys)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Providers) | Some(Commands::Logs) | Some(Commands::Completions { .. }) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
