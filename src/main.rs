//! ez-commit - CLI entry point.

use std::error::Error as _;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ez_commit::commands;
use ez_commit::commit::{ApprovalLoop, Outcome};
use ez_commit::config::ConfigStore;
use ez_commit::error::{AppError, ExitStatus};
use ez_commit::git::GitRepository;
use ez_commit::llm::{MessageGenerator, OpenAiClient};
use ez_commit::ui::{Prompter, TerminalUi, report_error};

/// Generate commit messages from git diffs using OpenAI.
#[derive(Parser, Debug)]
#[command(name = "ez-commit")]
#[command(about = "Generate commit messages from git diffs using OpenAI")]
#[command(version)]
struct Cli {
    /// Show the generated message without committing
    #[arg(long)]
    preview: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ez-commit configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Open the configuration file in your editor
    Edit,

    /// Reset the configuration to defaults
    Reset,

    /// Set the OpenAI API key
    SetApiKey { key: String },

    /// Set the model (e.g. gpt-4, gpt-4o-mini)
    SetModel { model: String },

    /// Set the temperature (0.0 to 1.0)
    SetTemperature {
        #[arg(allow_hyphen_values = true)]
        temperature: String,
    },

    /// Edit the system prompt in your editor
    EditPrompt,

    /// Show the current configuration (excluding the API key)
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut ui = TerminalUi::from_env();
    let result = match cli.command {
        None => run_commit(&mut ui, cli.preview).await,
        Some(Command::Config(command)) => run_config(&mut ui, command),
    };

    match result {
        Ok(()) => ExitCode::from(ExitStatus::Success.code()),
        Err(AppError::Cancelled) => {
            ui.warning("Commit cancelled.");
            ExitCode::from(ExitStatus::Cancelled.code())
        }
        Err(err) => {
            let mut source = err.source();
            while let Some(cause) = source {
                debug!("caused by: {}", cause);
                source = cause.source();
            }
            report_error(&err.to_string());
            ExitCode::from(err.exit_status().code())
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_commit(ui: &mut TerminalUi, preview: bool) -> Result<(), AppError> {
    let gateway = GitRepository::open_current()?;
    let store = ConfigStore::from_default_location()?;
    let generator = MessageGenerator::new(OpenAiClient::from_env()?, store);

    let outcome = ApprovalLoop::new(&gateway, &generator, ui, preview)
        .run()
        .await?;

    if let Outcome::Committed { id, .. } = outcome {
        debug!("Committed {}", id);
    }
    Ok(())
}

fn run_config(ui: &mut TerminalUi, command: ConfigCommand) -> Result<(), AppError> {
    let store = ConfigStore::from_default_location()?;

    match command {
        ConfigCommand::Edit => commands::edit_config(&store, ui),
        ConfigCommand::Reset => commands::reset_config(&store, ui),
        ConfigCommand::SetApiKey { key } => commands::set_api_key(&store, ui, &key),
        ConfigCommand::SetModel { model } => commands::set_model(&store, ui, &model),
        ConfigCommand::SetTemperature { temperature } => {
            commands::set_temperature(&store, ui, &temperature)
        }
        ConfigCommand::EditPrompt => commands::edit_system_prompt(&store, ui),
        ConfigCommand::Show => commands::show_config(&store, ui),
    }
}
