mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod prompt;
mod services;
#[cfg(test)]
mod test_support;
mod workflow;

use std::num::NonZeroU32;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cmd::config as config_cmd;
use crate::cmd::ticket;
use crate::config::{AppConfig, ConfigOverrides, InputMode};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::google_speech::GoogleSpeechClient;
use crate::infra::jira::JiraClient;
use crate::infra::recorder::SoxRecorder;
use crate::infra::settings_file::JsonSettingsFile;
use crate::prompt::StdConsole;
use crate::services::SettingsStore;
use crate::workflow::credentials::{CredentialStore, load_settings};

#[derive(Parser)]
#[command(
    name = "jira-assistant",
    author,
    version,
    about = "Create Jira tickets by voice or keyboard"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Type answers instead of speaking them.
    #[arg(long, global = true)]
    manual: bool,
    /// Give up on a prompt after this many failed attempts.
    #[arg(long, global = true, value_name = "N")]
    max_attempts: Option<NonZeroU32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-run first-time configuration.
    Setup,
    /// Show the stored settings (token masked).
    Show,
}

#[tokio::main]
async fn main() {
    logging::init_tracing();

    if let Err(error) = run().await {
        tracing::error!(%error, "jira-assistant failed");
        eprintln!("Error: {}", error.user_message());
        std::process::exit(error.exit_code());
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&ConfigOverrides {
        manual: cli.manual,
        max_attempts: cli.max_attempts,
    })?;
    let store = JsonSettingsFile::new(config.settings_path());
    let mut console = StdConsole;

    if let Some(Commands::Show) = cli.command {
        let settings = load_settings(&store)?;
        config_cmd::run_show(&settings, store.location(), &mut console);
        return Ok(());
    }

    let context = build_context(config)?;
    let credentials = CredentialStore::open(Box::new(store), context.config.retry)?;

    match cli.command {
        Some(Commands::Setup) => config_cmd::run_setup(&context, credentials, &mut console).await,
        Some(Commands::Show) => Ok(()),
        None => {
            let created = ticket::run(&context, credentials, &mut console).await?;
            tracing::info!(created, "session finished");
            Ok(())
        }
    }
}

fn build_context(mut config: AppConfig) -> AppResult<AppContext> {
    config.input_mode = effective_input_mode(&config);

    let issue_tracker = Arc::new(JiraClient::new()?);
    let audio = Arc::new(SoxRecorder::new(&config.speech));
    let transcriber = Arc::new(GoogleSpeechClient::new(&config.speech));

    Ok(AppContext::new(config, issue_tracker, audio, transcriber))
}

/// Voice input needs a transcription key; without one every answer is typed.
fn effective_input_mode(config: &AppConfig) -> InputMode {
    if config.input_mode == InputMode::Voice && config.speech.api_key.is_none() {
        tracing::warn!("JIRA_ASSISTANT_SPEECH_KEY not set; switching to typed input");
        InputMode::Manual
    } else {
        config.input_mode
    }
}
