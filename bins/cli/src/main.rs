//! Stagehand CLI
//!
//! Stages local files into a session, applies removals and prints the commit
//! manifest as JSON. Nothing is uploaded.

mod files;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use stagehand_core::staging::{
    CommitManifest, DataUrlDecoder, Mode, RemoteRef, StagingConfig, StagingSession,
};
use stagehand_shared::{AppConfig, AppError, AppResult, LogSettings};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "stagehand", version, about = "Stage attachments and print the commit delta")]
struct Cli {
    /// Override the configured selection mode.
    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    /// Existing remote attachment to preload (repeatable).
    #[arg(long = "existing", value_name = "REFERENCE")]
    existing: Vec<String>,

    /// Remove the item at this position after staging (repeatable, applied in order).
    #[arg(long = "remove", value_name = "INDEX")]
    remove: Vec<usize>,

    /// Remove every item after staging.
    #[arg(long)]
    remove_all: bool,

    /// Files to stage, in selection order.
    files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Single,
    Multiple,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Single => Self::Single,
            CliMode::Multiple => Self::Multiple,
        }
    }
}

/// JSON printed on success.
#[derive(Debug, Serialize)]
struct Output {
    session_id: String,
    items: usize,
    diagnostics: Vec<String>,
    commit: CommitManifest,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.log);

    match run(cli, &config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(code = err.error_code(), error = %err, "staging failed");
            eprintln!("error: {err}");
            Ok(ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1)))
        }
    }
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if log.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(fmt).init();
    }
}

async fn run(cli: Cli, config: &AppConfig) -> AppResult<Output> {
    let mut staging = StagingConfig::from_settings(&config.staging);
    if let Some(mode) = cli.mode {
        staging.mode = mode.into();
    }

    let session = StagingSession::with_initial(
        staging,
        DataUrlDecoder::new(),
        cli.existing.into_iter().map(RemoteRef::new),
    );
    info!(session_id = %session.id(), mode = ?session.mode(), "session started");

    let mut selected = Vec::with_capacity(cli.files.len());
    let max_file_size = session.config().max_file_size;
    for path in &cli.files {
        selected.push(files::read_selected(path, max_file_size).await?);
    }

    let report = session.ingest(selected).await;
    let diagnostics = report
        .diagnostics
        .iter()
        .map(|d| d.message(session.config()))
        .collect();

    for index in cli.remove {
        session
            .remove_at(index)
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }
    if cli.remove_all {
        session.remove_all();
    }

    let output = Output {
        session_id: session.id().to_string(),
        items: session.previews().len(),
        diagnostics,
        commit: session.commit_delta().manifest(),
    };
    session.discard();
    Ok(output)
}
