//! radioctl: operator tool for the radio service.
//!
//! Shows and validates the service configuration, edits the per-guild
//! auto-join file while the service is stopped, and probes the station
//! through the same decoder the service uses.

mod autojoin_cmd;
mod cli;
mod config_cmd;
mod probe;

use std::process::ExitCode;

use radio_config::toml_loader::{load_default, load_from_path};
use radio_config::{JsonAutoJoinStore, RadioConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command, ConfigCommand};

fn init_tracing(override_level: Option<&str>, config: Option<&RadioConfig>) {
    let level = override_level
        .or_else(|| config.map(|c| c.logging.level.as_directive()))
        .unwrap_or("info");
    let directive = format!("radioctl={level},radio_core={level},radio_config={level}");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();
}

async fn run(args: &Args, config: &RadioConfig) -> radio_common::Result<()> {
    match &args.command {
        Command::Config { command } => {
            config_cmd::run(command, args.config.as_deref(), config)?;
        }
        Command::Autojoin { command } => {
            let store = JsonAutoJoinStore::new(&config.persistence.auto_join_path);
            autojoin_cmd::run(command, &store)?;
        }
        Command::Probe { url, seconds } => {
            probe::run(config, url.as_deref(), *seconds).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // `config init` must not trigger creation of the default file.
    let loaded = if matches!(
        args.command,
        Command::Config {
            command: ConfigCommand::Init { .. }
        }
    ) {
        Ok(RadioConfig::default())
    } else {
        match &args.config {
            Some(path) => load_from_path(path),
            None => load_default(),
        }
    };

    init_tracing(args.log_level.as_deref(), loaded.as_ref().ok());

    let result = match loaded {
        Ok(config) => run(&args, &config).await,
        Err(e) => Err(radio_common::RadioError::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "radioctl failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
