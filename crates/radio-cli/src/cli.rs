use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// radioctl: inspect and edit the radio service's configuration.
#[derive(Parser, Debug)]
#[command(name = "radioctl", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Service configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Per-guild auto-join settings.
    Autojoin {
        #[command(subcommand)]
        command: AutojoinCommand,
    },
    /// Decode a few seconds of the station to check the audio path.
    Probe {
        /// Station URL; defaults to `stream.url`.
        #[arg(long)]
        url: Option<String>,

        /// Seconds of audio to decode.
        #[arg(short, long, default_value_t = 5)]
        seconds: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as JSON.
    Show,
    /// Write a commented default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Check configured values against their allowed ranges.
    Validate,
    /// Write the effective configuration, environment overrides included,
    /// as TOML.
    Export { path: PathBuf },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AutojoinCommand {
    /// List saved entries.
    List,
    /// Set the auto-join channel of a guild and enable auto-connect.
    Set { tenant: String, channel: String },
    /// Enable auto-connect for a guild.
    Enable { tenant: String },
    /// Disable auto-connect for a guild.
    Disable { tenant: String },
    /// Remove a guild's entry.
    Clear { tenant: String },
}

pub fn parse() -> Args {
    Args::parse()
}
