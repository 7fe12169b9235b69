//! Offline editing of the auto-join settings file.

use radio_common::{ChannelId, ConfigError, TenantId};
use radio_config::{AutoJoinConfig, AutoJoinStore, JsonAutoJoinStore};

use crate::cli::AutojoinCommand;

/// Apply an edit. Returns whether anything changed.
fn apply(config: &mut AutoJoinConfig, command: &AutojoinCommand) -> bool {
    match command {
        AutojoinCommand::List => false,
        AutojoinCommand::Set { tenant, channel } => {
            let entry = config.entry(TenantId::from(tenant.as_str())).or_default();
            entry.auto_channel_id = Some(ChannelId::from(channel.as_str()));
            entry.auto_connect_enabled = true;
            true
        }
        AutojoinCommand::Enable { tenant } | AutojoinCommand::Disable { tenant } => {
            let enabled = matches!(command, AutojoinCommand::Enable { .. });
            let entry = config.entry(TenantId::from(tenant.as_str())).or_default();
            let changed = entry.auto_connect_enabled != enabled;
            entry.auto_connect_enabled = enabled;
            changed
        }
        AutojoinCommand::Clear { tenant } => config.remove(&TenantId::from(tenant.as_str())).is_some(),
    }
}

fn render(config: &AutoJoinConfig) -> String {
    if config.is_empty() {
        return "no auto-join entries".to_string();
    }
    config
        .iter()
        .map(|(tenant, entry)| {
            let channel = entry
                .auto_channel_id
                .as_ref()
                .map(ChannelId::as_str)
                .unwrap_or("-");
            let state = if entry.auto_connect_enabled {
                "enabled"
            } else {
                "disabled"
            };
            format!("{tenant}\t{channel}\t{state}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run(command: &AutojoinCommand, store: &JsonAutoJoinStore) -> Result<(), ConfigError> {
    let mut config = store.load()?;

    if apply(&mut config, command) {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "auto-join settings updated");
    }
    println!("{}", render(&config));
    Ok(())
}
