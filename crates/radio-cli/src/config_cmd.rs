use std::path::Path;

use radio_common::ConfigError;
use radio_config::toml_loader::{create_default_config, default_config_path};
use radio_config::{config_to_json, save_config_to_path, validation, RadioConfig};
use tracing::info;

use crate::cli::ConfigCommand;

pub fn run(
    command: &ConfigCommand,
    path_override: Option<&Path>,
    config: &RadioConfig,
) -> Result<(), ConfigError> {
    match command {
        ConfigCommand::Show => {
            println!("{}", config_to_json(config));
            Ok(())
        }
        ConfigCommand::Init { force } => {
            let path = match path_override {
                Some(path) => path.to_path_buf(),
                None => default_config_path()?,
            };
            if path.exists() && !force {
                return Err(ConfigError::PersistError(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            create_default_config(&path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
        ConfigCommand::Validate => {
            validation::validate(config)?;
            info!("config is valid");
            println!("config is valid");
            Ok(())
        }
        ConfigCommand::Export { path } => {
            save_config_to_path(config, path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}
