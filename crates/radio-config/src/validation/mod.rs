//! Full configuration validation.
//!
//! Validates numeric ranges and required strings. Each area has its own
//! function; this orchestrator calls them all and collects errors into a
//! single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::RadioConfig;
use radio_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &RadioConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_stream(&mut errors, config);
    sections::validate_connection(&mut errors, config);
    sections::validate_reconnect(&mut errors, config);
    sections::validate_health(&mut errors, config);
    sections::validate_pipeline(&mut errors, config);
    sections::validate_shutdown(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
