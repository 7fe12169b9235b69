//! Environment variable overrides.

use crate::schema::RadioConfig;

/// Overrides the stream URL.
pub const RADIO_URL_ENV: &str = "RADIO_URL";
/// Overrides the auto-join persistence file.
pub const AUTO_JOIN_PATH_ENV: &str = "RADIO_AUTO_JOIN_PATH";

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut RadioConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut RadioConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(RADIO_URL_ENV) {
        tracing::debug!(%url, "stream url overridden from environment");
        config.stream.url = url;
    }
    if let Some(path) = non_empty(AUTO_JOIN_PATH_ENV) {
        config.persistence.auto_join_path = path.into();
    }
}
