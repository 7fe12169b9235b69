//! Atomic file replacement shared by the config writer and the auto-join
//! store: write a uniquely named temp file next to the target, then rename
//! it over the target.

use std::io::Write;
use std::path::Path;

use radio_common::ConfigError;

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| {
        ConfigError::PersistError(format!("failed to create directory {}: {e}", dir.display()))
    })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".radio-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| {
            ConfigError::PersistError(format!("failed to create temp file in {}: {e}", dir.display()))
        })?;

    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| {
            ConfigError::PersistError(format!("failed to write {}: {e}", tmp.path().display()))
        })?;

    // A failed persist drops the temp file with the error.
    tmp.persist(path).map_err(|e| {
        ConfigError::PersistError(format!("failed to replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}
