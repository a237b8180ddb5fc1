//! Where the config file lives, and writing the commented default.

use std::path::{Path, PathBuf};

use huddle_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

const APP_DIR: &str = "huddle";
const FILE_NAME: &str = "config.toml";

/// `<config dir>/huddle/config.toml`, e.g. `~/.config/huddle/config.toml` on Linux.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| ConfigError::StateError("no config directory on this platform".into()))
}

/// Write the commented default config to `path`.
///
/// The file is written beside its final location and renamed into place, so
/// a crash never leaves a half-written config behind.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_error = |action: &str, target: &Path, e: std::io::Error| {
        ConfigError::StateError(format!("failed to {action} {}: {e}", target.display()))
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
    }

    let staging = path.with_extension("toml.tmp");
    std::fs::write(&staging, default_config_toml()).map_err(|e| io_error("write", &staging, e))?;
    std::fs::rename(&staging, path).map_err(|e| io_error("move config into", path, e))?;

    info!(path = %path.display(), "Wrote default config");
    Ok(())
}
