use crate::config::ConfigError;
use std::path::PathBuf;

pub const SETTINGS_DIR: &str = ".position-menus";
pub const SETTINGS_FILE_NAME: &str = "config.yaml";

pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(SETTINGS_DIR)
        .join(SETTINGS_FILE_NAME))
}
