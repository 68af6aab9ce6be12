use super::{save_settings, ConfigError, MenuSettings};
use std::path::Path;

pub fn load_settings(path: &Path) -> Result<MenuSettings, ConfigError> {
    let settings = MenuSettings::from_path(path)?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings, writing the defaults first when no file exists yet.
pub fn load_or_create_settings(path: &Path) -> Result<MenuSettings, ConfigError> {
    if !path.exists() {
        let settings = MenuSettings::default();
        save_settings(&settings, path)?;
        return Ok(settings);
    }
    load_settings(path)
}
