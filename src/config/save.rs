use super::{ConfigError, MenuSettings};
use std::fs;
use std::path::Path;

const SETTINGS_HEADER: &str = "# Saved position menus\n# Icons use `namespace:path` keys; bare names use the minecraft namespace.\n";

fn create_parent_dir(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

pub fn save_settings(settings: &MenuSettings, path: &Path) -> Result<(), ConfigError> {
    settings.validate()?;
    create_parent_dir(path)?;
    let body = serde_yaml::to_string(settings).map_err(|source| ConfigError::Encode {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, format!("{SETTINGS_HEADER}{body}")).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}
