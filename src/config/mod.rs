pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_or_create_settings, load_settings};
pub use paths::{default_settings_path, SETTINGS_DIR, SETTINGS_FILE_NAME};
pub use save::save_settings;
pub use settings::{
    EditorIcons, EditorSettings, ListMenuIcons, ListMenuItems, ListMenuSettings, LoggingSettings,
    MenuSettings, MAX_MENU_ROWS, MIN_MENU_ROWS,
};
