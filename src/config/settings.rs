use super::ConfigError;
use crate::position::MenuType;
use crate::shared::ids::IconRef;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MIN_MENU_ROWS: usize = 2;
pub const MAX_MENU_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MenuSettings {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub locales: Option<PathBuf>,
    #[serde(default)]
    pub menu: ListMenuSettings,
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListMenuSettings {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_true")]
    pub show_controls: bool,
    #[serde(default)]
    pub display_controls_help_in_lore: bool,
    #[serde(default = "default_text_wrap_length")]
    pub text_wrap_length: usize,
    #[serde(default)]
    pub items: ListMenuItems,
    #[serde(default)]
    pub icons: ListMenuIcons,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListMenuItems {
    #[serde(default = "air", alias = "homes_filler")]
    pub owned_filler: IconRef,
    #[serde(default = "air", alias = "public_homes_filler")]
    pub public_filler: IconRef,
    #[serde(default = "air", alias = "warps_filler")]
    pub shared_filler: IconRef,
    #[serde(default = "stone")]
    pub default_icon: IconRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListMenuIcons {
    #[serde(default = "spectral_arrow")]
    pub paginate_first_page: IconRef,
    #[serde(default = "arrow")]
    pub paginate_previous_page: IconRef,
    #[serde(default = "arrow")]
    pub paginate_next_page: IconRef,
    #[serde(default = "spectral_arrow")]
    pub paginate_last_page: IconRef,
    #[serde(default = "oak_sign")]
    pub controls_icon: IconRef,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub icons: EditorIcons,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EditorIcons {
    #[serde(default = "air", alias = "home_editor_filler")]
    pub owned_filler: IconRef,
    #[serde(default = "air", alias = "warp_editor_filler")]
    pub shared_filler: IconRef,
    #[serde(default = "barrier")]
    pub back_button: IconRef,
    #[serde(default = "oak_sign")]
    pub edit_location_button: IconRef,
    #[serde(default = "name_tag")]
    pub edit_name_button: IconRef,
    #[serde(default = "writable_book")]
    pub edit_description_button: IconRef,
    #[serde(default = "nether_star", alias = "edit_privacy_button")]
    pub edit_visibility_button: IconRef,
    #[serde(default = "barrier")]
    pub delete_button: IconRef,
    #[serde(default = "knowledge_book")]
    pub info_panel: IconRef,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub event_log: Option<PathBuf>,
}

fn default_language() -> String {
    "en-gb".to_string()
}

fn default_rows() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_text_wrap_length() -> usize {
    17
}

fn air() -> IconRef {
    IconRef::builtin("air")
}

fn stone() -> IconRef {
    IconRef::builtin("stone")
}

fn arrow() -> IconRef {
    IconRef::builtin("arrow")
}

fn spectral_arrow() -> IconRef {
    IconRef::builtin("spectral_arrow")
}

fn oak_sign() -> IconRef {
    IconRef::builtin("oak_sign")
}

fn barrier() -> IconRef {
    IconRef::builtin("barrier")
}

fn name_tag() -> IconRef {
    IconRef::builtin("name_tag")
}

fn writable_book() -> IconRef {
    IconRef::builtin("writable_book")
}

fn nether_star() -> IconRef {
    IconRef::builtin("nether_star")
}

fn knowledge_book() -> IconRef {
    IconRef::builtin("knowledge_book")
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            locales: None,
            menu: ListMenuSettings::default(),
            editor: EditorSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ListMenuSettings {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            show_controls: true,
            display_controls_help_in_lore: false,
            text_wrap_length: default_text_wrap_length(),
            items: ListMenuItems::default(),
            icons: ListMenuIcons::default(),
        }
    }
}

impl Default for ListMenuItems {
    fn default() -> Self {
        Self {
            owned_filler: air(),
            public_filler: air(),
            shared_filler: air(),
            default_icon: stone(),
        }
    }
}

impl Default for ListMenuIcons {
    fn default() -> Self {
        Self {
            paginate_first_page: spectral_arrow(),
            paginate_previous_page: arrow(),
            paginate_next_page: arrow(),
            paginate_last_page: spectral_arrow(),
            controls_icon: oak_sign(),
        }
    }
}

impl Default for EditorIcons {
    fn default() -> Self {
        Self {
            owned_filler: air(),
            shared_filler: air(),
            back_button: barrier(),
            edit_location_button: oak_sign(),
            edit_name_button: name_tag(),
            edit_description_button: writable_book(),
            edit_visibility_button: nether_star(),
            delete_button: barrier(),
            info_panel: knowledge_book(),
        }
    }
}

impl MenuSettings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`language` must be non-empty".to_string(),
            ));
        }
        if self.menu.text_wrap_length == 0 {
            return Err(ConfigError::Settings(
                "`menu.text_wrap_length` must be > 0".to_string(),
            ));
        }
        if let Some(path) = &self.locales {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Settings(
                    "`locales` must be a non-empty path when set".to_string(),
                ));
            }
        }
        if let Some(path) = &self.logging.event_log {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Settings(
                    "`logging.event_log` must be a non-empty path when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Configured list menu height, clamped to what the grid surface supports.
    pub fn menu_rows(&self) -> usize {
        self.menu.rows.clamp(MIN_MENU_ROWS, MAX_MENU_ROWS)
    }

    pub fn list_filler(&self, menu_type: MenuType) -> &IconRef {
        match menu_type {
            MenuType::Owned => &self.menu.items.owned_filler,
            MenuType::SharedReadPublicCopy => &self.menu.items.public_filler,
            MenuType::Shared => &self.menu.items.shared_filler,
        }
    }

    pub fn editor_filler(&self, menu_type: MenuType) -> &IconRef {
        match menu_type {
            MenuType::Owned | MenuType::SharedReadPublicCopy => &self.editor.icons.owned_filler,
            MenuType::Shared => &self.editor.icons.shared_filler,
        }
    }
}
