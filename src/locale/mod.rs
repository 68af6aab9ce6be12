//! YAML-backed message catalogue used as the default [`Localizer`].

use crate::config::ConfigError;
use crate::host::Localizer;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("owned_list_title", "Homes"),
    ("public_list_title", "Public Homes"),
    ("shared_list_title", "Warps"),
    ("item_name", "%1%"),
    ("item_description", "%1%"),
    ("item_no_description", "No description"),
    ("item_controls_primary", "Left-click: Teleport"),
    ("item_controls_secondary", "Right-click: Edit"),
    ("item_controls_quick_set", "Shift-click: Set icon to held item"),
    ("pagination_first_page", "First page"),
    ("pagination_previous_page", "Previous page"),
    ("pagination_next_page", "Next page"),
    ("pagination_last_page", "Last page"),
    ("pagination_page_indicator", "Page %1% of %2%"),
    ("controls_title", "Controls"),
    ("controls_primary", "Left-click an item to teleport"),
    ("controls_secondary", "Right-click an item to edit it"),
    ("controls_quick_set", "Shift-click to set the icon to your held item"),
    ("owned_editor_title", "Editing home: %1%"),
    ("shared_editor_title", "Editing warp: %1%"),
    ("back_button", "Back"),
    ("edit_location_button", "Relocate"),
    ("edit_location_message", "Move this %1% to where you stand"),
    ("edit_name_button", "Rename"),
    ("edit_name_message", "Current name: %1%"),
    ("edit_description_button", "Edit description"),
    ("edit_description_message", "%1%"),
    ("edit_description_message_blank", "No description set"),
    ("edit_visibility_button", "Toggle visibility"),
    ("edit_visibility_message", "Currently: %1%"),
    ("visibility_public", "Public"),
    ("visibility_private", "Private"),
    ("delete_button", "Delete"),
    ("delete_button_describe", "Right-click to delete permanently"),
    ("info_name", "Name: %1%"),
    ("info_world", "World: %1%"),
    ("info_server", "Server: %1%"),
    ("info_coordinates", "Coordinates: %1%, %2%, %3%"),
    ("info_owner", "Owner: %1%"),
    ("type_owned", "home"),
    ("type_shared", "warp"),
    ("item_deleted_name", "%1% (deleted)"),
    ("updated_icon", "Updated the icon of %1%"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locales {
    messages: BTreeMap<String, String>,
}

impl Default for Locales {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        }
    }
}

impl Locales {
    /// Built-in messages overlaid with the `key: message` pairs of a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let overrides: BTreeMap<String, String> =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let mut locales = Self::default();
        locales.messages.extend(overrides);
        Ok(locales)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

impl Localizer for Locales {
    fn resolve(&self, key: &str, args: &[&str]) -> String {
        let Some(template) = self.get(key) else {
            return key.to_string();
        };
        format_placeholders(template, args)
    }
}

/// Replaces `%1%`..`%n%` with the matching argument; unknown indices stay as written.
pub fn format_placeholders(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let digits = after.chars().take_while(char::is_ascii_digit).count();
        let closes = digits > 0 && after[digits..].starts_with('%');
        let index = if closes {
            after[..digits].parse::<usize>().ok()
        } else {
            None
        };
        match index.and_then(|index| index.checked_sub(1)).and_then(|i| args.get(i)) {
            Some(arg) => {
                out.push_str(arg);
                rest = &after[digits + 1..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Greedy word wrap; words longer than `width` get a line of their own.
pub fn text_wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
