use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_ICON_NAMESPACE: &str = "minecraft";

pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err(format!(
        "{kind} must use only ASCII letters, digits, '-' or '_'"
    ))
}

macro_rules! define_id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, String> {
                validate_identifier_value($kind, raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(|err| {
                    D::Error::custom(format!("invalid {} `{}`: {}", $kind, raw, err))
                })
            }
        }
    };
}

define_id_type!(ActorId, "actor id");
define_id_type!(PositionId, "position id");

/// Namespaced icon key such as `minecraft:oak_sign`.
///
/// Bare paths are placed in the default namespace and the whole key is
/// lowercased, so `Stone` and `minecraft:stone` name the same icon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct IconRef(String);

impl IconRef {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err("icon must be non-empty".to_string());
        }
        let (namespace, path) = match normalized.split_once(':') {
            Some((namespace, path)) => (namespace, path),
            None => (DEFAULT_ICON_NAMESPACE, normalized.as_str()),
        };
        if namespace.is_empty() || path.is_empty() {
            return Err("icon must use `namespace:path` with non-empty parts".to_string());
        }
        let valid_namespace = namespace
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || "_.-".contains(ch));
        let valid_path = path
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || "_.-/".contains(ch));
        if !valid_namespace || !valid_path {
            return Err(
                "icon must use only lowercase ASCII letters, digits, '_', '.', '-' or '/'"
                    .to_string(),
            );
        }
        Ok(Self(format!("{namespace}:{path}")))
    }

    /// Icon in the default namespace; `path` must already be a valid lowercase path.
    pub(crate) fn builtin(path: &'static str) -> Self {
        Self(format!("{DEFAULT_ICON_NAMESPACE}:{path}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path(&self) -> &str {
        self.0
            .split_once(':')
            .map(|(_, path)| path)
            .unwrap_or(self.0.as_str())
    }

    /// The empty-slot icon; a cell carrying it renders as nothing.
    pub fn is_air(&self) -> bool {
        self.path() == "air"
    }
}

impl std::fmt::Display for IconRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for IconRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|err| D::Error::custom(format!("invalid icon `{raw}`: {err}")))
    }
}
