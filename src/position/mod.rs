//! Saved position records as the menus see them.
//!
//! Records are created and destroyed by the record store; menus hold them
//! through [`PositionHandle`] so that a mutation mirrored by an edit menu is
//! visible in the list menu it was opened from.

use crate::shared::ids::{ActorId, PositionId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type PositionHandle = Rc<RefCell<SavedPosition>>;

pub fn handle(position: SavedPosition) -> PositionHandle {
    Rc::new(RefCell::new(position))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PositionMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Coordinate {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Coordinate {
    /// Block coordinates, floored the way the info panel shows them.
    pub fn block(&self) -> (i64, i64, i64) {
        (
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.z.floor() as i64,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Owner {
    pub id: ActorId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionVariant {
    Owned {
        owner: Owner,
        #[serde(default)]
        public: bool,
    },
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Owned,
    Shared,
}

impl PositionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Shared => "shared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SavedPosition {
    pub id: PositionId,
    pub meta: PositionMeta,
    pub coordinate: Coordinate,
    pub server: String,
    pub variant: PositionVariant,
}

impl SavedPosition {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn description(&self) -> &str {
        &self.meta.description
    }

    pub fn kind(&self) -> PositionKind {
        match self.variant {
            PositionVariant::Owned { .. } => PositionKind::Owned,
            PositionVariant::Shared => PositionKind::Shared,
        }
    }

    pub fn owner(&self) -> Option<&Owner> {
        match &self.variant {
            PositionVariant::Owned { owner, .. } => Some(owner),
            PositionVariant::Shared => None,
        }
    }

    /// `Some(public)` for owned records; shared records have no visibility flag.
    pub fn visibility(&self) -> Option<bool> {
        match self.variant {
            PositionVariant::Owned { public, .. } => Some(public),
            PositionVariant::Shared => None,
        }
    }

    /// Mirrors a confirmed visibility change. Returns false for shared records.
    pub fn set_visibility(&mut self, value: bool) -> bool {
        match &mut self.variant {
            PositionVariant::Owned { public, .. } => {
                *public = value;
                true
            }
            PositionVariant::Shared => false,
        }
    }

    pub fn is_owned_by(&self, actor: &ActorId) -> bool {
        self.owner().is_some_and(|owner| &owner.id == actor)
    }
}

/// Which family of records a list menu shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuType {
    /// The actor's own (or a named user's) owned positions.
    Owned,
    /// Owned positions other users made public.
    SharedReadPublicCopy,
    Shared,
}

impl MenuType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::SharedReadPublicCopy => "public",
            Self::Shared => "shared",
        }
    }

    pub fn accepts(self, kind: PositionKind) -> bool {
        match self {
            Self::Owned | Self::SharedReadPublicCopy => kind == PositionKind::Owned,
            Self::Shared => kind == PositionKind::Shared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(public: bool) -> SavedPosition {
        SavedPosition {
            id: PositionId::parse("home-1").expect("id"),
            meta: PositionMeta {
                name: "base".to_string(),
                description: String::new(),
                tags: BTreeMap::new(),
            },
            coordinate: Coordinate {
                world: "world".to_string(),
                x: -10.5,
                y: 64.0,
                z: 3.99,
                yaw: 0.0,
                pitch: 0.0,
            },
            server: "survival".to_string(),
            variant: PositionVariant::Owned {
                owner: Owner {
                    id: ActorId::parse("alice").expect("id"),
                    username: "Alice".to_string(),
                },
                public,
            },
        }
    }

    #[test]
    fn capability_accessors_follow_variant() {
        let mut home = owned(false);
        assert_eq!(home.kind(), PositionKind::Owned);
        assert_eq!(home.visibility(), Some(false));
        assert!(home.is_owned_by(&ActorId::parse("alice").expect("id")));
        assert!(home.set_visibility(true));
        assert_eq!(home.visibility(), Some(true));

        home.variant = PositionVariant::Shared;
        assert_eq!(home.owner(), None);
        assert_eq!(home.visibility(), None);
        assert!(!home.set_visibility(true));
        assert!(!home.is_owned_by(&ActorId::parse("alice").expect("id")));
    }

    #[test]
    fn block_coordinates_floor_toward_negative_infinity() {
        assert_eq!(owned(false).coordinate.block(), (-11, 64, 3));
    }

    #[test]
    fn menu_type_accepts_matching_kinds_only() {
        assert!(MenuType::Owned.accepts(PositionKind::Owned));
        assert!(MenuType::SharedReadPublicCopy.accepts(PositionKind::Owned));
        assert!(!MenuType::Owned.accepts(PositionKind::Shared));
        assert!(MenuType::Shared.accepts(PositionKind::Shared));
        assert!(!MenuType::Shared.accepts(PositionKind::Owned));
    }

    #[test]
    fn records_deserialize_from_yaml() {
        let position: SavedPosition = serde_yaml::from_str(
            r#"
id: spawn
meta:
  name: spawn
coordinate: { world: world, x: 0.5, y: 70, z: 0.5 }
server: hub
variant:
  kind: shared
"#,
        )
        .expect("parse position");
        assert_eq!(position.kind(), PositionKind::Shared);
        assert!(position.meta.tags.is_empty());
    }
}
