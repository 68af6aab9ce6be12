use crate::host::{Actor, PermissionResolver};
use crate::position::{MenuType, PositionKind, SavedPosition};
use crate::shared::errors::MenuError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    EditOwn,
    EditOthers,
    EditShared,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EditOwn => "edit-own",
            Self::EditOthers => "edit-others",
            Self::EditShared => "edit-shared",
        }
    }
}

/// The capability an actor needs to edit `position`, or `None` when the
/// position cannot appear in a menu of `menu_type` at all.
pub fn required_capability(
    actor: &Actor,
    position: &SavedPosition,
    menu_type: MenuType,
) -> Option<Capability> {
    if !menu_type.accepts(position.kind()) {
        return None;
    }
    Some(match position.kind() {
        PositionKind::Shared => Capability::EditShared,
        PositionKind::Owned if position.is_owned_by(&actor.id) => Capability::EditOwn,
        PositionKind::Owned => Capability::EditOthers,
    })
}

pub fn can_edit(
    permissions: &dyn PermissionResolver,
    actor: &Actor,
    position: &SavedPosition,
    menu_type: MenuType,
) -> bool {
    required_capability(actor, position, menu_type)
        .is_some_and(|capability| permissions.has_capability(actor, capability))
}

pub fn ensure_can_edit(
    permissions: &dyn PermissionResolver,
    actor: &Actor,
    position: &SavedPosition,
    menu_type: MenuType,
) -> Result<(), MenuError> {
    if can_edit(permissions, actor, position, menu_type) {
        return Ok(());
    }
    Err(MenuError::PermissionDenied {
        actor: actor.id.to_string(),
        position: position.id.to_string(),
    })
}
