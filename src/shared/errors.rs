/// A mutation rejected by a collaborator (duplicate name, not found, quota).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ValidationFailure {
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("actor `{actor}` may not edit position `{position}`")]
    PermissionDenied { actor: String, position: String },
    #[error("precondition not met: {0}")]
    PreconditionNotMet(&'static str),
    #[error("mutation rejected: {0}")]
    Validation(#[from] ValidationFailure),
    #[error("completion arrived for destroyed menu {menu_id}")]
    StaleReference { menu_id: u64 },
    #[error("menu {menu_id} has been destroyed")]
    Destroyed { menu_id: u64 },
    #[error("{menu_type} menu cannot hold {kind} position `{position}`")]
    MismatchedRecord {
        menu_type: &'static str,
        kind: &'static str,
        position: String,
    },
}

impl MenuError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "permission_denied",
            Self::PreconditionNotMet(_) => "precondition_not_met",
            Self::Validation(_) => "validation_failure",
            Self::StaleReference { .. } => "stale_reference",
            Self::Destroyed { .. } => "destroyed",
            Self::MismatchedRecord { .. } => "mismatched_record",
        }
    }

    /// Rejections the actor caused by clicking; these are expected and never surfaced.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. }
                | Self::PreconditionNotMet(_)
                | Self::StaleReference { .. }
                | Self::Destroyed { .. }
        )
    }
}
