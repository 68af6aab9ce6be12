//! Contracts the menus consume from the hosting process.
//!
//! Storage, teleportation, text capture, localization, permission strings and
//! the grid widget itself all live on the host side; the menus only call
//! through these traits and react to what comes back.

pub mod completion;
pub mod memory;

use crate::menu::permission::Capability;
use crate::position::{Coordinate, PositionMeta, SavedPosition};
use crate::shared::errors::ValidationFailure;
use crate::shared::ids::{ActorId, IconRef};
pub use completion::{CompletionQueue, CompletionSender, DrainReport, Ticket};
pub use memory::InMemoryRecordStore;

pub const GRID_COLUMNS: usize = 9;

pub type MutationResult = Result<(), ValidationFailure>;
pub type FieldEditResult = Result<FieldEdit, ValidationFailure>;

/// The live user session behind a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub username: String,
    /// Icon of the item in the active hand slot, `None` when the hand is empty.
    pub held_item: Option<IconRef>,
}

impl Actor {
    pub fn new(id: ActorId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            held_item: None,
        }
    }

    pub fn holding(mut self, item: Option<IconRef>) -> Self {
        self.held_item = item.filter(|icon| !icon.is_air());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Primary,
    Secondary,
    /// Modifier held while primary-clicking.
    ShiftPrimary,
    ShiftSecondary,
    /// Item dropped on the cell; bedrock-edition clients send this for a long press.
    Drop,
    Middle,
}

impl ClickKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::ShiftPrimary => "shift_primary",
            Self::ShiftSecondary => "shift_secondary",
            Self::Drop => "drop",
            Self::Middle => "middle",
        }
    }

    /// Input kinds accepted as a deliberate confirmation for destructive actions.
    pub fn confirms_destructive_action(self) -> bool {
        matches!(self, Self::Secondary | Self::Drop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    Name,
    Description,
    Location,
}

impl EditableField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Location => "location",
        }
    }
}

/// A confirmed edit produced by the host's text or location capture.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Name(String),
    Description(String),
    Location(Coordinate),
}

impl FieldEdit {
    pub fn field(&self) -> EditableField {
        match self {
            Self::Name(_) => EditableField::Name,
            Self::Description(_) => EditableField::Description,
            Self::Location(_) => EditableField::Location,
        }
    }

    pub fn apply_to(&self, position: &mut SavedPosition) {
        match self {
            Self::Name(name) => position.meta.name = name.clone(),
            Self::Description(description) => position.meta.description = description.clone(),
            Self::Location(coordinate) => position.coordinate = coordinate.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndicator {
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCell {
    pub symbol: char,
    pub icon: IconRef,
    pub lines: Vec<String>,
    pub clickable: bool,
}

/// Fully resolved grid handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuFrame {
    pub menu_id: u64,
    pub title: String,
    pub rows: usize,
    /// Row-major, `rows * GRID_COLUMNS` long; `None` renders as an empty slot.
    pub cells: Vec<Option<FrameCell>>,
    pub page: Option<PageIndicator>,
}

impl MenuFrame {
    pub fn cell(&self, slot: usize) -> Option<&FrameCell> {
        self.cells.get(slot).and_then(Option::as_ref)
    }

    pub fn slot_of(&self, symbol: char) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.as_ref().is_some_and(|cell| cell.symbol == symbol))
    }

    pub fn slots_of(&self, symbol: char) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.as_ref().is_some_and(|cell| cell.symbol == symbol))
            .map(|(slot, _)| slot)
            .collect()
    }
}

pub trait RecordStore {
    fn update_metadata(
        &self,
        position: &SavedPosition,
        meta: PositionMeta,
        reply: CompletionSender<MutationResult>,
    );

    fn delete_record(&self, position: &SavedPosition, reply: CompletionSender<MutationResult>);

    fn set_visibility(
        &self,
        position: &SavedPosition,
        public: bool,
        reply: CompletionSender<MutationResult>,
    );
}

pub trait TeleportService {
    fn teleport(&self, actor: &Actor, position: &SavedPosition);
}

pub trait IdentityAdapter {
    type Session;

    fn resolve_actor(&self, session: &Self::Session) -> Actor;
}

pub trait RenderSurface {
    fn open(&self, actor: &Actor, frame: MenuFrame);
    fn close(&self, actor: &ActorId);
}

pub trait MessageSink {
    fn send_message(&self, actor: &ActorId, text: &str);
}

pub trait Localizer {
    fn resolve(&self, key: &str, args: &[&str]) -> String;
}

pub trait PermissionResolver {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool;
}

/// Text or location capture for rename / re-describe / relocate.
pub trait FieldEditor {
    fn begin_edit(
        &self,
        actor: &Actor,
        position: &SavedPosition,
        field: EditableField,
        reply: CompletionSender<FieldEditResult>,
    );
}
