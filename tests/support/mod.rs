#![allow(dead_code)]

use position_menus::config::MenuSettings;
use position_menus::host::{
    Actor, CompletionSender, EditableField, FieldEditResult, FieldEditor, MenuFrame, MessageSink,
    MutationResult, PermissionResolver, RecordStore, RenderSurface, TeleportService,
};
use position_menus::locale::Locales;
use position_menus::menu::{Capability, Collaborators, MenuContext};
use position_menus::position::{
    handle, Coordinate, Owner, PositionHandle, PositionMeta, PositionVariant, SavedPosition,
};
use position_menus::shared::ids::{ActorId, IconRef, PositionId};
use position_menus::shared::logging::EventLog;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

/// Ordered record of host-visible effects, shared by the fakes below.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub enum StoreCall {
    UpdateMetadata {
        position: PositionId,
        meta: PositionMeta,
        reply: CompletionSender<MutationResult>,
    },
    Delete {
        position: PositionId,
        reply: CompletionSender<MutationResult>,
    },
    SetVisibility {
        position: PositionId,
        public: bool,
        reply: CompletionSender<MutationResult>,
    },
}

impl StoreCall {
    pub fn complete(self, result: MutationResult) {
        match self {
            Self::UpdateMetadata { reply, .. }
            | Self::Delete { reply, .. }
            | Self::SetVisibility { reply, .. } => reply.complete(result),
        }
    }
}

/// Captures every mutation with its reply so tests decide when and how it completes.
pub struct RecordingStore {
    journal: Journal,
    calls: RefCell<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn metadata_updates(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, StoreCall::UpdateMetadata { .. }))
            .count()
    }

    pub fn take(&self) -> StoreCall {
        let mut calls = self.calls.borrow_mut();
        assert!(!calls.is_empty(), "no store call was issued");
        calls.remove(0)
    }
}

impl RecordStore for RecordingStore {
    fn update_metadata(
        &self,
        position: &SavedPosition,
        meta: PositionMeta,
        reply: CompletionSender<MutationResult>,
    ) {
        self.journal
            .borrow_mut()
            .push(format!("store:update_metadata:{}", position.id));
        self.calls.borrow_mut().push(StoreCall::UpdateMetadata {
            position: position.id.clone(),
            meta,
            reply,
        });
    }

    fn delete_record(&self, position: &SavedPosition, reply: CompletionSender<MutationResult>) {
        self.journal
            .borrow_mut()
            .push(format!("store:delete:{}", position.id));
        self.calls.borrow_mut().push(StoreCall::Delete {
            position: position.id.clone(),
            reply,
        });
    }

    fn set_visibility(
        &self,
        position: &SavedPosition,
        public: bool,
        reply: CompletionSender<MutationResult>,
    ) {
        self.journal
            .borrow_mut()
            .push(format!("store:set_visibility:{}:{public}", position.id));
        self.calls.borrow_mut().push(StoreCall::SetVisibility {
            position: position.id.clone(),
            public,
            reply,
        });
    }
}

pub struct RecordingSurface {
    journal: Journal,
    open: RefCell<HashMap<ActorId, MenuFrame>>,
    opened: RefCell<Vec<MenuFrame>>,
}

impl RecordingSurface {
    pub fn current(&self, actor: &Actor) -> Option<MenuFrame> {
        self.open.borrow().get(&actor.id).cloned()
    }

    pub fn open_count(&self) -> usize {
        self.opened.borrow().len()
    }
}

impl RenderSurface for RecordingSurface {
    fn open(&self, actor: &Actor, frame: MenuFrame) {
        self.journal
            .borrow_mut()
            .push(format!("surface:open:{}:{}", actor.id, frame.menu_id));
        self.opened.borrow_mut().push(frame.clone());
        self.open.borrow_mut().insert(actor.id.clone(), frame);
    }

    fn close(&self, actor: &ActorId) {
        self.journal
            .borrow_mut()
            .push(format!("surface:close:{actor}"));
        self.open.borrow_mut().remove(actor);
    }
}

pub struct RecordingTeleporter {
    journal: Journal,
}

impl TeleportService for RecordingTeleporter {
    fn teleport(&self, actor: &Actor, position: &SavedPosition) {
        self.journal
            .borrow_mut()
            .push(format!("teleport:{}:{}", actor.id, position.id));
    }
}

#[derive(Default)]
pub struct RecordingMessages {
    sent: RefCell<Vec<(ActorId, String)>>,
}

impl RecordingMessages {
    pub fn sent(&self) -> Vec<(ActorId, String)> {
        self.sent.borrow().clone()
    }
}

impl MessageSink for RecordingMessages {
    fn send_message(&self, actor: &ActorId, text: &str) {
        self.sent.borrow_mut().push((actor.clone(), text.to_string()));
    }
}

/// Capabilities granted per actor.
#[derive(Default)]
pub struct PermissionTable {
    grants: RefCell<HashMap<ActorId, HashSet<Capability>>>,
}

impl PermissionTable {
    pub fn grant(&self, actor: &Actor, capabilities: &[Capability]) {
        self.grants
            .borrow_mut()
            .entry(actor.id.clone())
            .or_default()
            .extend(capabilities.iter().copied());
    }
}

impl PermissionResolver for PermissionTable {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool {
        self.grants
            .borrow()
            .get(&actor.id)
            .is_some_and(|granted| granted.contains(&capability))
    }
}

#[derive(Default)]
pub struct RecordingFieldEditor {
    requests: RefCell<Vec<(EditableField, CompletionSender<FieldEditResult>)>>,
}

impl RecordingFieldEditor {
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn take(&self) -> (EditableField, CompletionSender<FieldEditResult>) {
        let mut requests = self.requests.borrow_mut();
        assert!(!requests.is_empty(), "no field edit was requested");
        requests.remove(0)
    }
}

impl FieldEditor for RecordingFieldEditor {
    fn begin_edit(
        &self,
        _actor: &Actor,
        _position: &SavedPosition,
        field: EditableField,
        reply: CompletionSender<FieldEditResult>,
    ) {
        self.requests.borrow_mut().push((field, reply));
    }
}

pub struct Harness {
    pub ctx: Rc<MenuContext>,
    pub journal: Journal,
    pub store: Rc<RecordingStore>,
    pub surface: Rc<RecordingSurface>,
    pub messages: Rc<RecordingMessages>,
    pub permissions: Rc<PermissionTable>,
    pub editor: Rc<RecordingFieldEditor>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(MenuSettings::default())
    }

    pub fn with_settings(settings: MenuSettings) -> Self {
        Self::with_settings_and_log(settings, EventLog::disabled())
    }

    pub fn with_settings_and_log(settings: MenuSettings, events: EventLog) -> Self {
        Self::build(settings, Locales::default(), events)
    }

    pub fn with_locales(settings: MenuSettings, locales: Locales) -> Self {
        Self::build(settings, locales, EventLog::disabled())
    }

    fn build(settings: MenuSettings, locales: Locales, events: EventLog) -> Self {
        let journal: Journal = Rc::new(RefCell::new(Vec::new()));
        let store = Rc::new(RecordingStore {
            journal: Rc::clone(&journal),
            calls: RefCell::new(Vec::new()),
        });
        let surface = Rc::new(RecordingSurface {
            journal: Rc::clone(&journal),
            open: RefCell::new(HashMap::new()),
            opened: RefCell::new(Vec::new()),
        });
        let messages = Rc::new(RecordingMessages::default());
        let permissions = Rc::new(PermissionTable::default());
        let editor = Rc::new(RecordingFieldEditor::default());
        let ctx = MenuContext::new(
            settings,
            Collaborators {
                store: store.clone(),
                teleporter: Rc::new(RecordingTeleporter {
                    journal: Rc::clone(&journal),
                }),
                permissions: permissions.clone(),
                locales: Rc::new(locales),
                surface: surface.clone(),
                messages: messages.clone(),
                field_editor: editor.clone(),
            },
            events,
        );
        Self {
            ctx,
            journal,
            store,
            surface,
            messages,
            permissions,
            editor,
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    /// Slot of the first cell keyed by `symbol` in the frame `actor` sees.
    pub fn slot(&self, actor: &Actor, symbol: char) -> usize {
        self.surface
            .current(actor)
            .and_then(|frame| frame.slot_of(symbol))
            .unwrap_or_else(|| panic!("no `{symbol}` cell open for {}", actor.id))
    }

    pub fn click(&self, actor: &Actor, symbol: char, kind: position_menus::host::ClickKind) {
        let slot = self.slot(actor, symbol);
        assert!(self.ctx.router().handle_click(actor, slot, kind));
    }

    pub fn open_menu_id(&self, actor: &Actor) -> Option<u64> {
        self.surface.current(actor).map(|frame| frame.menu_id)
    }
}

pub fn actor(id: &str) -> Actor {
    Actor::new(ActorId::parse(id).expect("actor id"), id)
}

pub fn holding(id: &str, icon: &str) -> Actor {
    actor(id).holding(Some(IconRef::parse(icon).expect("icon")))
}

pub fn coordinate(x: f64, y: f64, z: f64) -> Coordinate {
    Coordinate {
        world: "world".to_string(),
        x,
        y,
        z,
        yaw: 0.0,
        pitch: 0.0,
    }
}

pub fn home(id: &str, owner: &Actor, public: bool) -> SavedPosition {
    SavedPosition {
        id: PositionId::parse(id).expect("position id"),
        meta: PositionMeta {
            name: id.to_string(),
            description: String::new(),
            tags: BTreeMap::new(),
        },
        coordinate: coordinate(10.7, 64.0, -3.2),
        server: "survival".to_string(),
        variant: PositionVariant::Owned {
            owner: Owner {
                id: owner.id.clone(),
                username: owner.username.clone(),
            },
            public,
        },
    }
}

pub fn warp(id: &str) -> SavedPosition {
    SavedPosition {
        id: PositionId::parse(id).expect("position id"),
        meta: PositionMeta {
            name: id.to_string(),
            description: String::new(),
            tags: BTreeMap::new(),
        },
        coordinate: coordinate(0.5, 70.0, 0.5),
        server: "hub".to_string(),
        variant: PositionVariant::Shared,
    }
}

pub fn homes(count: usize, owner: &Actor) -> Vec<PositionHandle> {
    (0..count)
        .map(|n| handle(home(&format!("home-{n}"), owner, false)))
        .collect()
}
