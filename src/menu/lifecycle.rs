//! Show / close / destroy semantics shared by every menu, the context the
//! menus are built against, and the router that delivers host clicks.

use super::layout::{ActionTable, FrameBuilder, GridLayout};
use crate::config::MenuSettings;
use crate::host::{
    Actor, ClickKind, CompletionQueue, DrainReport, FieldEditor, IdentityAdapter, Localizer,
    MessageSink, PermissionResolver, RecordStore, RenderSurface, TeleportService,
};
use crate::shared::errors::MenuError;
use crate::shared::ids::ActorId;
use crate::shared::logging::EventLog;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Host services a [`MenuContext`] is assembled from.
pub struct Collaborators {
    pub store: Rc<dyn RecordStore>,
    pub teleporter: Rc<dyn TeleportService>,
    pub permissions: Rc<dyn PermissionResolver>,
    pub locales: Rc<dyn Localizer>,
    pub surface: Rc<dyn RenderSurface>,
    pub messages: Rc<dyn MessageSink>,
    pub field_editor: Rc<dyn FieldEditor>,
}

pub struct MenuContext {
    settings: MenuSettings,
    services: Collaborators,
    completions: CompletionQueue,
    router: MenuRouter,
    events: EventLog,
    next_menu_id: Cell<u64>,
}

impl MenuContext {
    pub fn new(settings: MenuSettings, services: Collaborators, events: EventLog) -> Rc<Self> {
        Rc::new(Self {
            settings,
            services,
            completions: CompletionQueue::new(),
            router: MenuRouter::default(),
            events,
            next_menu_id: Cell::new(1),
        })
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.services.store.as_ref()
    }

    pub fn teleporter(&self) -> &dyn TeleportService {
        self.services.teleporter.as_ref()
    }

    pub fn permissions(&self) -> &dyn PermissionResolver {
        self.services.permissions.as_ref()
    }

    pub fn locales(&self) -> &dyn Localizer {
        self.services.locales.as_ref()
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.services.surface.as_ref()
    }

    pub fn messages(&self) -> &dyn MessageSink {
        self.services.messages.as_ref()
    }

    pub fn field_editor(&self) -> &dyn FieldEditor {
        self.services.field_editor.as_ref()
    }

    pub fn completions(&self) -> &CompletionQueue {
        &self.completions
    }

    pub fn router(&self) -> &MenuRouter {
        &self.router
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn text(&self, key: &str, args: &[&str]) -> String {
        self.locales().resolve(key, args)
    }

    /// One host tick: runs every collaborator completion delivered so far.
    pub fn tick(&self) -> DrainReport {
        let report = self.completions.drain();
        if report.abandoned > 0 {
            self.events.debug(
                "completion_abandoned",
                &[("count", Value::from(report.abandoned))],
            );
        }
        report
    }

    /// Logs a rejected click or completion. Nothing is surfaced to the actor.
    pub fn report_rejection(&self, menu_id: u64, actor: &ActorId, action: &str, err: &MenuError) {
        let fields = [
            ("menu_id", Value::from(menu_id)),
            ("actor", Value::from(actor.as_str())),
            ("action", Value::from(action)),
            ("kind", Value::from(err.kind())),
            ("reason", Value::from(err.to_string())),
        ];
        match err {
            MenuError::Validation(_) => self.events.warn("mutation_rejected", &fields),
            MenuError::StaleReference { .. } => self.events.debug("stale_completion", &fields),
            _ => self.events.debug("click_ignored", &fields),
        }
    }

    fn allocate_menu_id(&self) -> u64 {
        let id = self.next_menu_id.get();
        self.next_menu_id.set(id + 1);
        id
    }
}

/// State every menu carries: identity, liveness and the action table of
/// each actor currently viewing it.
pub struct MenuCore<A> {
    id: u64,
    ctx: Rc<MenuContext>,
    layout: GridLayout,
    destroyed: Cell<bool>,
    views: RefCell<HashMap<ActorId, ActionTable<A>>>,
}

impl<A: Clone> MenuCore<A> {
    pub fn new(ctx: &Rc<MenuContext>, layout: GridLayout) -> Self {
        Self {
            id: ctx.allocate_menu_id(),
            ctx: Rc::clone(ctx),
            layout,
            destroyed: Cell::new(false),
            views: RefCell::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn ctx(&self) -> &Rc<MenuContext> {
        &self.ctx
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn is_viewing(&self, actor: &ActorId) -> bool {
        self.views.borrow().contains_key(actor)
    }

    pub fn viewers(&self) -> Vec<ActorId> {
        self.views.borrow().keys().cloned().collect()
    }

    pub fn ensure_alive(&self) -> Result<(), MenuError> {
        if self.is_destroyed() {
            return Err(MenuError::Destroyed { menu_id: self.id });
        }
        Ok(())
    }

    /// Liveness check for completions; a destroyed menu makes them stale.
    pub fn ensure_current(&self) -> Result<(), MenuError> {
        if self.is_destroyed() {
            return Err(MenuError::StaleReference { menu_id: self.id });
        }
        Ok(())
    }

    fn action_at(&self, actor: &ActorId, slot: usize) -> Option<A> {
        self.views
            .borrow()
            .get(actor)
            .and_then(|actions| actions.get(&slot))
            .cloned()
    }
}

pub trait Menu: 'static {
    type Action: Clone + fmt::Debug + 'static;

    fn core(&self) -> &MenuCore<Self::Action>;

    fn title(&self, actor: &Actor) -> String;

    /// Fills the frame for `actor`; called on every show.
    fn build(&self, actor: &Actor, frame: &mut FrameBuilder<Self::Action>);

    fn on_action(
        self: Rc<Self>,
        actor: &Actor,
        action: Self::Action,
        kind: ClickKind,
    ) -> Result<(), MenuError>;
}

/// Lifecycle operations available on any shared menu handle.
pub trait MenuLifecycle {
    /// Rebuilds the frame for `actor` and opens it. No-op once destroyed.
    fn show(&self, actor: &Actor);

    fn close(&self, actor: &ActorId);

    /// Closes the menu for every viewer; it can never be shown again.
    fn destroy(&self);

    fn is_destroyed(&self) -> bool;
}

impl<M: Menu> MenuLifecycle for Rc<M> {
    fn show(&self, actor: &Actor) {
        let core = self.core();
        let ctx = core.ctx();
        if let Err(err) = core.ensure_alive() {
            ctx.report_rejection(core.id(), &actor.id, "show", &err);
            return;
        }

        let mut builder = FrameBuilder::new(core.layout());
        self.build(actor, &mut builder);
        let (frame, actions) = builder.finish(core.id(), self.title(actor));
        let page = frame.page;
        core.views.borrow_mut().insert(actor.id.clone(), actions);

        let target: Rc<dyn ClickTarget> = Rc::clone(self) as Rc<dyn ClickTarget>;
        ctx.router().attach(&actor.id, target);
        ctx.surface().open(actor, frame);

        let mut fields = vec![
            ("menu_id", Value::from(core.id())),
            ("actor", Value::from(actor.id.as_str())),
        ];
        if let Some(page) = page {
            fields.push(("page", Value::from(page.index)));
            fields.push(("total_pages", Value::from(page.total)));
        }
        ctx.events().info("menu_shown", &fields);
    }

    fn close(&self, actor: &ActorId) {
        let core = self.core();
        let was_open = core.views.borrow_mut().remove(actor).is_some();
        if !was_open {
            return;
        }
        let ctx = core.ctx();
        ctx.router().detach(actor, core.id());
        ctx.surface().close(actor);
        ctx.events().info(
            "menu_closed",
            &[
                ("menu_id", Value::from(core.id())),
                ("actor", Value::from(actor.as_str())),
            ],
        );
    }

    fn destroy(&self) {
        let core = self.core();
        if core.destroyed.replace(true) {
            return;
        }
        let viewers: Vec<ActorId> = core.views.borrow_mut().drain().map(|(id, _)| id).collect();
        let ctx = core.ctx();
        for viewer in &viewers {
            ctx.router().detach(viewer, core.id());
            ctx.surface().close(viewer);
        }
        ctx.events()
            .info("menu_destroyed", &[("menu_id", Value::from(core.id()))]);
    }

    fn is_destroyed(&self) -> bool {
        self.core().is_destroyed()
    }
}

/// Type-erased view of a menu, as held by the router.
pub trait ClickTarget {
    fn menu_id(&self) -> u64;

    fn handle_click(self: Rc<Self>, actor: &Actor, slot: usize, kind: ClickKind);

    /// Forgets `actor`'s view after the host closed the window.
    fn detach(&self, actor: &ActorId);
}

impl<M: Menu> ClickTarget for M {
    fn menu_id(&self) -> u64 {
        self.core().id()
    }

    fn handle_click(self: Rc<Self>, actor: &Actor, slot: usize, kind: ClickKind) {
        let core = self.core();
        let ctx = Rc::clone(core.ctx());
        let menu_id = core.id();
        let action = match core.ensure_alive() {
            Ok(()) => core.action_at(&actor.id, slot),
            Err(err) => {
                ctx.report_rejection(menu_id, &actor.id, "click", &err);
                return;
            }
        };
        let Some(action) = action else {
            ctx.events().debug(
                "click_ignored",
                &[
                    ("menu_id", Value::from(menu_id)),
                    ("actor", Value::from(actor.id.as_str())),
                    ("slot", Value::from(slot)),
                    ("click", Value::from(kind.as_str())),
                ],
            );
            return;
        };
        let label = format!("{action:?}");
        if let Err(err) = self.on_action(actor, action, kind) {
            ctx.report_rejection(menu_id, &actor.id, &label, &err);
        }
    }

    fn detach(&self, actor: &ActorId) {
        self.core().views.borrow_mut().remove(actor);
    }
}

/// Which menu each actor currently has open.
#[derive(Default)]
pub struct MenuRouter {
    open: RefCell<HashMap<ActorId, Rc<dyn ClickTarget>>>,
}

impl MenuRouter {
    fn attach(&self, actor: &ActorId, target: Rc<dyn ClickTarget>) {
        let menu_id = target.menu_id();
        let previous = self.open.borrow_mut().insert(actor.clone(), target);
        if let Some(previous) = previous.filter(|previous| previous.menu_id() != menu_id) {
            previous.detach(actor);
        }
    }

    fn detach(&self, actor: &ActorId, menu_id: u64) {
        let mut open = self.open.borrow_mut();
        if open.get(actor).is_some_and(|target| target.menu_id() == menu_id) {
            open.remove(actor);
        }
    }

    pub fn open_menu(&self, actor: &ActorId) -> Option<u64> {
        self.open.borrow().get(actor).map(|target| target.menu_id())
    }

    /// Delivers a host click; false when the actor has no menu open.
    pub fn handle_click(&self, actor: &Actor, slot: usize, kind: ClickKind) -> bool {
        let target = self.open.borrow().get(&actor.id).cloned();
        match target {
            Some(target) => {
                target.handle_click(actor, slot, kind);
                true
            }
            None => false,
        }
    }

    pub fn handle_session_click<I: IdentityAdapter>(
        &self,
        identity: &I,
        session: &I::Session,
        slot: usize,
        kind: ClickKind,
    ) -> bool {
        let actor = identity.resolve_actor(session);
        self.handle_click(&actor, slot, kind)
    }

    /// The host closed the actor's window on its own.
    pub fn handle_closed(&self, actor: &ActorId) {
        let target = self.open.borrow_mut().remove(actor);
        if let Some(target) = target {
            target.detach(actor);
        }
    }
}
