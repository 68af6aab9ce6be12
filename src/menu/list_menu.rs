//! Paged grid of saved positions with teleport, edit and quick-set actions.

use super::edit_menu::EditMenu;
use super::icon_tag::{authorize_icon_change, get_icon, set_icon};
use super::layout::{
    Button, FrameBuilder, GridLayout, CONTROLS_SYMBOL, FIRST_PAGE_SYMBOL, ITEM_SYMBOL,
    LAST_PAGE_SYMBOL, NEXT_PAGE_SYMBOL, PREVIOUS_PAGE_SYMBOL,
};
use super::lifecycle::{Menu, MenuContext, MenuCore, MenuLifecycle};
use super::navigation::{MenuBinding, NavigationTarget};
use super::paging::{total_pages, PageAction, PageState};
use crate::host::{Actor, ClickKind, MutationResult, PageIndicator};
use crate::locale::text_wrap;
use crate::position::{handle, MenuType, PositionHandle, SavedPosition};
use crate::shared::errors::MenuError;
use crate::shared::ids::{ActorId, IconRef};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone)]
pub enum ListAction {
    Position(PositionHandle),
    Page(PageAction),
}

pub struct ListMenu {
    core: MenuCore<ListAction>,
    this: Weak<ListMenu>,
    title: String,
    menu_type: MenuType,
    records: RefCell<Vec<PositionHandle>>,
    pages: RefCell<PageState>,
}

fn ensure_accepts(menu_type: MenuType, records: &[PositionHandle]) -> Result<(), MenuError> {
    for record in records {
        let record = record.borrow();
        if !menu_type.accepts(record.kind()) {
            return Err(MenuError::MismatchedRecord {
                menu_type: menu_type.as_str(),
                kind: record.kind().as_str(),
                position: record.id.to_string(),
            });
        }
    }
    Ok(())
}

impl ListMenu {
    pub fn new(
        ctx: &Rc<MenuContext>,
        title: impl Into<String>,
        menu_type: MenuType,
        records: Vec<PositionHandle>,
    ) -> Result<Rc<Self>, MenuError> {
        ensure_accepts(menu_type, &records)?;
        let layout = GridLayout::list(ctx.settings().menu_rows());
        let title = title.into();
        Ok(Rc::new_cyclic(|this| Self {
            core: MenuCore::new(ctx, layout),
            this: this.clone(),
            title,
            menu_type,
            records: RefCell::new(records),
            pages: RefCell::new(PageState::new()),
        }))
    }

    pub fn from_positions(
        ctx: &Rc<MenuContext>,
        title: impl Into<String>,
        menu_type: MenuType,
        positions: impl IntoIterator<Item = SavedPosition>,
    ) -> Result<Rc<Self>, MenuError> {
        Self::new(ctx, title, menu_type, positions.into_iter().map(handle).collect())
    }

    pub fn menu_type(&self) -> MenuType {
        self.menu_type
    }

    pub fn records(&self) -> Vec<PositionHandle> {
        self.records.borrow().clone()
    }

    /// Swaps the snapshot; viewers see it on their next show.
    pub fn replace_records(&self, records: Vec<PositionHandle>) -> Result<(), MenuError> {
        ensure_accepts(self.menu_type, &records)?;
        *self.records.borrow_mut() = records;
        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.core.layout().slots_of(ITEM_SYMBOL).len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.records.borrow().len(), self.page_size())
    }

    pub fn page_number(&self, actor: &ActorId) -> usize {
        self.pages.borrow().current(actor)
    }

    /// Moves `actor` to page `page`, clamped into range, and re-renders when
    /// they are looking at this menu. Returns the applied page.
    pub fn set_page_number(&self, actor: &Actor, page: usize) -> usize {
        let total = self.total_pages();
        let applied = self.pages.borrow_mut().set(&actor.id, page, total);
        if self.core.is_viewing(&actor.id) {
            if let Some(menu) = self.this.upgrade() {
                menu.show(actor);
            }
        }
        applied
    }

    fn item_button(&self, record: &PositionHandle) -> Button<ListAction> {
        let ctx = self.core.ctx();
        let settings = &ctx.settings().menu;
        let position = record.borrow();
        let icon = get_icon(&position).unwrap_or_else(|| settings.items.default_icon.clone());

        let mut lines = vec![ctx.text("item_name", &[position.name()])];
        let wrapped = text_wrap(position.description(), settings.text_wrap_length);
        if wrapped.is_empty() {
            lines.push(ctx.text("item_no_description", &[]));
        } else {
            lines.extend(
                wrapped
                    .iter()
                    .map(|line| ctx.text("item_description", &[line.as_str()])),
            );
        }
        if settings.display_controls_help_in_lore {
            lines.push(String::new());
            for key in [
                "item_controls_primary",
                "item_controls_secondary",
                "item_controls_quick_set",
            ] {
                lines.push(ctx.text(key, &[]));
            }
        }
        Button::new(icon, lines, ListAction::Position(PositionHandle::clone(record)))
    }

    fn page_button(&self, action: PageAction, icon: &IconRef, key: &str) -> Button<ListAction> {
        Button::new(
            icon.clone(),
            vec![self.core.ctx().text(key, &[])],
            ListAction::Page(action),
        )
    }

    fn open_editor(self: Rc<Self>, actor: &Actor, record: PositionHandle) -> Result<(), MenuError> {
        let page = self.page_number(&actor.id);
        let binding = MenuBinding::new(
            PositionHandle::clone(&record),
            NavigationTarget::new(&self, page),
            self.menu_type,
        );
        let editor = EditMenu::new(self.core.ctx(), binding)?;
        self.close(&actor.id);
        editor.show(actor);
        self.core.ctx().events().info(
            "edit_menu_opened",
            &[
                ("menu_id", Value::from(editor.core().id())),
                ("actor", Value::from(actor.id.as_str())),
                ("position", Value::from(record.borrow().id.as_str())),
                ("return_page", Value::from(page)),
            ],
        );
        Ok(())
    }

    fn quick_set_icon(self: Rc<Self>, actor: &Actor, record: PositionHandle) -> Result<(), MenuError> {
        let ctx = Rc::clone(self.core.ctx());
        let icon = authorize_icon_change(
            ctx.permissions(),
            actor,
            &record.borrow(),
            self.menu_type,
        )?;
        self.close(&actor.id);

        let actor_id = actor.id.clone();
        let name = record.borrow().name().to_string();
        let position_id = record.borrow().id.to_string();
        let icon_name = icon.to_string();
        let reply_ctx = Rc::clone(&ctx);
        set_icon(
            ctx.store(),
            ctx.completions(),
            &record,
            &icon,
            move |result: MutationResult| {
                let fields = [
                    ("actor", Value::from(actor_id.as_str())),
                    ("position", Value::from(position_id)),
                    ("icon", Value::from(icon_name)),
                ];
                match result {
                    Ok(()) => {
                        let text = reply_ctx.text("updated_icon", &[name.as_str()]);
                        reply_ctx.messages().send_message(&actor_id, &text);
                        reply_ctx.events().info("icon_set", &fields);
                    }
                    Err(failure) => {
                        let mut fields = fields.to_vec();
                        fields.push(("reason", Value::from(failure.reason)));
                        reply_ctx.events().warn("icon_set_failed", &fields);
                    }
                }
            },
        );
        Ok(())
    }
}

impl Menu for ListMenu {
    type Action = ListAction;

    fn core(&self) -> &MenuCore<ListAction> {
        &self.core
    }

    fn title(&self, _actor: &Actor) -> String {
        self.title.clone()
    }

    fn build(&self, actor: &Actor, frame: &mut FrameBuilder<ListAction>) {
        let settings = self.core.ctx().settings();
        let page_size = self.page_size();
        let records = self.records();
        let total = total_pages(records.len(), page_size);
        let page = self.pages.borrow_mut().reconcile(&actor.id, total);

        let buttons: Vec<Button<ListAction>> = records
            .iter()
            .skip(page * page_size)
            .take(page_size)
            .map(|record| self.item_button(record))
            .collect();
        frame.fill_group(ITEM_SYMBOL, buttons);

        let icons = &settings.menu.icons;
        frame.set(
            FIRST_PAGE_SYMBOL,
            self.page_button(PageAction::First, &icons.paginate_first_page, "pagination_first_page"),
        );
        frame.set(
            PREVIOUS_PAGE_SYMBOL,
            self.page_button(
                PageAction::Previous,
                &icons.paginate_previous_page,
                "pagination_previous_page",
            ),
        );
        frame.set(
            NEXT_PAGE_SYMBOL,
            self.page_button(PageAction::Next, &icons.paginate_next_page, "pagination_next_page"),
        );
        frame.set(
            LAST_PAGE_SYMBOL,
            self.page_button(PageAction::Last, &icons.paginate_last_page, "pagination_last_page"),
        );

        if settings.menu.show_controls {
            let ctx = self.core.ctx();
            let current = (page + 1).to_string();
            let of = total.to_string();
            let lines = vec![
                ctx.text("controls_title", &[]),
                ctx.text("pagination_page_indicator", &[current.as_str(), of.as_str()]),
                ctx.text("controls_primary", &[]),
                ctx.text("controls_secondary", &[]),
                ctx.text("controls_quick_set", &[]),
            ];
            frame.set(
                CONTROLS_SYMBOL,
                Button::display(icons.controls_icon.clone(), lines),
            );
        }

        frame.page(PageIndicator { index: page, total });
        frame.filler(settings.list_filler(self.menu_type));
    }

    fn on_action(
        self: Rc<Self>,
        actor: &Actor,
        action: ListAction,
        kind: ClickKind,
    ) -> Result<(), MenuError> {
        match action {
            ListAction::Page(page_action) => {
                let target = page_action.target(self.page_number(&actor.id), self.total_pages());
                self.set_page_number(actor, target);
                Ok(())
            }
            ListAction::Position(record) => match kind {
                ClickKind::Primary => {
                    self.close(&actor.id);
                    let snapshot = record.borrow().clone();
                    let ctx = self.core.ctx();
                    ctx.teleporter().teleport(actor, &snapshot);
                    ctx.events().info(
                        "teleport_requested",
                        &[
                            ("actor", Value::from(actor.id.as_str())),
                            ("position", Value::from(snapshot.id.as_str())),
                        ],
                    );
                    Ok(())
                }
                ClickKind::Secondary => self.open_editor(actor, record),
                ClickKind::ShiftPrimary => self.quick_set_icon(actor, record),
                _ => Err(MenuError::PreconditionNotMet("click kind has no list action")),
            },
        }
    }
}
