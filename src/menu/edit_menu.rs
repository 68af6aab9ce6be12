//! Per-position editor opened from a list menu.
//!
//! Every mutation goes through the permission gate, is issued to a host
//! collaborator and only touches the record once the collaborator has
//! confirmed it. Completions that arrive after the menu was destroyed are
//! dropped.

use super::layout::{
    Button, FrameBuilder, GridLayout, BACK_SYMBOL, DELETE_SYMBOL, EDIT_DESCRIPTION_SYMBOL,
    EDIT_LOCATION_SYMBOL, EDIT_NAME_SYMBOL, EDIT_VISIBILITY_SYMBOL, INFO_SYMBOL,
};
use super::lifecycle::{Menu, MenuContext, MenuCore, MenuLifecycle};
use super::navigation::MenuBinding;
use super::permission::ensure_can_edit;
use crate::host::{Actor, ClickKind, EditableField, FieldEditResult, MutationResult};
use crate::locale::text_wrap;
use crate::position::{PositionHandle, PositionKind, SavedPosition};
use crate::shared::errors::MenuError;
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Back,
    EditField(EditableField),
    ToggleVisibility,
    Delete,
}

pub struct EditMenu {
    core: MenuCore<EditAction>,
    binding: MenuBinding,
    in_flight: Cell<bool>,
}

/// Marks a mutation as in flight until dropped, which happens when its
/// completion has run or been abandoned.
struct InFlight {
    menu: Rc<EditMenu>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.menu.in_flight.set(false);
    }
}

/// A field edit handed to the field editor. The editor was closed for the
/// capture, so an edit abandoned without a reply re-shows it.
struct PendingFieldEdit {
    in_flight: InFlight,
    actor: Actor,
    field: EditableField,
    settled: bool,
}

impl PendingFieldEdit {
    fn settle(mut self, result: FieldEditResult) {
        self.settled = true;
        self.in_flight
            .menu
            .finish_field_edit(&self.actor, self.field, result);
    }
}

impl Drop for PendingFieldEdit {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let menu = &self.in_flight.menu;
        let mut fields = menu.event_fields(&self.actor);
        fields.push(("field", Value::from(self.field.as_str())));
        menu.ctx().events().debug("field_edit_abandoned", &fields);
        menu.reopen_after_edit(&self.actor);
    }
}

impl EditMenu {
    pub fn new(ctx: &Rc<MenuContext>, binding: MenuBinding) -> Result<Rc<Self>, MenuError> {
        {
            let position = binding.position().borrow();
            let menu_type = binding.menu_type();
            if !menu_type.accepts(position.kind()) {
                return Err(MenuError::MismatchedRecord {
                    menu_type: menu_type.as_str(),
                    kind: position.kind().as_str(),
                    position: position.id.to_string(),
                });
            }
        }
        Ok(Rc::new(Self {
            core: MenuCore::new(ctx, GridLayout::editor()),
            binding,
            in_flight: Cell::new(false),
        }))
    }

    pub fn binding(&self) -> &MenuBinding {
        &self.binding
    }

    pub fn position(&self) -> PositionHandle {
        PositionHandle::clone(self.binding.position())
    }

    pub fn has_mutation_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    fn ctx(&self) -> &Rc<MenuContext> {
        self.core.ctx()
    }

    fn ensure_can_edit(&self, actor: &Actor) -> Result<(), MenuError> {
        ensure_can_edit(
            self.ctx().permissions(),
            actor,
            &self.binding.position().borrow(),
            self.binding.menu_type(),
        )
    }

    fn begin_mutation(self: &Rc<Self>) -> Result<InFlight, MenuError> {
        if self.in_flight.replace(true) {
            return Err(MenuError::PreconditionNotMet(
                "another change to this position is in flight",
            ));
        }
        Ok(InFlight {
            menu: Rc::clone(self),
        })
    }

    fn snapshot(&self) -> SavedPosition {
        self.binding.position().borrow().clone()
    }

    fn event_fields(&self, actor: &Actor) -> Vec<(&'static str, Value)> {
        vec![
            ("menu_id", Value::from(self.core.id())),
            ("actor", Value::from(actor.id.as_str())),
            (
                "position",
                Value::from(self.binding.position().borrow().id.as_str()),
            ),
        ]
    }

    /// Closes this menu, shows the parent list at the bound page and
    /// destroys this instance.
    fn navigate_back(self: &Rc<Self>, actor: &Actor) -> Result<(), MenuError> {
        self.close(&actor.id);
        let returned = self.binding.return_to().return_to(actor);
        self.destroy();
        returned
    }

    fn toggle_visibility(self: Rc<Self>, actor: &Actor) -> Result<(), MenuError> {
        self.ensure_can_edit(actor)?;
        let current = self
            .binding
            .position()
            .borrow()
            .visibility()
            .ok_or(MenuError::PreconditionNotMet("position has no visibility setting"))?;
        let guard = self.begin_mutation()?;
        let target = !current;
        let actor = actor.clone();
        let reply = self
            .ctx()
            .completions()
            .register(move |result: MutationResult| {
                guard.menu.finish_visibility(&actor, target, result);
            });
        self.ctx()
            .store()
            .set_visibility(&self.snapshot(), target, reply);
        Ok(())
    }

    fn finish_visibility(self: &Rc<Self>, actor: &Actor, public: bool, result: MutationResult) {
        if let Err(err) = self.core.ensure_current() {
            self.report_stale(actor, "toggle_visibility", result.is_ok(), &err);
            return;
        }
        match result.map_err(MenuError::from) {
            Ok(()) => {
                self.binding.position().borrow_mut().set_visibility(public);
                let mut fields = self.event_fields(actor);
                fields.push(("public", Value::from(public)));
                self.ctx().events().info("visibility_changed", &fields);
                if self.core.is_viewing(&actor.id) {
                    self.show(actor);
                }
            }
            Err(err) => {
                self.ctx()
                    .report_rejection(self.core.id(), &actor.id, "toggle_visibility", &err);
            }
        }
    }

    fn delete(self: Rc<Self>, actor: &Actor, kind: ClickKind) -> Result<(), MenuError> {
        if !kind.confirms_destructive_action() {
            return Err(MenuError::PreconditionNotMet(
                "delete needs a confirming click",
            ));
        }
        self.ensure_can_edit(actor)?;
        let guard = self.begin_mutation()?;
        let actor = actor.clone();
        let reply = self
            .ctx()
            .completions()
            .register(move |result: MutationResult| {
                guard.menu.finish_delete(&actor, result);
            });
        self.ctx().store().delete_record(&self.snapshot(), reply);
        Ok(())
    }

    fn finish_delete(self: &Rc<Self>, actor: &Actor, result: MutationResult) {
        if let Err(err) = self.core.ensure_current() {
            self.report_stale(actor, "delete", result.is_ok(), &err);
            return;
        }
        if let Err(err) = result.map_err(MenuError::from) {
            self.ctx()
                .report_rejection(self.core.id(), &actor.id, "delete", &err);
            return;
        }

        {
            let mut position = self.binding.position().borrow_mut();
            let marked = self
                .ctx()
                .text("item_deleted_name", &[position.name()]);
            position.meta.name = marked;
        }
        self.ctx()
            .events()
            .info("position_deleted", &self.event_fields(actor));

        if !self.core.is_viewing(&actor.id) {
            self.destroy();
            return;
        }
        if let Err(err) = self.navigate_back(actor) {
            self.ctx()
                .report_rejection(self.core.id(), &actor.id, "delete", &err);
        }
    }

    fn edit_field(self: Rc<Self>, actor: &Actor, field: EditableField) -> Result<(), MenuError> {
        self.ensure_can_edit(actor)?;
        let pending = PendingFieldEdit {
            in_flight: self.begin_mutation()?,
            actor: actor.clone(),
            field,
            settled: false,
        };
        self.close(&actor.id);
        let reply = self
            .ctx()
            .completions()
            .register(move |result: FieldEditResult| pending.settle(result));
        self.ctx()
            .field_editor()
            .begin_edit(actor, &self.snapshot(), field, reply);
        Ok(())
    }

    fn finish_field_edit(self: &Rc<Self>, actor: &Actor, field: EditableField, result: FieldEditResult) {
        if let Err(err) = self.core.ensure_current() {
            self.ctx()
                .report_rejection(self.core.id(), &actor.id, field.as_str(), &err);
            return;
        }
        match result {
            Ok(edit) if edit.field() == field => {
                edit.apply_to(&mut self.binding.position().borrow_mut());
                let mut fields = self.event_fields(actor);
                fields.push(("field", Value::from(field.as_str())));
                self.ctx().events().info("field_edited", &fields);
            }
            Ok(_) => {
                let err = MenuError::PreconditionNotMet("edit result is for another field");
                self.ctx()
                    .report_rejection(self.core.id(), &actor.id, field.as_str(), &err);
            }
            Err(failure) => {
                self.ctx().report_rejection(
                    self.core.id(),
                    &actor.id,
                    field.as_str(),
                    &MenuError::from(failure),
                );
            }
        }
        self.reopen_after_edit(actor);
    }

    /// Shows the editor again after a capture, unless the actor has opened
    /// another menu in the meantime.
    fn reopen_after_edit(self: &Rc<Self>, actor: &Actor) {
        if self.core.is_destroyed() {
            return;
        }
        match self.ctx().router().open_menu(&actor.id) {
            Some(open) if open != self.core.id() => {
                let mut fields = self.event_fields(actor);
                fields.push(("open_menu", Value::from(open)));
                self.ctx().events().debug("editor_reopen_skipped", &fields);
            }
            _ => self.show(actor),
        }
    }

    /// Logs a completion for a destroyed editor. A confirmed mutation is
    /// recorded too, as the record no longer matches the store.
    fn report_stale(&self, actor: &Actor, action: &str, confirmed: bool, err: &MenuError) {
        if confirmed {
            let mut fields = self.event_fields(actor);
            fields.push(("action", Value::from(action)));
            self.ctx()
                .events()
                .debug("stale_mutation_confirmed", &fields);
        }
        self.ctx()
            .report_rejection(self.core.id(), &actor.id, action, err);
    }

    fn info_lines(&self, position: &SavedPosition) -> Vec<String> {
        let ctx = self.ctx();
        let (x, y, z) = position.coordinate.block();
        let (x, y, z) = (x.to_string(), y.to_string(), z.to_string());
        let mut lines = vec![
            ctx.text("info_name", &[position.name()]),
            ctx.text("info_world", &[position.coordinate.world.as_str()]),
            ctx.text("info_server", &[position.server.as_str()]),
            ctx.text("info_coordinates", &[x.as_str(), y.as_str(), z.as_str()]),
        ];
        if let Some(owner) = position.owner() {
            lines.push(ctx.text("info_owner", &[owner.username.as_str()]));
        }
        lines
    }

    fn description_lines(&self, position: &SavedPosition) -> Vec<String> {
        let ctx = self.ctx();
        let mut lines = vec![ctx.text("edit_description_button", &[])];
        let wrapped = text_wrap(
            position.description(),
            ctx.settings().menu.text_wrap_length,
        );
        if wrapped.is_empty() {
            lines.push(ctx.text("edit_description_message_blank", &[]));
        } else {
            lines.extend(
                wrapped
                    .iter()
                    .map(|line| ctx.text("edit_description_message", &[line.as_str()])),
            );
        }
        lines
    }
}

impl Menu for EditMenu {
    type Action = EditAction;

    fn core(&self) -> &MenuCore<EditAction> {
        &self.core
    }

    fn title(&self, _actor: &Actor) -> String {
        let position = self.binding.position().borrow();
        let key = match position.kind() {
            PositionKind::Owned => "owned_editor_title",
            PositionKind::Shared => "shared_editor_title",
        };
        self.ctx().text(key, &[position.name()])
    }

    fn build(&self, _actor: &Actor, frame: &mut FrameBuilder<EditAction>) {
        let ctx = self.ctx();
        let icons = &ctx.settings().editor.icons;
        let position = self.binding.position().borrow();
        let type_name = ctx.text(
            match position.kind() {
                PositionKind::Owned => "type_owned",
                PositionKind::Shared => "type_shared",
            },
            &[],
        );

        frame.set(
            BACK_SYMBOL,
            Button::new(
                icons.back_button.clone(),
                vec![ctx.text("back_button", &[])],
                EditAction::Back,
            ),
        );
        frame.set(
            INFO_SYMBOL,
            Button::display(icons.info_panel.clone(), self.info_lines(&position)),
        );
        frame.set(
            EDIT_NAME_SYMBOL,
            Button::new(
                icons.edit_name_button.clone(),
                vec![
                    ctx.text("edit_name_button", &[]),
                    ctx.text("edit_name_message", &[position.name()]),
                ],
                EditAction::EditField(EditableField::Name),
            ),
        );
        frame.set(
            EDIT_DESCRIPTION_SYMBOL,
            Button::new(
                icons.edit_description_button.clone(),
                self.description_lines(&position),
                EditAction::EditField(EditableField::Description),
            ),
        );
        frame.set(
            EDIT_LOCATION_SYMBOL,
            Button::new(
                icons.edit_location_button.clone(),
                vec![
                    ctx.text("edit_location_button", &[]),
                    ctx.text("edit_location_message", &[type_name.as_str()]),
                ],
                EditAction::EditField(EditableField::Location),
            ),
        );
        if let Some(public) = position.visibility() {
            let state = ctx.text(
                if public {
                    "visibility_public"
                } else {
                    "visibility_private"
                },
                &[],
            );
            frame.set(
                EDIT_VISIBILITY_SYMBOL,
                Button::new(
                    icons.edit_visibility_button.clone(),
                    vec![
                        ctx.text("edit_visibility_button", &[]),
                        ctx.text("edit_visibility_message", &[state.as_str()]),
                    ],
                    EditAction::ToggleVisibility,
                ),
            );
        }
        frame.set(
            DELETE_SYMBOL,
            Button::new(
                icons.delete_button.clone(),
                vec![
                    ctx.text("delete_button", &[]),
                    ctx.text("delete_button_describe", &[]),
                ],
                EditAction::Delete,
            ),
        );
        frame.filler(ctx.settings().editor_filler(self.binding.menu_type()));
    }

    fn on_action(
        self: Rc<Self>,
        actor: &Actor,
        action: EditAction,
        kind: ClickKind,
    ) -> Result<(), MenuError> {
        match action {
            EditAction::Back => self.navigate_back(actor),
            EditAction::ToggleVisibility => self.toggle_visibility(actor),
            EditAction::Delete => self.delete(actor, kind),
            EditAction::EditField(field) => self.edit_field(actor, field),
        }
    }
}
