use crate::host::{
    Actor, CompletionSender, EditableField, FieldEdit, FieldEditResult, FieldEditor,
    InMemoryRecordStore,
};
use crate::position::{Coordinate, SavedPosition};
use crate::shared::errors::ValidationFailure;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::cell::RefCell;

struct Prompt {
    position: SavedPosition,
    field: EditableField,
    buffer: String,
    reply: CompletionSender<FieldEditResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub label: String,
    pub buffer: String,
}

/// Captures names and descriptions as a one-line text prompt and relocates
/// positions to where the terminal user "stands".
pub struct PromptFieldEditor {
    store: InMemoryRecordStore,
    standing: Coordinate,
    active: RefCell<Option<Prompt>>,
}

impl PromptFieldEditor {
    pub fn new(store: InMemoryRecordStore, standing: Coordinate) -> Self {
        Self {
            store,
            standing,
            active: RefCell::new(None),
        }
    }

    pub fn is_prompting(&self) -> bool {
        self.active.borrow().is_some()
    }

    pub fn view(&self) -> Option<PromptView> {
        self.active.borrow().as_ref().map(|prompt| PromptView {
            label: format!("New {} for {}", prompt.field.as_str(), prompt.position.name()),
            buffer: prompt.buffer.clone(),
        })
    }

    /// Feeds one key to the open prompt. Enter submits, Esc cancels.
    pub fn handle_key(&self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => self.cancel(),
            KeyCode::Backspace => {
                if let Some(prompt) = self.active.borrow_mut().as_mut() {
                    prompt.buffer.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(prompt) = self.active.borrow_mut().as_mut() {
                    prompt.buffer.push(ch);
                }
            }
            _ => {}
        }
    }

    pub fn submit(&self) {
        let Some(prompt) = self.active.borrow_mut().take() else {
            return;
        };
        let text = prompt.buffer.trim().to_string();
        let edit = match prompt.field {
            EditableField::Name => FieldEdit::Name(text),
            EditableField::Description => FieldEdit::Description(text),
            EditableField::Location => FieldEdit::Location(self.standing.clone()),
        };
        self.store.submit_edit(&prompt.position, edit, prompt.reply);
    }

    pub fn cancel(&self) {
        if let Some(prompt) = self.active.borrow_mut().take() {
            prompt
                .reply
                .complete(Err(ValidationFailure::new("edit cancelled")));
        }
    }
}

impl FieldEditor for PromptFieldEditor {
    fn begin_edit(
        &self,
        _actor: &Actor,
        position: &SavedPosition,
        field: EditableField,
        reply: CompletionSender<FieldEditResult>,
    ) {
        self.cancel();
        if field == EditableField::Location {
            self.store.submit_edit(
                position,
                FieldEdit::Location(self.standing.clone()),
                reply,
            );
            return;
        }
        let buffer = match field {
            EditableField::Description => position.description().to_string(),
            _ => position.name().to_string(),
        };
        *self.active.borrow_mut() = Some(Prompt {
            position: position.clone(),
            field,
            buffer,
            reply,
        });
    }
}
