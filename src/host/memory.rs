use super::{CompletionSender, FieldEdit, FieldEditResult, MutationResult, RecordStore};
use crate::position::{PositionKind, PositionMeta, SavedPosition};
use crate::shared::errors::ValidationFailure;
use crate::shared::ids::PositionId;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

pub const MAX_NAME_LENGTH: usize = 32;

/// Process-local record store; mutations complete from a worker thread.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<BTreeMap<PositionId, SavedPosition>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions(positions: impl IntoIterator<Item = SavedPosition>) -> Self {
        let store = Self::new();
        if let Ok(mut records) = store.records.lock() {
            for position in positions {
                records.insert(position.id.clone(), position);
            }
        }
        store
    }

    pub fn get(&self, id: &PositionId) -> Option<SavedPosition> {
        lock(&self.records).ok()?.get(id).cloned()
    }

    pub fn all(&self) -> Vec<SavedPosition> {
        lock(&self.records)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn of_kind(&self, kind: PositionKind) -> Vec<SavedPosition> {
        self.all()
            .into_iter()
            .filter(|position| position.kind() == kind)
            .collect()
    }

    pub fn public_owned(&self) -> Vec<SavedPosition> {
        self.all()
            .into_iter()
            .filter(|position| position.visibility() == Some(true))
            .collect()
    }

    /// Persists a captured field edit and replies with it once stored.
    pub fn submit_edit(
        &self,
        position: &SavedPosition,
        edit: FieldEdit,
        reply: CompletionSender<FieldEditResult>,
    ) {
        let id = position.id.clone();
        self.submit(reply, move |records| {
            let current = records
                .get(&id)
                .ok_or_else(|| ValidationFailure::new(format!("position `{id}` not found")))?;
            match &edit {
                FieldEdit::Name(name) => {
                    let meta = PositionMeta {
                        name: name.clone(),
                        ..current.meta.clone()
                    };
                    apply_metadata(records, &id, meta)?;
                }
                FieldEdit::Description(description) => {
                    let meta = PositionMeta {
                        description: description.clone(),
                        ..current.meta.clone()
                    };
                    apply_metadata(records, &id, meta)?;
                }
                FieldEdit::Location(coordinate) => {
                    if let Some(position) = records.get_mut(&id) {
                        position.coordinate = coordinate.clone();
                    }
                }
            }
            Ok(edit)
        });
    }

    fn submit<T, F>(&self, reply: CompletionSender<Result<T, ValidationFailure>>, mutation: F)
    where
        T: Send + 'static,
        F: FnOnce(&mut BTreeMap<PositionId, SavedPosition>) -> Result<T, ValidationFailure>
            + Send
            + 'static,
    {
        let records = Arc::clone(&self.records);
        thread::spawn(move || {
            let result = match lock(&records) {
                Ok(mut records) => mutation(&mut records),
                Err(failure) => Err(failure),
            };
            reply.complete(result);
        });
    }
}

fn lock(
    records: &Mutex<BTreeMap<PositionId, SavedPosition>>,
) -> Result<MutexGuard<'_, BTreeMap<PositionId, SavedPosition>>, ValidationFailure> {
    records
        .lock()
        .map_err(|_| ValidationFailure::new("record store is unavailable"))
}

pub fn validate_name(name: &str) -> Result<(), ValidationFailure> {
    if name.is_empty() {
        return Err(ValidationFailure::new("name must be non-empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationFailure::new(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ValidationFailure::new("name must not contain whitespace"));
    }
    Ok(())
}

fn same_namespace(left: &SavedPosition, right: &SavedPosition) -> bool {
    match (left.owner(), right.owner()) {
        (Some(a), Some(b)) => a.id == b.id,
        (None, None) => true,
        _ => false,
    }
}

fn apply_metadata(
    records: &mut BTreeMap<PositionId, SavedPosition>,
    id: &PositionId,
    meta: PositionMeta,
) -> MutationResult {
    validate_name(&meta.name)?;
    let current = records
        .get(id)
        .ok_or_else(|| ValidationFailure::new(format!("position `{id}` not found")))?;
    let duplicate = records.values().any(|other| {
        other.id != *id && same_namespace(other, current) && other.meta.name == meta.name
    });
    if duplicate {
        return Err(ValidationFailure::new(format!(
            "a position named `{}` already exists",
            meta.name
        )));
    }
    if let Some(position) = records.get_mut(id) {
        position.meta = meta;
    }
    Ok(())
}

impl RecordStore for InMemoryRecordStore {
    fn update_metadata(
        &self,
        position: &SavedPosition,
        meta: PositionMeta,
        reply: CompletionSender<MutationResult>,
    ) {
        let id = position.id.clone();
        self.submit(reply, move |records| apply_metadata(records, &id, meta));
    }

    fn delete_record(&self, position: &SavedPosition, reply: CompletionSender<MutationResult>) {
        let id = position.id.clone();
        self.submit(reply, move |records| {
            records
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ValidationFailure::new(format!("position `{id}` not found")))
        });
    }

    fn set_visibility(
        &self,
        position: &SavedPosition,
        public: bool,
        reply: CompletionSender<MutationResult>,
    ) {
        let id = position.id.clone();
        self.submit(reply, move |records| {
            let position = records
                .get_mut(&id)
                .ok_or_else(|| ValidationFailure::new(format!("position `{id}` not found")))?;
            if position.set_visibility(public) {
                Ok(())
            } else {
                Err(ValidationFailure::new(format!(
                    "position `{id}` has no visibility setting"
                )))
            }
        });
    }
}
