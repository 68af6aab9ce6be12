use super::permission::ensure_can_edit;
use crate::host::{Actor, CompletionQueue, MutationResult, PermissionResolver, RecordStore};
use crate::position::{MenuType, PositionHandle, SavedPosition};
use crate::shared::errors::MenuError;
use crate::shared::ids::IconRef;

/// Tag map key holding a position's custom icon. The only state the menus persist.
pub const ICON_TAG_KEY: &str = "ui:icon";

pub fn get_icon(position: &SavedPosition) -> Option<IconRef> {
    position
        .meta
        .tags
        .get(ICON_TAG_KEY)
        .and_then(|raw| IconRef::parse(raw).ok())
        .filter(|icon| !icon.is_air())
}

/// Icon an actor may assign to `position` right now: the held item, provided
/// the actor passes the permission gate and the hand is not empty.
pub fn authorize_icon_change(
    permissions: &dyn PermissionResolver,
    actor: &Actor,
    position: &SavedPosition,
    menu_type: MenuType,
) -> Result<IconRef, MenuError> {
    ensure_can_edit(permissions, actor, position, menu_type)?;
    actor
        .held_item
        .clone()
        .filter(|icon| !icon.is_air())
        .ok_or(MenuError::PreconditionNotMet("held item is empty"))
}

/// Submits `icon` as a metadata update. On success the in-memory tag map is
/// replaced by exactly what was submitted, then `on_done` runs; on failure
/// the record is left untouched.
pub fn set_icon<F>(
    store: &dyn RecordStore,
    completions: &CompletionQueue,
    position: &PositionHandle,
    icon: &IconRef,
    on_done: F,
) where
    F: FnOnce(MutationResult) + 'static,
{
    let snapshot = position.borrow().clone();
    let mut meta = snapshot.meta.clone();
    meta.tags
        .insert(ICON_TAG_KEY.to_string(), icon.as_str().to_string());
    let submitted_tags = meta.tags.clone();

    let target = PositionHandle::clone(position);
    let reply = completions.register(move |result: MutationResult| {
        if result.is_ok() {
            target.borrow_mut().meta.tags = submitted_tags;
        }
        on_done(result);
    });
    store.update_metadata(&snapshot, meta, reply);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CompletionSender;
    use crate::position::{handle, Coordinate, PositionMeta, PositionVariant};
    use crate::shared::errors::ValidationFailure;
    use crate::shared::ids::{ActorId, PositionId};
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct CapturingStore {
        submitted: RefCell<Vec<(PositionMeta, CompletionSender<MutationResult>)>>,
    }

    impl RecordStore for CapturingStore {
        fn update_metadata(
            &self,
            _position: &SavedPosition,
            meta: PositionMeta,
            reply: CompletionSender<MutationResult>,
        ) {
            self.submitted.borrow_mut().push((meta, reply));
        }

        fn delete_record(&self, _position: &SavedPosition, _reply: CompletionSender<MutationResult>) {}

        fn set_visibility(
            &self,
            _position: &SavedPosition,
            _public: bool,
            _reply: CompletionSender<MutationResult>,
        ) {
        }
    }

    fn warp(tags: &[(&str, &str)]) -> SavedPosition {
        SavedPosition {
            id: PositionId::parse("spawn").expect("id"),
            meta: PositionMeta {
                name: "spawn".to_string(),
                description: String::new(),
                tags: tags
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<BTreeMap<_, _>>(),
            },
            coordinate: Coordinate {
                world: "world".to_string(),
                x: 0.0,
                y: 0.0,
                z: 0.0,
                yaw: 0.0,
                pitch: 0.0,
            },
            server: "hub".to_string(),
            variant: PositionVariant::Shared,
        }
    }

    struct AllowAll;

    impl PermissionResolver for AllowAll {
        fn has_capability(&self, _actor: &Actor, _capability: crate::menu::permission::Capability) -> bool {
            true
        }
    }

    #[test]
    fn icon_change_requires_non_empty_hand() {
        let actor = Actor::new(ActorId::parse("steve").expect("id"), "Steve");
        let err = authorize_icon_change(&AllowAll, &actor, &warp(&[]), MenuType::Shared)
            .expect_err("empty hand");
        assert_eq!(err, MenuError::PreconditionNotMet("held item is empty"));

        let holding = actor.holding(Some(IconRef::parse("compass").expect("icon")));
        assert_eq!(
            authorize_icon_change(&AllowAll, &holding, &warp(&[]), MenuType::Shared)
                .expect("allowed")
                .as_str(),
            "minecraft:compass"
        );
        assert!(matches!(
            authorize_icon_change(&AllowAll, &holding, &warp(&[]), MenuType::Owned),
            Err(MenuError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn get_icon_ignores_missing_and_unresolvable_tags() {
        assert_eq!(get_icon(&warp(&[])), None);
        assert_eq!(get_icon(&warp(&[(ICON_TAG_KEY, "not an icon")])), None);
        assert_eq!(
            get_icon(&warp(&[(ICON_TAG_KEY, "Diamond")])).map(|icon| icon.to_string()),
            Some("minecraft:diamond".to_string())
        );
    }

    #[test]
    fn successful_set_replaces_tags_with_submitted_map() {
        let store = CapturingStore::default();
        let queue = CompletionQueue::new();
        let position = handle(warp(&[("other", "kept")]));
        let icon = IconRef::parse("minecraft:compass").expect("icon");
        let done = Rc::new(Cell::new(false));
        let done_in_callback = Rc::clone(&done);

        set_icon(&store, &queue, &position, &icon, move |result| {
            assert_eq!(result, Ok(()));
            done_in_callback.set(true);
        });
        assert_eq!(get_icon(&position.borrow()), None);

        // A concurrent in-memory change is overwritten by the confirmed map.
        position
            .borrow_mut()
            .meta
            .tags
            .insert("late".to_string(), "x".to_string());
        let (meta, reply) = store.submitted.borrow_mut().remove(0);
        assert_eq!(meta.tags.get("other").map(String::as_str), Some("kept"));
        reply.complete(Ok(()));
        queue.drain();

        assert!(done.get());
        let position = position.borrow();
        assert_eq!(get_icon(&position), Some(icon));
        assert_eq!(position.meta.tags, meta.tags);
    }

    #[test]
    fn failed_set_leaves_record_untouched() {
        let store = CapturingStore::default();
        let queue = CompletionQueue::new();
        let position = handle(warp(&[]));
        let icon = IconRef::parse("minecraft:compass").expect("icon");

        set_icon(&store, &queue, &position, &icon, |result| {
            assert!(result.is_err());
        });
        let (_, reply) = store.submitted.borrow_mut().remove(0);
        reply.complete(Err(ValidationFailure::new("quota")));
        queue.drain();

        assert!(position.borrow().meta.tags.is_empty());
    }
}
