//! The record lifecycle state tree.
//!
//! ```text
//! root                          (default entry: empty)
//!  ├ empty
//!  ├ loading
//!  ├ loaded                     [isLoaded]  (default entry: saved)
//!  │   ├ saved
//!  │   ├ created  (dirty family) [isNew]
//!  │   └ updated  (dirty family)
//!  ├ deleted                    [isDeleted, isLoaded, isDirty]  (default entry: start)
//!  │   ├ start
//!  │   ├ saving   [isSaving]
//!  │   └ saved    [isDirty=false]
//!  └ error                      [isError]
//! ```
//!
//! The root defaults are every flag `false` except `isValid`. The tree is
//! built once and shared by every [`StateManager`](crate::manager::StateManager).

mod dirty;
mod handlers;

pub use dirty::dirty_family;
pub use handlers::{became_clean, became_dirty, cannot_load_data, no_op, set_property};

use crate::builder::{StateBuilder, TreeBuilder};
use crate::core::{DirtyKind, Event, EventKind, StateId, StateTree};
use crate::flags;
use crate::manager::{LifecycleError, Machine, Store};
use handlers::{apply_property, track_dependency};
use std::sync::{Arc, OnceLock};

/// The shared record lifecycle tree.
///
/// # Example
///
/// ```rust
/// use record_state::lifecycle::record_lifecycle;
///
/// let tree = record_lifecycle();
/// assert_eq!(tree.display(&tree.initial_path()), "empty");
/// assert!(tree.find("loaded.created.pending.saving").is_some());
/// ```
pub fn record_lifecycle() -> Arc<StateTree> {
    static TREE: OnceLock<Arc<StateTree>> = OnceLock::new();
    let tree = TREE.get_or_init(|| {
        Arc::new(
            TreeBuilder::new()
                .root(definition())
                .build()
                .expect("Record lifecycle tree should always build"),
        )
    });
    Arc::clone(tree)
}

/// The unbuilt definition of the record lifecycle tree.
pub fn definition() -> StateBuilder {
    StateBuilder::new("root")
        .flags(flags!(
            IsLoaded = false,
            IsDirty = false,
            IsSaving = false,
            IsDeleted = false,
            IsError = false,
            IsNew = false,
            IsValid = true,
            IsPending = false,
        ))
        .initial("empty")
        .on(EventKind::WillLoadData, cannot_load_data)
        .child(empty())
        .child(loading())
        .child(loaded())
        .child(deleted())
        .child(StateBuilder::new("error").flags(flags!(IsError = true)))
}

fn empty() -> StateBuilder {
    StateBuilder::new("empty")
        .on(EventKind::LoadingData, start_loading)
        .on(EventKind::DidCreate, created)
}

fn loading() -> StateBuilder {
    StateBuilder::new("loading")
        .exit(did_load)
        .on(EventKind::WillLoadData, no_op)
        .on(EventKind::WaitingOn, cannot_wait_while_loading)
        .on(EventKind::SetProperty, cannot_set_while_loading)
        .on(EventKind::SetData, set_data)
        .on(EventKind::LoadedData, finish_loading)
}

fn loaded() -> StateBuilder {
    StateBuilder::new("loaded")
        .flags(flags!(IsLoaded = true))
        .initial("saved")
        .on(EventKind::WillLoadData, no_op)
        .on(EventKind::SetProperty, write_then_update)
        .on(EventKind::Delete, delete)
        .child(StateBuilder::new("saved").on(EventKind::WaitingOn, wait_as_updated))
        .child(
            dirty_family("created", DirtyKind::Created, notify_created)
                .flags(flags!(IsNew = true)),
        )
        .child(dirty_family("updated", DirtyKind::Updated, notify_updated))
}

fn deleted() -> StateBuilder {
    StateBuilder::new("deleted")
        .flags(flags!(IsDeleted = true, IsLoaded = true, IsDirty = true))
        .dirty_kind(DirtyKind::Deleted)
        .initial("start")
        .enter(deleted_enter)
        .on(EventKind::WillLoadData, cannot_load_data)
        .child(StateBuilder::new("start").on(EventKind::WillCommit, commit_deletion))
        .child(
            StateBuilder::new("saving")
                .flags(flags!(IsSaving = true))
                .exit(became_clean)
                .on(EventKind::DidDelete, deletion_saved),
        )
        .child(StateBuilder::new("saved").flags(flags!(IsDirty = false)))
}

fn start_loading(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("loading")
}

fn created(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("loaded.created")
}

fn did_load(machine: &mut dyn Machine, _: StateId) -> Result<(), LifecycleError> {
    machine.record_mut().did_load();
    Ok(())
}

fn cannot_wait_while_loading(_: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    Err(LifecycleError::CannotWaitOn {
        state: "loading".to_string(),
    })
}

fn cannot_set_while_loading(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    let key = match event {
        Event::SetProperty { key, .. } => key,
        _ => String::new(),
    };
    Err(LifecycleError::CannotSetProperty {
        state: machine.current_path(),
        key,
    })
}

// Apply the data inside one batch so field observers fire only after any
// resulting transition has completed.
fn set_data(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    let Event::SetData(data) = event else {
        return Ok(());
    };
    let has_data = !data.is_null();

    let record = machine.record_mut();
    record.begin_property_changes();
    record.replace_data(data);

    let result = if has_data {
        machine.send(Event::LoadedData)
    } else {
        Ok(())
    };
    machine.record_mut().end_property_changes();
    result
}

fn finish_loading(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("loaded")
}

fn write_then_update(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    if let Event::SetProperty { key, value } = event {
        apply_property(machine, &key, value);
    }
    machine.go_to_state("updated")
}

fn delete(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("deleted")
}

fn wait_as_updated(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    track_dependency(machine, event);
    machine.go_to_state("updated.pending")
}

fn notify_created(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.record_mut().did_create();
    Ok(())
}

fn notify_updated(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.record_mut().did_update();
    Ok(())
}

fn deleted_enter(machine: &mut dyn Machine, state: StateId) -> Result<(), LifecycleError> {
    let record = machine.record_mut();
    let id = record.id();
    record.with_store(&mut |store: &mut dyn Store| store.remove_from_record_arrays(id));
    became_dirty(machine, state)
}

fn commit_deletion(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("saving")
}

fn deletion_saved(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("saved")
}
