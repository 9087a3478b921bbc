//! Handlers and hooks shared by several states.

use crate::core::{Event, StateId};
use crate::manager::{mark_clean, mark_dirty, LifecycleError, Machine, Store};
use serde_json::Value;
use tracing::debug;

/// Absorbs an event without effect.
pub fn no_op(_: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    Ok(())
}

/// Loading data is a contract violation in this state.
pub fn cannot_load_data(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    Err(LifecycleError::CannotLoadData {
        state: machine.current_path(),
    })
}

/// Write a field and tell the store the record's hash changed.
pub(crate) fn apply_property(machine: &mut dyn Machine, key: &str, value: Value) {
    let record = machine.record_mut();
    record.write_field(key, value);

    let id = record.id();
    let record_type = record.record_type().to_string();
    record.with_store(&mut |store: &mut dyn Store| store.hash_was_updated(&record_type, id));
}

/// `setProperty` inside a dirty state: write without transitioning.
pub fn set_property(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    if let Event::SetProperty { key, value } = event {
        apply_property(machine, &key, value);
    }
    Ok(())
}

/// Shared `waitingOn` behavior: record the dependency in the pending set.
/// Callers then move into a pending state.
pub(crate) fn track_dependency(machine: &mut dyn Machine, event: Event) {
    if let Event::WaitingOn(dependency) = event {
        debug!(dependency = %dependency.id(), "waiting on dependency");
        machine.pending_mut().waiting_on(&dependency);
    }
}

/// Register the record as dirty under the entered state's family tag.
pub fn became_dirty(machine: &mut dyn Machine, state: StateId) -> Result<(), LifecycleError> {
    if let Some(kind) = machine.tree().dirty_kind(state) {
        mark_dirty(machine.record_mut(), kind);
    }
    Ok(())
}

/// Unregister the record as dirty under the state's family tag.
pub fn became_clean(machine: &mut dyn Machine, state: StateId) -> Result<(), LifecycleError> {
    if let Some(kind) = machine.tree().dirty_kind(state) {
        mark_clean(machine.record_mut(), kind);
    }
    Ok(())
}
