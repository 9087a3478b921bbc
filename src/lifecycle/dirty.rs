//! The dirty family shared by `loaded.created` and `loaded.updated`.
//!
//! ```text
//! <family>  [isDirty]           (default entry: unsaved)
//!  ├ unsaved
//!  ├ pending  [isPending]       (default entry: start)
//!  │   ├ start
//!  │   └ saving [isSaving]
//!  ├ inFlight [isSaving]
//!  └ invalid  [isValid=false]
//! ```
//!
//! `unsaved` registers the record with its transaction on entry and
//! `inFlight` unregisters it, since the commit then belongs to the
//! transaction's in-flight bookkeeping. `pending` accepts further
//! dependencies while waiting and forgets them if it is left before they
//! resolve.

use super::handlers::{
    apply_property, became_clean, became_dirty, cannot_load_data, set_property, track_dependency,
};
use crate::builder::StateBuilder;
use crate::core::{DirtyKind, Event, EventKind, Flag, Handler, StateId};
use crate::manager::{LifecycleError, Machine};
use tracing::{debug, warn};

/// Build one dirty family. `notify` handles the `notifyModel` event that
/// `unsaved` sends when it is left.
pub fn dirty_family(name: &str, kind: DirtyKind, notify: Handler) -> StateBuilder {
    StateBuilder::new(name)
        .dirty_kind(kind)
        .flag(Flag::IsDirty, true)
        .initial("unsaved")
        .on(EventKind::WillLoadData, cannot_load_data)
        .on(EventKind::SetProperty, set_property)
        .on(EventKind::NotifyModel, notify)
        .child(unsaved())
        .child(pending())
        .child(in_flight())
        .child(invalid())
}

fn unsaved() -> StateBuilder {
    StateBuilder::new("unsaved")
        .enter(became_dirty)
        .exit(notify_model)
        .on(EventKind::WaitingOn, wait_then_pend)
        .on(EventKind::WillCommit, commit)
}

fn pending() -> StateBuilder {
    StateBuilder::new("pending")
        .flag(Flag::IsPending, true)
        .initial("start")
        .exit(abandon_dependencies)
        .on(EventKind::WaitingOn, wait_while_pending)
        .child(
            StateBuilder::new("start")
                .on(EventKind::WillCommit, commit_when_ready)
                .on(EventKind::DoneWaitingOn, resolved_to_unsaved),
        )
        .child(
            StateBuilder::new("saving")
                .flag(Flag::IsSaving, true)
                .on(EventKind::DoneWaitingOn, resolved_to_in_flight),
        )
}

fn in_flight() -> StateBuilder {
    StateBuilder::new("inFlight")
        .flag(Flag::IsSaving, true)
        .enter(became_clean)
        .on(EventKind::DidUpdate, saved)
        .on(EventKind::WasInvalid, rejected)
}

fn invalid() -> StateBuilder {
    StateBuilder::new("invalid")
        .flag(Flag::IsValid, false)
        .exit(clear_errors)
        .on(EventKind::SetProperty, correct_property)
        .on(EventKind::BecameValid, revalidated)
}

fn notify_model(machine: &mut dyn Machine, _: StateId) -> Result<(), LifecycleError> {
    machine.send(Event::NotifyModel)
}

fn wait_then_pend(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    track_dependency(machine, event);
    machine.go_to_state("pending")
}

// Stays in the current substate so a remembered commit is kept.
fn wait_while_pending(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    track_dependency(machine, event);
    Ok(())
}

// Draining leaves nothing behind; any other exit (a delete) drops what is
// still pending.
fn abandon_dependencies(machine: &mut dyn Machine, _: StateId) -> Result<(), LifecycleError> {
    let pending = machine.pending_mut();
    if !pending.is_empty() {
        debug!(abandoned = pending.len(), "leaving pending with dependencies outstanding");
        pending.clear();
    }
    Ok(())
}

fn commit(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("inFlight")
}

// Remember the commit request; completion then routes to inFlight.
fn commit_when_ready(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("saving")
}

fn resolved_to_unsaved(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    resolve(machine, event, "unsaved")
}

fn resolved_to_in_flight(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    resolve(machine, event, "inFlight")
}

fn resolve(machine: &mut dyn Machine, event: Event, next: &str) -> Result<(), LifecycleError> {
    let Event::DoneWaitingOn(id) = event else {
        return Ok(());
    };
    if machine.pending_mut().done_waiting_on(id) {
        debug!(dependency = %id, next, "pending set drained");
        machine.go_to_state(next)
    } else {
        Ok(())
    }
}

fn saved(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("loaded")
}

fn rejected(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    let Event::WasInvalid(errors) = event else {
        return Ok(());
    };
    if errors.is_empty() {
        warn!(state = %machine.current_path(), "wasInvalid without errors, treating as valid");
        return machine.go_to_state("unsaved");
    }
    machine.record_mut().became_invalid(&errors);
    *machine.errors_mut() = errors;
    machine.go_to_state("invalid")
}

fn correct_property(machine: &mut dyn Machine, event: Event) -> Result<(), LifecycleError> {
    let Event::SetProperty { key, value } = event else {
        return Ok(());
    };
    apply_property(machine, &key, value);

    let errors = machine.errors_mut();
    errors.remove(&key);
    if errors.is_empty() {
        machine.send(Event::BecameValid)
    } else {
        Ok(())
    }
}

fn revalidated(machine: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
    machine.go_to_state("unsaved")
}

fn clear_errors(machine: &mut dyn Machine, _: StateId) -> Result<(), LifecycleError> {
    machine.errors_mut().clear();
    Ok(())
}
