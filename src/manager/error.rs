//! Caller contract violations raised by the state machine.

use thiserror::Error;

/// Faults returned synchronously from `send` and `go_to_state`.
///
/// These signal a programming error in the surrounding data layer and are
/// not recoverable within the machine. Validation failures reported by the
/// adapter are ordinary transitions, not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("Cannot load data into a record in state '{state}'")]
    CannotLoadData { state: String },

    #[error("Cannot insert a record into an association while it is {state}")]
    CannotWaitOn { state: String },

    #[error("Cannot set property '{key}' on a record in state '{state}'")]
    CannotSetProperty { state: String, key: String },

    #[error("No state matches route '{route}' from '{from}'")]
    UnknownState { route: String, from: String },
}
