//! Runtime state managers and the collaborators they call into.
//!
//! This module is the imperative shell around the static tree in
//! [`crate::core`]:
//!
//! - **StateManager**: per-record driver; dispatches events and runs
//!   transitions with their enter/exit hooks
//! - **PendingTracker** / **LoadSignal**: non-blocking waits on other records
//! - **Record** / **Transaction** / **Store**: the surrounding data layer

mod collaborators;
mod config;
mod error;
mod machine;
mod tracker;

pub use collaborators::{Record, Store, Transaction};
pub(crate) use collaborators::{mark_clean, mark_dirty};
pub use config::ManagerConfig;
pub use error::LifecycleError;
pub use machine::StateManager;
pub use tracker::{LoadSignal, PendingTracker};

use crate::core::{ErrorMap, Event, StateTree};

/// The view of a manager that handlers and hooks receive.
///
/// State descriptors are shared by every record, so handlers reach the
/// record-specific parts (record, pending set, error map) through here.
pub trait Machine {
    /// Dispatch a nested event.
    fn send(&mut self, event: Event) -> Result<(), LifecycleError>;

    /// Start a nested transition.
    fn go_to_state(&mut self, route: &str) -> Result<(), LifecycleError>;

    fn tree(&self) -> &StateTree;

    fn current_path(&self) -> String;

    fn record_mut(&mut self) -> &mut dyn Record;

    fn pending_mut(&mut self) -> &mut PendingTracker;

    fn errors_mut(&mut self) -> &mut ErrorMap;
}
