//! Static state machine data.
//!
//! This module contains the pure part of the record lifecycle:
//! - Identity tokens and event payloads
//! - The immutable state tree and its path resolution
//! - Flag resolution along a state path
//! - Immutable transition history
//!
//! Nothing in here mutates a record; the runtime driver lives in
//! [`crate::manager`].

mod event;
mod flags;
mod history;
mod id;
mod path;
mod tree;

pub use event::{ErrorMap, Event, EventKind};
pub use flags::{Flag, FlagOverrides, Flags};
pub use history::{StateHistory, StateTransition};
pub use id::{DirtyKind, ObjectId};
pub use path::StatePath;
pub use tree::{Handler, Hook, StateId, StateNode, StateTree};
