//! Record State: a hierarchical lifecycle state machine for data records
//!
//! Every record managed by a client-side data layer moves through a fixed
//! lifecycle: empty, loading, loaded (saved, created, updated), deleted or
//! error. The lifecycle is a static tree of states shared by all records;
//! each record owns a [`StateManager`] that holds its active leaf.
//!
//! # Core Concepts
//!
//! - **StateTree**: Immutable arena of states with flags, event handlers and
//!   enter/exit hooks, built once through [`builder::TreeBuilder`]
//! - **Events**: Dispatched from the active leaf toward the root; the
//!   nearest handler runs
//! - **Flags**: Boolean queries (`isLoaded`, `isDirty`, ...) answered by the
//!   nearest state that overrides them
//! - **Pending set**: Non-blocking waits on other records before committing
//!
//! # Example
//!
//! ```rust
//! use record_state::core::Event;
//! use record_state::memory::MemoryRecord;
//! use record_state::StateManager;
//! use serde_json::json;
//!
//! let mut manager = StateManager::new(MemoryRecord::new("post"));
//! manager.send(Event::LoadingData).unwrap();
//! manager.send(Event::SetData(json!({"title": "Hello"}))).unwrap();
//! assert_eq!(manager.current_path(), "loaded.saved");
//!
//! manager.send(Event::set_property("title", json!("Bye"))).unwrap();
//! assert_eq!(manager.current_path(), "loaded.updated.unsaved");
//! assert!(manager.is_dirty());
//!
//! manager.send(Event::WillCommit).unwrap();
//! manager.send(Event::DidUpdate).unwrap();
//! assert_eq!(manager.current_path(), "loaded.saved");
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod lifecycle;
pub mod manager;
pub mod memory;
pub mod validation;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointError};
pub use crate::core::{DirtyKind, Event, EventKind, Flag, Flags, ObjectId, StateHistory, StateTree};
pub use lifecycle::record_lifecycle;
pub use manager::{LifecycleError, LoadSignal, ManagerConfig, Record, StateManager};
