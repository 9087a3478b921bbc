//! Checkpoint and resume functionality for state managers.
//!
//! A checkpoint captures everything record-specific about a manager: the
//! active leaf, the pending set, the error map and the transition history.
//! Handlers and hooks live in the shared tree and are not serialized.
//! Observers on dependencies cannot be serialized either; after a restore
//! the caller re-attaches them with [`StateManager::reobserve`].

use crate::core::{ErrorMap, ObjectId, StateHistory, StateTree};
use crate::manager::{ManagerConfig, Record, StateManager};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of one record's lifecycle state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Identity of the record the checkpoint was taken from
    pub record: ObjectId,

    /// Dotted path of the active leaf, excluding the root
    pub path: String,

    /// Dependencies still being waited on
    pub pending: Vec<ObjectId>,

    /// Validation errors held while invalid
    pub errors: ErrorMap,

    /// Completed transitions
    pub history: StateHistory,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}

impl<R: Record> StateManager<R> {
    /// Snapshot the record-specific state of this manager.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            record: self.record.id(),
            path: self.current_path(),
            pending: self.pending.iter().collect(),
            errors: self.errors.clone(),
            history: self.history.clone(),
        }
    }

    /// Rebuild a manager over the record lifecycle tree from a checkpoint.
    pub fn restore(record: R, checkpoint: Checkpoint) -> Result<Self, CheckpointError> {
        Self::restore_with(
            crate::lifecycle::record_lifecycle(),
            record,
            checkpoint,
            ManagerConfig::default(),
        )
    }

    /// Rebuild a manager over `tree` from a checkpoint.
    ///
    /// The manager is placed directly at the checkpointed leaf; no enter or
    /// exit hooks run. Restored pending identities have no observers until
    /// [`StateManager::reobserve`] is called for each.
    pub fn restore_with(
        tree: Arc<StateTree>,
        record: R,
        checkpoint: Checkpoint,
        config: ManagerConfig,
    ) -> Result<Self, CheckpointError> {
        let checkpoint = checkpoint.check_version()?;
        if record.id() != checkpoint.record {
            return Err(CheckpointError::RecordMismatch {
                expected: checkpoint.record.to_string(),
                found: record.id().to_string(),
            });
        }

        let leaf = tree
            .find(&checkpoint.path)
            .ok_or_else(|| CheckpointError::UnknownState {
                path: checkpoint.path.clone(),
            })?;
        if !tree.node(leaf).is_leaf() {
            return Err(CheckpointError::NotALeaf {
                path: checkpoint.path,
            });
        }

        let path = tree.path_to(leaf);
        let mut manager = Self::at_path(tree, record, path, config);
        manager.pending.restore(checkpoint.pending);
        manager.errors = checkpoint.errors;
        manager.history = checkpoint.history;
        debug!(
            record = %manager.record.id(),
            state = %manager.current_path(),
            checkpoint = %checkpoint.id,
            "restored from checkpoint"
        );
        Ok(manager)
    }
}
