//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The recorded path names no state in the tree
    #[error("Checkpoint path '{path}' does not name a state")]
    UnknownState { path: String },

    /// The recorded path names a composite state
    #[error("Checkpoint path '{path}' is not a leaf state")]
    NotALeaf { path: String },

    /// The checkpoint belongs to a different record
    #[error("Checkpoint was taken for record {expected}, not {found}")]
    RecordMismatch { expected: String, found: String },
}
