//! Per-manager configuration.

use serde::{Deserialize, Serialize};

/// Options for a [`StateManager`](crate::manager::StateManager).
///
/// Deserializes with defaults for missing keys, so an empty object is a
/// valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Keep a history of completed transitions
    pub record_history: bool,

    /// Upper bound on retained transitions; `None` keeps everything
    pub history_limit: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            record_history: true,
            history_limit: Some(64),
        }
    }
}
