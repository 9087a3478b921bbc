//! State transition history tracking.
//!
//! Provides immutable tracking of completed transitions, following
//! functional programming principles.

use super::event::EventKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single completed transition.
///
/// # Example
///
/// ```rust
/// use record_state::core::{EventKind, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "loaded.created.unsaved".to_string(),
///     to: "loaded.created.inFlight".to_string(),
///     event: Some(EventKind::WillCommit),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.event, Some(EventKind::WillCommit));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Dotted path of the leaf being left
    pub from: String,
    /// Dotted path of the leaf being entered
    pub to: String,
    /// The event whose handler requested the transition, if any
    pub event: Option<EventKind>,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of completed transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use record_state::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
/// let history = history.record(StateTransition {
///     from: "empty".to_string(),
///     to: "loading".to_string(),
///     event: None,
///     timestamp: Utc::now(),
/// });
/// let history = history.record(StateTransition {
///     from: "loading".to_string(),
///     to: "loaded.saved".to_string(),
///     event: None,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["empty", "loading", "loaded.saved"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Keep only the most recent `limit` transitions.
    pub fn retain_last(mut self, limit: usize) -> Self {
        if self.transitions.len() > limit {
            let excess = self.transitions.len() - limit;
            self.transitions.drain(..excess);
        }
        self
    }

    /// Get the path of states traversed: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: &str, to: &str) -> StateTransition {
        StateTransition {
            from: from.to_string(),
            to: to.to_string(),
            event: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert_eq!(history.transitions().len(), 0);
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(transition("empty", "loading"));

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let history = StateHistory::new()
            .record(transition("empty", "loading"))
            .record(transition("loading", "loaded.saved"));

        assert_eq!(history.get_path(), vec!["empty", "loading", "loaded.saved"]);
    }

    #[test]
    fn retain_last_drops_oldest() {
        let history = StateHistory::new()
            .record(transition("a", "b"))
            .record(transition("b", "c"))
            .record(transition("c", "d"))
            .retain_last(2);

        assert_eq!(history.get_path(), vec!["b", "c", "d"]);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let start = Utc::now();
        let history = StateHistory::new()
            .record(StateTransition {
                timestamp: start,
                ..transition("a", "b")
            })
            .record(StateTransition {
                timestamp: start + chrono::Duration::milliseconds(25),
                ..transition("b", "c")
            });

        assert_eq!(
            history.duration(),
            Some(std::time::Duration::from_millis(25))
        );
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(StateTransition {
            event: Some(EventKind::Delete),
            ..transition("loaded.saved", "deleted.start")
        });

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(history, deserialized);
    }
}
