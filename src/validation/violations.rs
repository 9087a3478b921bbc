//! Violations reported when validating a state tree definition.

use thiserror::Error;

/// A single structural problem in a state tree definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TreeViolation {
    #[error("Root state does not declare a default for flag '{flag}'")]
    MissingFlagDefault { flag: &'static str },

    #[error("State name '{name}' is empty or contains '.'")]
    InvalidName { name: String },

    #[error("State '{parent}' declares more than one child named '{name}'")]
    DuplicateState { parent: String, name: String },

    #[error("Composite state '{state}' has no default entry child")]
    MissingInitial { state: String },

    #[error("State '{state}' names unknown default entry child '{initial}'")]
    UnknownInitial { state: String, initial: String },

    #[error("Leaf state '{state}' declares default entry '{initial}' but has no children")]
    InitialOnLeaf { state: String, initial: String },
}
