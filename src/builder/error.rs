//! Build errors for state trees.

use crate::validation::TreeViolation;
use thiserror::Error;

/// Errors that can occur when building a state tree.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Root state not specified. Call .root(state) before .build()")]
    MissingRoot,

    #[error("State tree definition has {} violation(s): {}", .0.len(), join(.0))]
    InvalidTree(Vec<TreeViolation>),
}

fn join(violations: &[TreeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
