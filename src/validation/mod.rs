//! Accumulating validation of state tree definitions.
//!
//! Uses Stillwater's `Validation` type so that building a malformed tree
//! reports every structural violation in one pass rather than stopping at
//! the first.

pub mod rules;
pub mod violations;

pub use rules::validate_tree;
pub use violations::TreeViolation;
