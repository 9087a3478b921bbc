//! Builder API for state tree construction.
//!
//! State descriptors are declared with nested [`StateBuilder`]s and turned
//! into an immutable [`StateTree`](crate::core::StateTree) by
//! [`TreeBuilder`], which validates the whole definition first.

pub mod error;
pub mod macros;
pub mod state;
pub mod tree;

pub use error::BuildError;
pub use state::StateBuilder;
pub use tree::TreeBuilder;
