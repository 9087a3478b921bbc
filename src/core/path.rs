//! The active path through the state tree.

use super::tree::StateId;

/// Ordered state ids from the root down to the active leaf.
///
/// Only the tree hands these out, so a path is never empty and always
/// starts at the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatePath(Vec<StateId>);

impl StatePath {
    pub(crate) fn from_ids(ids: Vec<StateId>) -> Self {
        debug_assert!(!ids.is_empty(), "state path must contain the root");
        Self(ids)
    }

    pub fn ids(&self) -> &[StateId] {
        &self.0
    }

    /// The active leaf.
    pub fn leaf(&self) -> StateId {
        self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.0.contains(&id)
    }

    /// Number of leading states shared with `other`. The last shared state
    /// is the common ancestor of both leaves.
    pub fn common_prefix_len(&self, other: &StatePath) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ids: &[usize]) -> StatePath {
        StatePath::from_ids(ids.iter().copied().map(StateId::new).collect())
    }

    #[test]
    fn leaf_is_last_id() {
        assert_eq!(path(&[0, 2, 5]).leaf(), StateId::new(5));
    }

    #[test]
    fn common_prefix_stops_at_divergence() {
        let a = path(&[0, 2, 5, 6]);
        let b = path(&[0, 2, 7]);
        assert_eq!(a.common_prefix_len(&b), 2);
        assert_eq!(b.common_prefix_len(&a), 2);
    }

    #[test]
    fn common_prefix_of_identical_paths_is_full_length() {
        let a = path(&[0, 1, 3]);
        assert_eq!(a.common_prefix_len(&a.clone()), 3);
    }

    #[test]
    fn ancestor_prefix_is_shorter_path() {
        let leaf = path(&[0, 1, 3]);
        let ancestor = path(&[0, 1]);
        assert_eq!(leaf.common_prefix_len(&ancestor), 2);
        assert!(leaf.contains(StateId::new(1)));
    }
}
