//! Builder for constructing state trees.

use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use crate::core::{StateId, StateNode, StateTree};
use crate::validation::validate_tree;
use stillwater::validation::Validation;

/// Builder that validates and flattens a hierarchy of [`StateBuilder`]s.
#[derive(Default)]
pub struct TreeBuilder {
    root: Option<StateBuilder>,
}

impl TreeBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Set the root state (required).
    pub fn root(mut self, root: StateBuilder) -> Self {
        self.root = Some(root);
        self
    }

    /// Build the tree.
    /// Returns every structural violation at once if the definition is invalid.
    pub fn build(self) -> Result<StateTree, BuildError> {
        let root = self.root.ok_or(BuildError::MissingRoot)?;

        if let Validation::Failure(violations) = validate_tree(&root) {
            return Err(BuildError::InvalidTree(violations.iter().cloned().collect()));
        }

        let mut nodes = Vec::new();
        flatten(root, None, &mut nodes);
        Ok(StateTree::from_nodes(nodes))
    }
}

// Pushes `state` and its descendants depth-first; returns the id of `state`.
fn flatten(state: StateBuilder, parent: Option<StateId>, nodes: &mut Vec<StateNode>) -> StateId {
    let parts = state.into_parts();
    let id = StateId::new(nodes.len());
    nodes.push(StateNode {
        name: parts.name,
        parent,
        children: Vec::new(),
        initial: None,
        flags: parts.flags,
        handlers: parts.handlers,
        enter: parts.enter,
        exit: parts.exit,
        dirty_kind: parts.dirty_kind,
    });

    let mut children = Vec::with_capacity(parts.children.len());
    for child in parts.children {
        children.push(flatten(child, Some(id), nodes));
    }

    let initial = parts.initial.and_then(|name| {
        children
            .iter()
            .copied()
            .find(|child| nodes[child.index()].name == name)
    });

    let node = &mut nodes[id.index()];
    node.children = children;
    node.initial = initial;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Flag;
    use crate::validation::TreeViolation;

    fn complete_root() -> StateBuilder {
        Flag::ALL
            .into_iter()
            .fold(StateBuilder::new("root"), |b, flag| b.flag(flag, false))
    }

    #[test]
    fn builder_requires_root() {
        let result = TreeBuilder::new().build();
        assert!(matches!(result, Err(BuildError::MissingRoot)));
    }

    #[test]
    fn builder_reports_violations() {
        let result = TreeBuilder::new()
            .root(StateBuilder::new("root").child(StateBuilder::new("a")))
            .build();

        match result {
            Err(BuildError::InvalidTree(violations)) => {
                assert!(violations.contains(&TreeViolation::MissingInitial {
                    state: "root".to_string()
                }));
                assert!(violations.len() > 1);
            }
            other => panic!("Expected InvalidTree, got {other:?}"),
        }
    }

    #[test]
    fn flatten_links_parents_and_initials() {
        let tree = TreeBuilder::new()
            .root(
                complete_root()
                    .initial("b")
                    .child(StateBuilder::new("a"))
                    .child(
                        StateBuilder::new("b")
                            .initial("c")
                            .child(StateBuilder::new("c")),
                    ),
            )
            .build()
            .unwrap();

        assert_eq!(tree.len(), 4);
        let root = tree.node(tree.root());
        assert_eq!(root.children().len(), 2);
        let b = tree.find("b").unwrap();
        assert_eq!(root.initial(), Some(b));
        let c = tree.find("b.c").unwrap();
        assert_eq!(tree.node(c).parent(), Some(b));
        assert!(tree.node(c).is_leaf());
        assert!(!tree.node(b).is_leaf());
    }
}
