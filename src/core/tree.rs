//! Immutable state tree shared by every state manager.
//!
//! Nodes live in an arena indexed by [`StateId`]. Each node keeps a parent
//! back-reference, used only for lookups (flags, handlers, routes), never
//! for ownership.

use super::event::{Event, EventKind};
use super::flags::FlagOverrides;
use super::id::DirtyKind;
use super::path::StatePath;
use crate::manager::{LifecycleError, Machine};
use std::collections::HashMap;
use std::fmt;

/// Event handler bound to a state. Receives the manager and the event.
pub type Handler = fn(&mut dyn Machine, Event) -> Result<(), LifecycleError>;

/// Enter or exit hook. Receives the manager and the state being entered
/// or exited.
pub type Hook = fn(&mut dyn Machine, StateId) -> Result<(), LifecycleError>;

/// Index of a node in its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// A single state descriptor. Stateless: everything record-specific lives
/// in the manager.
pub struct StateNode {
    pub(crate) name: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) children: Vec<StateId>,
    pub(crate) initial: Option<StateId>,
    pub(crate) flags: FlagOverrides,
    pub(crate) handlers: HashMap<EventKind, Handler>,
    pub(crate) enter: Option<Hook>,
    pub(crate) exit: Option<Hook>,
    pub(crate) dirty_kind: Option<DirtyKind>,
}

impl StateNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    /// Default-entry child; `None` for leaves.
    pub fn initial(&self) -> Option<StateId> {
        self.initial
    }

    pub fn flags(&self) -> &FlagOverrides {
        &self.flags
    }

    pub fn handler(&self, kind: EventKind) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }

    pub fn enter_hook(&self) -> Option<Hook> {
        self.enter
    }

    pub fn exit_hook(&self) -> Option<Hook> {
        self.exit
    }

    pub fn is_leaf(&self) -> bool {
        self.initial.is_none()
    }
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<_> = self.handlers.keys().map(EventKind::name).collect();
        events.sort_unstable();
        f.debug_struct("StateNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("initial", &self.initial)
            .field("events", &events)
            .field("dirty_kind", &self.dirty_kind)
            .finish()
    }
}

/// The static hierarchy. Built once by [`crate::builder::TreeBuilder`].
#[derive(Debug)]
pub struct StateTree {
    nodes: Vec<StateNode>,
}

impl StateTree {
    pub(crate) fn from_nodes(nodes: Vec<StateNode>) -> Self {
        Self { nodes }
    }

    pub fn root(&self) -> StateId {
        StateId(0)
    }

    pub fn node(&self, id: StateId) -> &StateNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follow default-entry children from `id` until a leaf is reached.
    pub fn default_leaf(&self, id: StateId) -> StateId {
        let mut current = id;
        while let Some(next) = self.node(current).initial {
            current = next;
        }
        current
    }

    /// Path from the root to `id`.
    pub fn path_to(&self, id: StateId) -> StatePath {
        let mut ids = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            ids.push(parent);
            current = parent;
        }
        ids.reverse();
        StatePath::from_ids(ids)
    }

    /// Path to the leaf a freshly constructed manager starts in.
    pub fn initial_path(&self) -> StatePath {
        self.path_to(self.default_leaf(self.root()))
    }

    fn child_named(&self, parent: StateId, name: &str) -> Option<StateId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name)
    }

    fn descend(&self, anchor: StateId, route: &str) -> Option<StateId> {
        route
            .split('.')
            .try_fold(anchor, |current, segment| self.child_named(current, segment))
    }

    /// Look up a state by its absolute dotted name, excluding the root
    /// (`"loaded.created.unsaved"`). An empty string names the root.
    pub fn find(&self, absolute: &str) -> Option<StateId> {
        if absolute.is_empty() {
            return Some(self.root());
        }
        self.descend(self.root(), absolute)
    }

    /// Resolve a route relative to the active path.
    ///
    /// Each state on the path, from the leaf up to the root, is tried as
    /// the anchor; the first anchor under which every segment resolves
    /// wins. A route that starts with the root's own name is absolute.
    pub fn resolve(&self, from: &StatePath, route: &str) -> Option<StateId> {
        let root_name = self.node(self.root()).name.as_str();
        if route == root_name {
            return Some(self.root());
        }
        if let Some(rest) = route
            .strip_prefix(root_name)
            .and_then(|r| r.strip_prefix('.'))
        {
            return self.descend(self.root(), rest);
        }
        from.ids()
            .iter()
            .rev()
            .find_map(|anchor| self.descend(*anchor, route))
    }

    /// Find the handler for `kind`, starting at the leaf and walking to the
    /// root. Returns the state that owns the handler alongside it.
    pub fn handler_for(&self, path: &StatePath, kind: EventKind) -> Option<(StateId, Handler)> {
        path.ids()
            .iter()
            .rev()
            .find_map(|id| self.node(*id).handler(kind).map(|h| (*id, h)))
    }

    /// Nearest dirty-family tag at or above `id`.
    pub fn dirty_kind(&self, id: StateId) -> Option<DirtyKind> {
        let mut current = Some(id);
        while let Some(state) = current {
            let node = self.node(state);
            if node.dirty_kind.is_some() {
                return node.dirty_kind;
            }
            current = node.parent;
        }
        None
    }

    /// Dotted name of a path, excluding the root.
    pub fn display(&self, path: &StatePath) -> String {
        path.ids()
            .iter()
            .skip(1)
            .map(|id| self.node(*id).name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{StateBuilder, TreeBuilder};
    use crate::core::Flag;

    fn noop(_: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
        Ok(())
    }

    fn tree() -> StateTree {
        let mut root = StateBuilder::new("root").initial("a");
        for flag in Flag::ALL {
            root = root.flag(flag, false);
        }
        let root = root
            .on(EventKind::Delete, noop)
            .child(
                StateBuilder::new("a")
                    .initial("start")
                    .dirty_kind(DirtyKind::Created)
                    .child(StateBuilder::new("start").on(EventKind::WillCommit, noop))
                    .child(StateBuilder::new("saving")),
            )
            .child(
                StateBuilder::new("b")
                    .initial("start")
                    .child(StateBuilder::new("start"))
                    .child(StateBuilder::new("saving")),
            );
        TreeBuilder::new().root(root).build().unwrap()
    }

    #[test]
    fn initial_path_follows_default_entries() {
        let tree = tree();
        assert_eq!(tree.display(&tree.initial_path()), "a.start");
    }

    #[test]
    fn composite_resolves_to_default_leaf() {
        let tree = tree();
        let b = tree.find("b").unwrap();
        let leaf = tree.default_leaf(b);
        assert_eq!(tree.display(&tree.path_to(leaf)), "b.start");
    }

    #[test]
    fn resolve_prefers_nearest_anchor() {
        let tree = tree();
        let path = tree.initial_path();
        let saving = tree.resolve(&path, "saving").unwrap();
        assert_eq!(tree.display(&tree.path_to(saving)), "a.saving");
    }

    #[test]
    fn resolve_walks_up_to_root() {
        let tree = tree();
        let path = tree.initial_path();
        let target = tree.resolve(&path, "b.saving").unwrap();
        assert_eq!(tree.display(&tree.path_to(target)), "b.saving");
    }

    #[test]
    fn resolve_accepts_absolute_routes() {
        let tree = tree();
        let path = tree.initial_path();
        let target = tree.resolve(&path, "root.b").unwrap();
        assert_eq!(tree.node(target).name(), "b");
        assert_eq!(tree.resolve(&path, "root"), Some(tree.root()));
    }

    #[test]
    fn resolve_rejects_unknown_routes() {
        let tree = tree();
        assert!(tree.resolve(&tree.initial_path(), "missing").is_none());
        assert!(tree.resolve(&tree.initial_path(), "a.missing").is_none());
    }

    #[test]
    fn handler_lookup_walks_to_ancestors() {
        let tree = tree();
        let path = tree.initial_path();
        let (owner, _) = tree.handler_for(&path, EventKind::WillCommit).unwrap();
        assert_eq!(tree.node(owner).name(), "start");
        let (owner, _) = tree.handler_for(&path, EventKind::Delete).unwrap();
        assert_eq!(owner, tree.root());
        assert!(tree.handler_for(&path, EventKind::DidDelete).is_none());
    }

    #[test]
    fn dirty_kind_is_inherited() {
        let tree = tree();
        let start = tree.find("a.start").unwrap();
        assert_eq!(tree.dirty_kind(start), Some(DirtyKind::Created));
        let other = tree.find("b.start").unwrap();
        assert_eq!(tree.dirty_kind(other), None);
    }
}
