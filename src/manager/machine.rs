//! Runtime driver holding one record's active state path.

use crate::core::{
    DirtyKind, ErrorMap, Event, EventKind, Flag, Flags, ObjectId, StateHistory, StateId,
    StatePath, StateTransition, StateTree,
};
use crate::manager::collaborators::Record;
use crate::manager::config::ManagerConfig;
use crate::manager::error::LifecycleError;
use crate::manager::tracker::{LoadSignal, PendingTracker};
use crate::manager::Machine;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace};

/// Drives the lifecycle of a single record over a shared [`StateTree`].
///
/// A manager is mutated only by the code that owns its record. Handlers
/// and hooks may call back into [`StateManager::send`] and
/// [`StateManager::go_to_state`]; those nested calls complete before the
/// outer transition updates the path.
pub struct StateManager<R: Record> {
    pub(crate) tree: Arc<StateTree>,
    pub(crate) record: R,
    pub(crate) path: StatePath,
    pub(crate) pending: PendingTracker,
    pub(crate) inbox: UnboundedReceiver<ObjectId>,
    pub(crate) errors: ErrorMap,
    pub(crate) signal: LoadSignal,
    pub(crate) history: StateHistory,
    pub(crate) config: ManagerConfig,
    dispatching: Vec<EventKind>,
}

impl<R: Record> StateManager<R> {
    /// Create a manager over the shared record lifecycle tree.
    pub fn new(record: R) -> Self {
        Self::with_config(record, ManagerConfig::default())
    }

    pub fn with_config(record: R, config: ManagerConfig) -> Self {
        Self::with_tree(crate::lifecycle::record_lifecycle(), record, config)
    }

    /// Create a manager over any tree. It starts in the tree's default
    /// leaf; no enter hooks run.
    pub fn with_tree(tree: Arc<StateTree>, record: R, config: ManagerConfig) -> Self {
        let path = tree.initial_path();
        Self::at_path(tree, record, path, config)
    }

    pub(crate) fn at_path(
        tree: Arc<StateTree>,
        record: R,
        path: StatePath,
        config: ManagerConfig,
    ) -> Self {
        let (pending, inbox) = PendingTracker::channel();
        let signal = LoadSignal::new(record.id());
        let manager = Self {
            tree,
            record,
            path,
            pending,
            inbox,
            errors: ErrorMap::new(),
            signal,
            history: StateHistory::new(),
            config,
            dispatching: Vec::new(),
        };
        manager.publish_loaded();
        manager
    }

    /// Dispatch an event.
    ///
    /// The handler is looked up from the active leaf toward the root and
    /// exactly one handler runs. An event nobody handles is dropped.
    pub fn send(&mut self, event: Event) -> Result<(), LifecycleError> {
        let kind = event.kind();
        let tree = Arc::clone(&self.tree);
        let Some((owner, handler)) = tree.handler_for(&self.path, kind) else {
            trace!(
                record = %self.record.id(),
                event = kind.name(),
                state = %tree.display(&self.path),
                "no handler for event, dropping"
            );
            return Ok(());
        };

        debug!(
            record = %self.record.id(),
            event = kind.name(),
            handler = tree.node(owner).name(),
            "dispatching event"
        );
        self.dispatching.push(kind);
        let result = handler(self, event);
        self.dispatching.pop();
        result
    }

    /// Transition to the state named by `route`.
    ///
    /// Exit hooks run leaf-first up to the common ancestor, then enter hooks
    /// run from below the common ancestor down to the target's default leaf.
    /// The path changes only after every hook has returned.
    pub fn go_to_state(&mut self, route: &str) -> Result<(), LifecycleError> {
        let tree = Arc::clone(&self.tree);
        let target = tree
            .resolve(&self.path, route)
            .ok_or_else(|| LifecycleError::UnknownState {
                route: route.to_string(),
                from: tree.display(&self.path),
            })?;
        let target_path = tree.path_to(tree.default_leaf(target));

        let shared = self.path.common_prefix_len(&target_path);
        if shared == self.path.len() && shared == target_path.len() {
            trace!(route, "already in target state");
            return Ok(());
        }

        let from = tree.display(&self.path);
        let exiting: Vec<StateId> = self.path.ids()[shared..].iter().rev().copied().collect();
        for state in exiting {
            if let Some(exit) = tree.node(state).exit_hook() {
                trace!(state = tree.node(state).name(), "exit");
                exit(self, state)?;
            }
        }
        for &state in &target_path.ids()[shared..] {
            if let Some(enter) = tree.node(state).enter_hook() {
                trace!(state = tree.node(state).name(), "enter");
                enter(self, state)?;
            }
        }

        self.path = target_path;
        let to = tree.display(&self.path);
        debug!(record = %self.record.id(), %from, %to, "transitioned");
        self.record_transition(from, to);
        self.publish_loaded();
        Ok(())
    }

    /// Deliver dependency notifications that arrived since the last call,
    /// one `doneWaitingOn` event each. Returns how many were delivered.
    pub fn process_notifications(&mut self) -> Result<usize, LifecycleError> {
        let mut delivered = 0;
        while let Ok(id) = self.inbox.try_recv() {
            self.send(Event::DoneWaitingOn(id))?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Re-attach observation for a dependency restored from a checkpoint.
    /// Returns `false` if the identity is not pending.
    pub fn reobserve(&mut self, dependency: &LoadSignal) -> bool {
        if !self.pending.contains(dependency.id()) {
            return false;
        }
        self.pending.observe(dependency);
        true
    }

    fn record_transition(&mut self, from: String, to: String) {
        if !self.config.record_history {
            return;
        }
        let transition = StateTransition {
            from,
            to,
            event: self.dispatching.last().copied(),
            timestamp: Utc::now(),
        };
        let history = self.history.record(transition);
        self.history = match self.config.history_limit {
            Some(limit) => history.retain_last(limit),
            None => history,
        };
    }

    fn publish_loaded(&self) {
        self.signal.set_loaded(self.is_loaded());
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.tree.flag(&self.path, flag)
    }

    pub fn flags(&self) -> Flags {
        self.tree.flags(&self.path)
    }

    pub fn is_loaded(&self) -> bool {
        self.flag(Flag::IsLoaded)
    }

    pub fn is_dirty(&self) -> bool {
        self.flag(Flag::IsDirty)
    }

    pub fn is_saving(&self) -> bool {
        self.flag(Flag::IsSaving)
    }

    pub fn is_deleted(&self) -> bool {
        self.flag(Flag::IsDeleted)
    }

    pub fn is_error(&self) -> bool {
        self.flag(Flag::IsError)
    }

    pub fn is_new(&self) -> bool {
        self.flag(Flag::IsNew)
    }

    pub fn is_valid(&self) -> bool {
        self.flag(Flag::IsValid)
    }

    pub fn is_pending(&self) -> bool {
        self.flag(Flag::IsPending)
    }

    /// Dotted path of the active leaf, excluding the root
    /// (`"loaded.created.unsaved"`).
    pub fn current_path(&self) -> String {
        self.tree.display(&self.path)
    }

    /// Name of the active leaf.
    pub fn current_state(&self) -> &str {
        self.tree.node(self.path.leaf()).name()
    }

    pub fn state_path(&self) -> &StatePath {
        &self.path
    }

    /// Dirty-family tag of the active leaf, if any.
    pub fn dirty_kind(&self) -> Option<DirtyKind> {
        self.tree.dirty_kind(self.path.leaf())
    }

    pub fn tree(&self) -> &Arc<StateTree> {
        &self.tree
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn into_record(self) -> R {
        self.record
    }

    /// Validation errors; non-empty only while the record is invalid.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn pending(&self) -> &PendingTracker {
        &self.pending
    }

    /// Signal other records can wait on; tracks this record's `isLoaded`.
    pub fn load_signal(&self) -> LoadSignal {
        self.signal.clone()
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

impl<R: Record> Machine for StateManager<R> {
    fn send(&mut self, event: Event) -> Result<(), LifecycleError> {
        StateManager::send(self, event)
    }

    fn go_to_state(&mut self, route: &str) -> Result<(), LifecycleError> {
        StateManager::go_to_state(self, route)
    }

    fn tree(&self) -> &StateTree {
        &self.tree
    }

    fn current_path(&self) -> String {
        StateManager::current_path(self)
    }

    fn record_mut(&mut self) -> &mut dyn Record {
        &mut self.record
    }

    fn pending_mut(&mut self) -> &mut PendingTracker {
        &mut self.pending
    }

    fn errors_mut(&mut self) -> &mut ErrorMap {
        &mut self.errors
    }
}
