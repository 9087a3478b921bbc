//! Builder for a single state and its substates.

use crate::core::{DirtyKind, EventKind, Flag, FlagOverrides, Handler, Hook};
use std::collections::HashMap;

/// Builder for constructing a state descriptor with a fluent API.
///
/// Substates are nested builders; the whole hierarchy is flattened and
/// validated by [`crate::builder::TreeBuilder`].
#[derive(Clone)]
pub struct StateBuilder {
    name: String,
    flags: FlagOverrides,
    handlers: HashMap<EventKind, Handler>,
    enter: Option<Hook>,
    exit: Option<Hook>,
    children: Vec<StateBuilder>,
    initial: Option<String>,
    dirty_kind: Option<DirtyKind>,
}

impl StateBuilder {
    /// Create a new builder for the state called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: FlagOverrides::new(),
            handlers: HashMap::new(),
            enter: None,
            exit: None,
            children: Vec::new(),
            initial: None,
            dirty_kind: None,
        }
    }

    /// Override a single flag on this state.
    pub fn flag(mut self, flag: Flag, value: bool) -> Self {
        self.flags.set(flag, value);
        self
    }

    /// Overlay a set of flag overrides, usually written with [`crate::flags!`].
    pub fn flags(mut self, overrides: FlagOverrides) -> Self {
        self.flags = self.flags.merge(overrides);
        self
    }

    /// Bind a handler for `kind`. A later binding replaces an earlier one.
    pub fn on(mut self, kind: EventKind, handler: Handler) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn enter(mut self, hook: Hook) -> Self {
        self.enter = Some(hook);
        self
    }

    pub fn exit(mut self, hook: Hook) -> Self {
        self.exit = Some(hook);
        self
    }

    /// Add a substate.
    pub fn child(mut self, child: StateBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Name the default-entry substate (required for composite states).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Tag this state and its descendants with a dirty-family kind.
    pub fn dirty_kind(mut self, kind: DirtyKind) -> Self {
        self.dirty_kind = Some(kind);
        self
    }

    pub fn state_name(&self) -> &str {
        &self.name
    }

    pub fn flag_overrides(&self) -> &FlagOverrides {
        &self.flags
    }

    pub fn child_states(&self) -> &[StateBuilder] {
        &self.children
    }

    pub fn initial_name(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    pub(crate) fn into_parts(self) -> StateParts {
        StateParts {
            name: self.name,
            flags: self.flags,
            handlers: self.handlers,
            enter: self.enter,
            exit: self.exit,
            children: self.children,
            initial: self.initial,
            dirty_kind: self.dirty_kind,
        }
    }
}

pub(crate) struct StateParts {
    pub name: String,
    pub flags: FlagOverrides,
    pub handlers: HashMap<EventKind, Handler>,
    pub enter: Option<Hook>,
    pub exit: Option<Hook>,
    pub children: Vec<StateBuilder>,
    pub initial: Option<String>,
    pub dirty_kind: Option<DirtyKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Event;
    use crate::manager::{LifecycleError, Machine};

    fn noop(_: &mut dyn Machine, _: Event) -> Result<(), LifecycleError> {
        Ok(())
    }

    #[test]
    fn fluent_api_collects_parts() {
        let state = StateBuilder::new("loaded")
            .flag(Flag::IsLoaded, true)
            .on(EventKind::Delete, noop)
            .initial("saved")
            .child(StateBuilder::new("saved"));

        assert_eq!(state.state_name(), "loaded");
        assert_eq!(state.flag_overrides().get(Flag::IsLoaded), Some(true));
        assert_eq!(state.initial_name(), Some("saved"));
        assert_eq!(state.child_states().len(), 1);
    }

    #[test]
    fn flags_merge_with_single_overrides() {
        let state = StateBuilder::new("deleted")
            .flag(Flag::IsDirty, false)
            .flags(FlagOverrides::new().with(Flag::IsDirty, true));

        assert_eq!(state.flag_overrides().get(Flag::IsDirty), Some(true));
    }
}
