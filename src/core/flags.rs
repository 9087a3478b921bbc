//! Lifecycle flags and their resolution along a state path.
//!
//! A flag's effective value is the override declared by the nearest
//! ancestor-or-self of the current leaf. The root declares a default for
//! every flag, so resolution always finds a value.

use super::path::StatePath;
use super::tree::StateTree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight lifecycle booleans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    IsLoaded,
    IsDirty,
    IsSaving,
    IsDeleted,
    IsError,
    IsNew,
    IsValid,
    IsPending,
}

impl Flag {
    pub const ALL: [Flag; 8] = [
        Flag::IsLoaded,
        Flag::IsDirty,
        Flag::IsSaving,
        Flag::IsDeleted,
        Flag::IsError,
        Flag::IsNew,
        Flag::IsValid,
        Flag::IsPending,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::IsLoaded => "isLoaded",
            Self::IsDirty => "isDirty",
            Self::IsSaving => "isSaving",
            Self::IsDeleted => "isDeleted",
            Self::IsError => "isError",
            Self::IsNew => "isNew",
            Self::IsValid => "isValid",
            Self::IsPending => "isPending",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Partial set of flag values declared on a single state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagOverrides([Option<bool>; 8]);

impl FlagOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `flag` overridden to `value`.
    pub fn with(mut self, flag: Flag, value: bool) -> Self {
        self.set(flag, value);
        self
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        self.0[flag.index()] = Some(value);
    }

    pub fn get(&self, flag: Flag) -> Option<bool> {
        self.0[flag.index()]
    }

    /// Overlay `other` on top of `self`; values in `other` win.
    pub fn merge(mut self, other: FlagOverrides) -> Self {
        for flag in Flag::ALL {
            if let Some(value) = other.get(flag) {
                self.set(flag, value);
            }
        }
        self
    }

    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    pub fn missing(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.into_iter().filter(|f| self.get(*f).is_none())
    }
}

/// Snapshot of all eight resolved flags for one state path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    pub is_loaded: bool,
    pub is_dirty: bool,
    pub is_saving: bool,
    pub is_deleted: bool,
    pub is_error: bool,
    pub is_new: bool,
    pub is_valid: bool,
    pub is_pending: bool,
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::IsLoaded => self.is_loaded,
            Flag::IsDirty => self.is_dirty,
            Flag::IsSaving => self.is_saving,
            Flag::IsDeleted => self.is_deleted,
            Flag::IsError => self.is_error,
            Flag::IsNew => self.is_new,
            Flag::IsValid => self.is_valid,
            Flag::IsPending => self.is_pending,
        }
    }
}

impl StateTree {
    /// Resolve `flag` for the given path by scanning from leaf to root.
    ///
    /// Falls back to `false` only for trees whose root omits a default,
    /// which the builder rejects.
    pub fn flag(&self, path: &StatePath, flag: Flag) -> bool {
        path.ids()
            .iter()
            .rev()
            .find_map(|id| self.node(*id).flags().get(flag))
            .unwrap_or(false)
    }

    /// Resolve every flag for the given path.
    pub fn flags(&self, path: &StatePath) -> Flags {
        Flags {
            is_loaded: self.flag(path, Flag::IsLoaded),
            is_dirty: self.flag(path, Flag::IsDirty),
            is_saving: self.flag(path, Flag::IsSaving),
            is_deleted: self.flag(path, Flag::IsDeleted),
            is_error: self.flag(path, Flag::IsError),
            is_new: self.flag(path, Flag::IsNew),
            is_valid: self.flag(path, Flag::IsValid),
            is_pending: self.flag(path, Flag::IsPending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{StateBuilder, TreeBuilder};
    use crate::flags;

    fn tree() -> StateTree {
        let root = StateBuilder::new("root")
            .flags(flags!(
                IsLoaded = false,
                IsDirty = false,
                IsSaving = false,
                IsDeleted = false,
                IsError = false,
                IsNew = false,
                IsValid = true,
                IsPending = false,
            ))
            .initial("outer")
            .child(
                StateBuilder::new("outer")
                    .flag(Flag::IsDirty, true)
                    .initial("inner")
                    .child(StateBuilder::new("inner").flag(Flag::IsValid, false))
                    .child(StateBuilder::new("plain").flag(Flag::IsDirty, false)),
            );
        TreeBuilder::new().root(root).build().unwrap()
    }

    #[test]
    fn overrides_merge_later_wins() {
        let base = FlagOverrides::new().with(Flag::IsDirty, true);
        let merged = base.merge(FlagOverrides::new().with(Flag::IsDirty, false));
        assert_eq!(merged.get(Flag::IsDirty), Some(false));
        assert_eq!(merged.get(Flag::IsNew), None);
    }

    #[test]
    fn missing_lists_unset_flags() {
        let overrides = FlagOverrides::new().with(Flag::IsLoaded, true);
        assert!(!overrides.is_complete());
        assert_eq!(overrides.missing().count(), 7);
    }

    #[test]
    fn nearest_override_wins() {
        let tree = tree();
        let path = tree.initial_path();
        assert!(tree.flag(&path, Flag::IsDirty));
        assert!(!tree.flag(&path, Flag::IsValid));
    }

    #[test]
    fn leaf_override_shadows_parent() {
        let tree = tree();
        let plain = tree.find("outer.plain").unwrap();
        let path = tree.path_to(plain);
        assert!(!tree.flag(&path, Flag::IsDirty));
    }

    #[test]
    fn root_defaults_apply_without_overrides() {
        let tree = tree();
        let flags = tree.flags(&tree.initial_path());
        assert!(!flags.is_loaded);
        assert!(!flags.is_pending);
        assert!(flags.get(Flag::IsDirty));
    }
}
