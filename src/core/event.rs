//! Events sent into a state manager.

use super::id::ObjectId;
use crate::manager::LoadSignal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Field name to validation message, as reported by `wasInvalid`.
pub type ErrorMap = BTreeMap<String, String>;

/// Payload-free event discriminant, used as the key of handler maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    LoadingData,
    WillLoadData,
    SetData,
    LoadedData,
    DidCreate,
    SetProperty,
    Delete,
    WillCommit,
    WaitingOn,
    DoneWaitingOn,
    NotifyModel,
    DidUpdate,
    WasInvalid,
    BecameValid,
    DidDelete,
}

impl EventKind {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadingData => "loadingData",
            Self::WillLoadData => "willLoadData",
            Self::SetData => "setData",
            Self::LoadedData => "loadedData",
            Self::DidCreate => "didCreate",
            Self::SetProperty => "setProperty",
            Self::Delete => "delete",
            Self::WillCommit => "willCommit",
            Self::WaitingOn => "waitingOn",
            Self::DoneWaitingOn => "doneWaitingOn",
            Self::NotifyModel => "notifyModel",
            Self::DidUpdate => "didUpdate",
            Self::WasInvalid => "wasInvalid",
            Self::BecameValid => "becameValid",
            Self::DidDelete => "didDelete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event together with its payload.
#[derive(Clone, Debug)]
pub enum Event {
    LoadingData,
    WillLoadData,
    /// Replace the record's data. `Value::Null` loads nothing.
    SetData(Value),
    LoadedData,
    DidCreate,
    SetProperty { key: String, value: Value },
    Delete,
    WillCommit,
    /// Block committing until the dependency behind the signal is loaded.
    WaitingOn(LoadSignal),
    DoneWaitingOn(ObjectId),
    NotifyModel,
    DidUpdate,
    WasInvalid(ErrorMap),
    BecameValid,
    DidDelete,
}

impl Event {
    pub fn set_property(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::SetProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::LoadingData => EventKind::LoadingData,
            Self::WillLoadData => EventKind::WillLoadData,
            Self::SetData(_) => EventKind::SetData,
            Self::LoadedData => EventKind::LoadedData,
            Self::DidCreate => EventKind::DidCreate,
            Self::SetProperty { .. } => EventKind::SetProperty,
            Self::Delete => EventKind::Delete,
            Self::WillCommit => EventKind::WillCommit,
            Self::WaitingOn(_) => EventKind::WaitingOn,
            Self::DoneWaitingOn(_) => EventKind::DoneWaitingOn,
            Self::NotifyModel => EventKind::NotifyModel,
            Self::DidUpdate => EventKind::DidUpdate,
            Self::WasInvalid(_) => EventKind::WasInvalid,
            Self::BecameValid => EventKind::BecameValid,
            Self::DidDelete => EventKind::DidDelete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_payload_variant() {
        assert_eq!(
            Event::set_property("name", "x").kind(),
            EventKind::SetProperty
        );
        assert_eq!(Event::SetData(Value::Null).kind(), EventKind::SetData);
        assert_eq!(
            Event::DoneWaitingOn(ObjectId::new()).kind(),
            EventKind::DoneWaitingOn
        );
    }

    #[test]
    fn kind_names_are_camel_case() {
        assert_eq!(EventKind::WillCommit.name(), "willCommit");
        assert_eq!(EventKind::DoneWaitingOn.to_string(), "doneWaitingOn");
        assert_eq!(
            serde_json::to_string(&EventKind::WasInvalid).unwrap(),
            "\"wasInvalid\""
        );
    }
}
