//! Interfaces the state machine calls into.
//!
//! Field storage, the transaction and the record registry belong to the
//! surrounding data layer. The machine only reaches them through these
//! traits. See [`crate::memory`] for in-memory implementations.

use crate::core::{DirtyKind, ErrorMap, ObjectId};
use serde_json::Value;

/// Bookkeeping for the set of dirty records committed together.
///
/// A record is registered under at most one kind at a time: marking it
/// dirty under a new kind replaces its previous registration, and marking
/// it dirty again under the same kind is idempotent.
pub trait Transaction {
    fn record_became_dirty(&mut self, kind: DirtyKind, record: ObjectId);
    fn record_became_clean(&mut self, kind: DirtyKind, record: ObjectId);
}

/// Registry hooks: the identity map and live query results.
pub trait Store {
    /// Drop the record from every live result set.
    fn remove_from_record_arrays(&mut self, record: ObjectId);
    /// A field of the record was written directly.
    fn hash_was_updated(&mut self, record_type: &str, record: ObjectId);
}

/// The record whose lifecycle a manager drives.
pub trait Record {
    fn id(&self) -> ObjectId;

    fn record_type(&self) -> &str;

    fn field(&self, key: &str) -> Option<&Value>;

    fn write_field(&mut self, key: &str, value: Value);

    /// Replace all field data at once.
    fn replace_data(&mut self, data: Value);

    /// Open a batch; change notifications are deferred until the matching
    /// [`Record::end_property_changes`].
    fn begin_property_changes(&mut self);

    fn end_property_changes(&mut self);

    fn did_load(&mut self) {}

    fn did_create(&mut self) {}

    fn did_update(&mut self) {}

    /// The adapter rejected the record; `errors` is never empty.
    fn became_invalid(&mut self, _errors: &ErrorMap) {}

    /// Invoke `f` exactly once with the record's transaction.
    fn with_transaction(&mut self, f: &mut dyn FnMut(&mut dyn Transaction));

    /// Invoke `f` with the record's store, if it has one.
    fn with_store(&mut self, _f: &mut dyn FnMut(&mut dyn Store)) {}
}

pub(crate) fn mark_dirty(record: &mut dyn Record, kind: DirtyKind) {
    let id = record.id();
    record.with_transaction(&mut |t: &mut dyn Transaction| t.record_became_dirty(kind, id));
}

pub(crate) fn mark_clean(record: &mut dyn Record, kind: DirtyKind) {
    let id = record.id();
    record.with_transaction(&mut |t: &mut dyn Transaction| t.record_became_clean(kind, id));
}
