//! In-memory collaborators.
//!
//! Reference implementations of [`Record`], [`Transaction`] and [`Store`]
//! for tests, demos and single-process tooling. The transaction and store
//! are shared between records through `Rc<RefCell<_>>`, matching the
//! single-writer model of the state managers that drive them.

use crate::core::{DirtyKind, ErrorMap, ObjectId};
use crate::manager::{Record, Store, Transaction};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

pub type SharedTransaction = Rc<RefCell<MemoryTransaction>>;
pub type SharedStore = Rc<RefCell<MemoryStore>>;

/// One call made into a [`MemoryTransaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionCall {
    Dirty(DirtyKind, ObjectId),
    Clean(DirtyKind, ObjectId),
}

/// Dirty-record buckets keyed by [`DirtyKind`].
///
/// A record sits in at most one bucket: becoming dirty under a new kind
/// moves it.
#[derive(Debug, Default)]
pub struct MemoryTransaction {
    buckets: HashMap<DirtyKind, BTreeSet<ObjectId>>,
    calls: Vec<TransactionCall>,
}

impl MemoryTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTransaction {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Number of buckets holding `record`; always 0 or 1.
    pub fn registrations(&self, record: ObjectId) -> usize {
        self.buckets
            .values()
            .filter(|bucket| bucket.contains(&record))
            .count()
    }

    pub fn kind_of(&self, record: ObjectId) -> Option<DirtyKind> {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.contains(&record))
            .map(|(kind, _)| *kind)
    }

    pub fn bucket(&self, kind: DirtyKind) -> Vec<ObjectId> {
        self.buckets
            .get(&kind)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> &[TransactionCall] {
        &self.calls
    }
}

impl Transaction for MemoryTransaction {
    fn record_became_dirty(&mut self, kind: DirtyKind, record: ObjectId) {
        self.calls.push(TransactionCall::Dirty(kind, record));
        for bucket in self.buckets.values_mut() {
            bucket.remove(&record);
        }
        self.buckets.entry(kind).or_default().insert(record);
    }

    fn record_became_clean(&mut self, kind: DirtyKind, record: ObjectId) {
        self.calls.push(TransactionCall::Clean(kind, record));
        if let Some(bucket) = self.buckets.get_mut(&kind) {
            bucket.remove(&record);
        }
    }
}

/// Log of registry hook calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    removed: Vec<ObjectId>,
    updated: Vec<(String, ObjectId)>,
}

impl MemoryStore {
    pub fn shared() -> SharedStore {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Records dropped from live result sets, in call order.
    pub fn removed(&self) -> &[ObjectId] {
        &self.removed
    }

    /// `(type, id)` pairs reported by direct field writes.
    pub fn updated(&self) -> &[(String, ObjectId)] {
        &self.updated
    }
}

impl Store for MemoryStore {
    fn remove_from_record_arrays(&mut self, record: ObjectId) {
        self.removed.push(record);
    }

    fn hash_was_updated(&mut self, record_type: &str, record: ObjectId) {
        self.updated.push((record_type.to_string(), record));
    }
}

/// Field map with batched change notifications and a callback log.
#[derive(Debug)]
pub struct MemoryRecord {
    id: ObjectId,
    record_type: String,
    data: Map<String, Value>,
    batch_depth: usize,
    deferred: Vec<String>,
    timeline: Vec<String>,
    callbacks: Vec<&'static str>,
    errors: ErrorMap,
    transaction: SharedTransaction,
    store: Option<SharedStore>,
}

impl MemoryRecord {
    /// A record with a fresh identity and its own transaction.
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            record_type: record_type.into(),
            data: Map::new(),
            batch_depth: 0,
            deferred: Vec::new(),
            timeline: Vec::new(),
            callbacks: Vec::new(),
            errors: ErrorMap::new(),
            transaction: MemoryTransaction::shared(),
            store: None,
        }
    }

    /// Share `transaction` with other records.
    pub fn in_transaction(mut self, transaction: SharedTransaction) -> Self {
        self.transaction = transaction;
        self
    }

    pub fn attached_to(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn transaction(&self) -> SharedTransaction {
        Rc::clone(&self.transaction)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Lifecycle callbacks in call order (`"didLoad"`, `"didCreate"`, ...).
    pub fn callbacks(&self) -> &[&'static str] {
        &self.callbacks
    }

    /// Callbacks and delivered change notifications (`"change:<field>"`)
    /// interleaved in the order observers saw them.
    pub fn timeline(&self) -> &[String] {
        &self.timeline
    }

    /// Errors last reported through [`Record::became_invalid`].
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    fn notify(&mut self, key: &str) {
        if self.batch_depth > 0 {
            if !self.deferred.iter().any(|k| k == key) {
                self.deferred.push(key.to_string());
            }
        } else {
            self.timeline.push(format!("change:{key}"));
        }
    }

    fn callback(&mut self, name: &'static str) {
        self.callbacks.push(name);
        self.timeline.push(name.to_string());
    }
}

impl Record for MemoryRecord {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn record_type(&self) -> &str {
        &self.record_type
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn write_field(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
        self.notify(key);
    }

    fn replace_data(&mut self, data: Value) {
        let incoming = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut changed: BTreeSet<String> = self.data.keys().cloned().collect();
        changed.extend(incoming.keys().cloned());
        self.data = incoming;
        for key in changed {
            self.notify(&key);
        }
    }

    fn begin_property_changes(&mut self) {
        self.batch_depth += 1;
    }

    fn end_property_changes(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            for key in std::mem::take(&mut self.deferred) {
                self.timeline.push(format!("change:{key}"));
            }
        }
    }

    fn did_load(&mut self) {
        self.callback("didLoad");
    }

    fn did_create(&mut self) {
        self.callback("didCreate");
    }

    fn did_update(&mut self) {
        self.callback("didUpdate");
    }

    fn became_invalid(&mut self, errors: &ErrorMap) {
        self.errors = errors.clone();
        self.callback("becameInvalid");
    }

    fn with_transaction(&mut self, f: &mut dyn FnMut(&mut dyn Transaction)) {
        let mut transaction = self.transaction.borrow_mut();
        f(&mut *transaction);
    }

    fn with_store(&mut self, f: &mut dyn FnMut(&mut dyn Store)) {
        if let Some(store) = &self.store {
            let mut store = store.borrow_mut();
            f(&mut *store);
        }
    }
}
