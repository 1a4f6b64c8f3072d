//! Typed record collections stored as JSON arrays under a single key.
//!
//! Every element is decoded on its own. Elements that fail to decode are
//! moved to `quarantine::<key>` with the reason, so a single bad record
//! never hides the rest of the collection and never reaches the domain.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::domain::errors::ValidationError;
use crate::storage::traits::KeyValueStore;

/// Why a stored record could not be turned into a domain value.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
}

/// A domain type that is persisted as one element of a JSON array.
pub trait Record: Sized {
    /// Store key holding the collection
    const KEY: &'static str;

    fn decode(value: Value) -> Result<Self, RecordError>;

    fn encode(&self) -> Result<Value>;
}

pub fn quarantine_key(key: &str) -> String {
    format!("quarantine::{}", key)
}

/// Access to the collection of `T` records in a key-value store.
pub struct RecordSet<T> {
    store: Arc<dyn KeyValueStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordSet<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

struct Rejected {
    record: Value,
    reason: String,
}

impl<T: Record> RecordSet<T> {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Decode every valid record. Malformed ones are quarantined first.
    pub fn load_all(&self) -> Result<Vec<T>> {
        let current = self.store.get(T::KEY)?;
        let (records, rejected) = Self::decode_all(current);
        if rejected.is_empty() {
            return Ok(records);
        }

        // Re-decode under the store lock so the rewrite and the quarantine
        // see the same data.
        self.modify(|_| Ok(()))?;
        Ok(records)
    }

    /// Read-modify-write of the whole collection. `apply` sees only valid
    /// records; whatever it leaves in the vector is written back.
    ///
    /// Rejected elements stay in the collection until their quarantine entry
    /// is written, and are only then removed from `T::KEY`.
    pub fn modify<R>(&self, apply: impl FnOnce(&mut Vec<T>) -> Result<R>) -> Result<R> {
        let mut apply = Some(apply);
        let mut output = None;
        let mut rejected = Vec::new();

        self.store.update(T::KEY, &mut |current| {
            let apply = apply
                .take()
                .ok_or_else(|| anyhow!("update of '{}' ran more than once", T::KEY))?;
            let (mut records, bad) = Self::decode_all(current);
            output = Some(apply(&mut records)?);
            let mut encoded = Self::encode_all(&records)?;
            encoded.extend(bad.iter().map(|entry| entry.record.clone()));
            rejected = bad;
            Ok(Value::Array(encoded))
        })?;

        if !rejected.is_empty() {
            if let Err(e) = self.quarantine(&rejected) {
                error!("Failed to quarantine malformed '{}' records: {:#}", T::KEY, e);
                return Err(e);
            }
            self.release(&rejected)?;
        }

        output.ok_or_else(|| anyhow!("update of '{}' produced no result", T::KEY))
    }

    fn decode_all(current: Option<Value>) -> (Vec<T>, Vec<Rejected>) {
        let items = match current {
            None | Some(Value::Null) => return (Vec::new(), Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                warn!("Stored '{}' is not a JSON array; quarantining it", T::KEY);
                return (
                    Vec::new(),
                    vec![Rejected {
                        record: other,
                        reason: "expected a JSON array".to_string(),
                    }],
                );
            }
        };

        let mut records = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        for item in items {
            match T::decode(item.clone()) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Quarantining malformed '{}' record: {}", T::KEY, e);
                    rejected.push(Rejected {
                        record: item,
                        reason: e.to_string(),
                    });
                }
            }
        }
        (records, rejected)
    }

    fn encode_all(records: &[T]) -> Result<Vec<Value>> {
        records
            .iter()
            .map(Record::encode)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Failed to encode '{}' records", T::KEY))
    }

    /// Drop one stored copy of each quarantined element from `T::KEY`
    fn release(&self, rejected: &[Rejected]) -> Result<()> {
        self.store.update(T::KEY, &mut |current| {
            let items = match current {
                Some(Value::Array(items)) => items,
                Some(other) => return Ok(other),
                None => return Ok(Value::Array(Vec::new())),
            };
            let mut pending: Vec<&Value> = rejected.iter().map(|bad| &bad.record).collect();
            let kept = items
                .into_iter()
                .filter(|item| match pending.iter().position(|record| *record == item) {
                    Some(index) => {
                        pending.swap_remove(index);
                        false
                    }
                    None => true,
                })
                .collect();
            Ok(Value::Array(kept))
        })
    }

    fn quarantine(&self, rejected: &[Rejected]) -> Result<()> {
        let key = quarantine_key(T::KEY);
        self.store.update(&key, &mut |current| {
            let mut entries = match current {
                Some(Value::Array(entries)) => entries,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            entries.extend(rejected.iter().map(|bad| {
                json!({
                    "record": bad.record,
                    "reason": bad.reason,
                })
            }));
            Ok(Value::Array(entries))
        })
    }
}
