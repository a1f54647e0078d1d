// ── In-process inventory store ──
//
// Records are held as JSON objects, one table per endpoint. Creates and
// updates go through the same serde shapes the HTTP client sends, so a
// draft that would not deserialize back into its record type fails here
// as well. Natural-key lookups use `Resource::matches`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;
use netsync_api::{RecordId, Resource};
use serde::Serialize;
use serde_json::Value;

use super::InventoryStore;
use crate::error::CoreError;

type Table = BTreeMap<RecordId, Value>;

/// A NetBox stand-in for tests and offline runs.
pub struct MemoryStore {
    /// Endpoint -> records ordered by id.
    tables: DashMap<&'static str, Table>,

    /// Last id handed out (shared across tables, like a single sequence).
    next_id: AtomicU64,

    /// Number of successful creates, across all tables.
    created: AtomicUsize,

    /// Endpoint -> message for creates that should be refused.
    rejections: DashMap<&'static str, String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            next_id: AtomicU64::new(0),
            created: AtomicUsize::new(0),
            rejections: DashMap::new(),
        }
    }

    /// Every stored record of kind `R`, ordered by id.
    pub fn records<R: Resource>(&self) -> Vec<R> {
        self.tables
            .get(R::ENDPOINT)
            .map(|table| {
                table
                    .values()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count<R: Resource>(&self) -> usize {
        self.tables.get(R::ENDPOINT).map_or(0, |t| t.len())
    }

    /// Total creates since construction.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Refuse every subsequent create of kind `R` with `message`.
    pub fn reject_creates<R: Resource>(&self, message: impl Into<String>) {
        self.rejections.insert(R::ENDPOINT, message.into());
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn matching<R: Resource>(&self, query: &R::Query) -> Vec<R> {
        self.records::<R>()
            .into_iter()
            .filter(|r| r.matches(query))
            .collect()
    }

    fn to_object<B: Serialize>(body: &B) -> Result<serde_json::Map<String, Value>, CoreError> {
        match serde_json::to_value(body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(CoreError::Internal(format!(
                "request body is not an object: {other}"
            ))),
            Err(e) => Err(CoreError::Internal(format!("cannot serialize body: {e}"))),
        }
    }

    fn decode<R: Resource>(value: Value) -> Result<R, CoreError> {
        serde_json::from_value(value).map_err(|e| CoreError::Store {
            message: format!("{}: {e}", R::ENDPOINT),
            status: Some(400),
        })
    }

    fn not_found<R: Resource>(id: RecordId) -> CoreError {
        CoreError::Store {
            message: format!("{}{id}/ not found", R::ENDPOINT),
            status: Some(404),
        }
    }
}

/// JSON merge: objects merge key-wise, anything else replaces.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

impl InventoryStore for MemoryStore {
    async fn get<R: Resource>(&self, query: &R::Query) -> Result<Option<R>, CoreError> {
        let mut found = self.matching::<R>(query);
        match found.len() {
            0 | 1 => Ok(found.pop()),
            count => Err(CoreError::Ambiguous {
                kind: R::ENDPOINT,
                count,
            }),
        }
    }

    async fn fetch<R: Resource>(&self, id: RecordId) -> Result<Option<R>, CoreError> {
        let value = self
            .tables
            .get(R::ENDPOINT)
            .and_then(|table| table.get(&id).cloned());
        value.map(Self::decode::<R>).transpose()
    }

    async fn filter<R: Resource>(&self, query: &R::Query) -> Result<Vec<R>, CoreError> {
        Ok(self.matching(query))
    }

    async fn list<R: Resource>(&self) -> Result<Vec<R>, CoreError> {
        Ok(self.records())
    }

    async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R, CoreError> {
        if let Some(message) = self.rejections.get(R::ENDPOINT) {
            return Err(CoreError::Store {
                message: message.clone(),
                status: Some(400),
            });
        }

        let mut object = Self::to_object(draft)?;
        let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        object.insert("id".into(), Value::from(id.0));

        let value = Value::Object(object);
        let record = Self::decode::<R>(value.clone())?;
        self.tables.entry(R::ENDPOINT).or_default().insert(id, value);
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(record)
    }

    async fn update<R: Resource>(&self, id: RecordId, patch: &R::Patch) -> Result<R, CoreError> {
        let patch = Value::Object(Self::to_object(patch)?);
        let mut table = self
            .tables
            .get_mut(R::ENDPOINT)
            .ok_or_else(|| Self::not_found::<R>(id))?;
        let current = table.get(&id).ok_or_else(|| Self::not_found::<R>(id))?;

        let mut merged = current.clone();
        merge(&mut merged, patch);
        let record = Self::decode::<R>(merged.clone())?;
        table.insert(id, merged);
        Ok(record)
    }

    async fn delete<R: Resource>(&self, id: RecordId) -> Result<(), CoreError> {
        self.tables
            .get_mut(R::ENDPOINT)
            .and_then(|mut table| table.remove(&id))
            .map(|_| ())
            .ok_or_else(|| Self::not_found::<R>(id))
    }
}
