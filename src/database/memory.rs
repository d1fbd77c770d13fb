use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::store::{Collection, Query, Store, Transaction};
use super::DatabaseError;

type Tables = HashMap<Collection, Vec<(Uuid, Value)>>;

/// In-process document store. A transaction holds the store lock for its
/// whole lifetime and works on a private copy that replaces the shared
/// tables on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DatabaseError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl MemoryTransaction {
    fn table(&mut self, collection: Collection) -> &mut Vec<(Uuid, Value)> {
        self.working.entry(collection).or_default()
    }

    fn select<'a>(&'a mut self, collection: Collection, query: &Query) -> Vec<&'a Value> {
        let mut docs: Vec<&Value> = self
            .table(collection)
            .iter()
            .filter(|(id, doc)| {
                query.exclude_id != Some(*id)
                    && contains(doc, &query.filter)
                    && query.search.as_ref().map_or(true, |search| {
                        let needle = search.term.to_lowercase();
                        search.fields.iter().any(|field| {
                            doc.get(*field)
                                .and_then(Value::as_str)
                                .map_or(false, |text| text.to_lowercase().contains(&needle))
                        })
                    })
            })
            .map(|(_, doc)| doc)
            .collect();

        if let Some(sort) = query.sort {
            docs.sort_by(|a, b| {
                let ordering = compare(a.get(sort.field), b.get(sort.field));
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        docs
    }

    fn doc_mut(&mut self, collection: Collection, id: Uuid) -> Option<&mut Value> {
        self.table(collection)
            .iter_mut()
            .find(|(doc_id, _)| *doc_id == id)
            .map(|(_, doc)| doc)
    }
}

/// Containment with the same semantics as Postgres `jsonb @>`.
pub(crate) fn contains(doc: &Value, pattern: &Value) -> bool {
    match (doc, pattern) {
        (Value::Object(doc), Value::Object(pattern)) => pattern
            .iter()
            .all(|(key, expected)| doc.get(key).map_or(false, |actual| contains(actual, expected))),
        (Value::Array(doc), Value::Array(pattern)) => pattern
            .iter()
            .all(|expected| doc.iter().any(|actual| contains(actual, expected))),
        (Value::Array(doc), scalar) if !scalar.is_object() => doc.iter().any(|actual| actual == scalar),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (doc, pattern) => doc == pattern,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn id_array<'a>(doc: &'a mut Value, field: &str) -> Option<&'a mut Vec<Value>> {
    let map = doc.as_object_mut()?;
    let entry = map.entry(field.to_string()).or_insert_with(|| Value::Array(Vec::new()));
    entry.as_array_mut()
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn find(&mut self, collection: Collection, id: Uuid) -> Result<Option<Value>, DatabaseError> {
        Ok(self.doc_mut(collection, id).map(|doc| doc.clone()))
    }

    async fn find_many(&mut self, collection: Collection, query: &Query) -> Result<Vec<Value>, DatabaseError> {
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self
            .select(collection, query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&mut self, collection: Collection, query: &Query) -> Result<u64, DatabaseError> {
        Ok(self.select(collection, query).len() as u64)
    }

    async fn insert(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<(), DatabaseError> {
        let table = self.table(collection);
        if table.iter().any(|(existing, _)| *existing == id) {
            return Err(DatabaseError::Duplicate(format!("{} already contains {}", collection.table_name(), id)));
        }
        if collection == Collection::Users {
            let email = doc.get("email").and_then(Value::as_str).map(str::to_lowercase);
            let taken = table.iter().any(|(_, other)| {
                other.get("email").and_then(Value::as_str).map(str::to_lowercase) == email
            });
            if taken {
                return Err(DatabaseError::Duplicate("users already contains this value".to_string()));
            }
        }
        table.push((id, doc));
        Ok(())
    }

    async fn replace(&mut self, collection: Collection, id: Uuid, doc: Value) -> Result<bool, DatabaseError> {
        match self.doc_mut(collection, id) {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&mut self, collection: Collection, id: Uuid) -> Result<bool, DatabaseError> {
        let table = self.table(collection);
        let before = table.len();
        table.retain(|(doc_id, _)| *doc_id != id);
        Ok(table.len() < before)
    }

    async fn push_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError> {
        let child = Value::String(child.to_string());
        match self.doc_mut(collection, id).and_then(|doc| id_array(doc, field)) {
            Some(ids) => {
                ids.retain(|existing| *existing != child);
                ids.push(child);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_ref(
        &mut self,
        collection: Collection,
        id: Uuid,
        field: &'static str,
        child: Uuid,
    ) -> Result<bool, DatabaseError> {
        let child = Value::String(child.to_string());
        match self.doc_mut(collection, id).and_then(|doc| id_array(doc, field)) {
            Some(ids) => {
                ids.retain(|existing| *existing != child);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_ref_everywhere(
        &mut self,
        collection: Collection,
        field: &'static str,
        child: Uuid,
    ) -> Result<u64, DatabaseError> {
        let child = Value::String(child.to_string());
        let mut touched = 0;
        for (_, doc) in self.table(collection).iter_mut() {
            if let Some(ids) = doc.get_mut(field).and_then(Value::as_array_mut) {
                let before = ids.len();
                ids.retain(|existing| *existing != child);
                if ids.len() < before {
                    touched += 1;
                }
            }
        }
        Ok(touched)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}
