//! Object storage for the admin panel.
//!
//! The panel is generic over any registered model, so storage works with
//! `serde_json::Value` objects rather than typed rows. [`AdminStore`] is the
//! async boundary the HTTP handlers talk to; [`InMemoryStore`] is the
//! built-in implementation backing development servers and tests. A real
//! database backend would implement the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use backoffice_core::error::{BackofficeError, BackofficeResult};

/// Async CRUD operations on stored objects, keyed by model key
/// (`"app_label.model_name"`).
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Returns every stored object for a model.
    async fn list(&self, model_key: &str) -> BackofficeResult<Vec<Value>>;

    /// Fetches a single object by primary key.
    async fn get(&self, model_key: &str, pk: &str) -> BackofficeResult<Value>;

    /// Inserts a new object, assigning it an `id`, and returns it.
    async fn insert(&self, model_key: &str, object: Value) -> BackofficeResult<Value>;

    /// Applies the given fields to an existing object and returns the result.
    async fn update(&self, model_key: &str, pk: &str, patch: Value) -> BackofficeResult<Value>;

    /// Deletes an object. Returns `true` if it existed.
    async fn delete(&self, model_key: &str, pk: &str) -> BackofficeResult<bool>;

    /// Returns the number of stored objects for a model.
    async fn count(&self, model_key: &str) -> usize;
}

/// In-memory [`AdminStore`] holding JSON objects per model.
///
/// Primary keys are auto-assigned integers under the `"id"` field.
pub struct InMemoryStore {
    objects: RwLock<HashMap<String, Vec<Value>>>,
    next_ids: RwLock<HashMap<String, u64>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            next_ids: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store pre-loaded with objects per model key.
    ///
    /// Objects that already carry an `id` keep it; the id counter is
    /// advanced past the highest one seen.
    pub fn with_data(data: Vec<(&str, Vec<Value>)>) -> Self {
        let store = Self::new();
        {
            let mut objects = store.objects.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            let mut next_ids = store.next_ids.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            for (model_key, rows) in data {
                let max_id = rows
                    .iter()
                    .filter_map(|o| o.get("id").and_then(Value::as_u64))
                    .max()
                    .unwrap_or(0);
                next_ids.insert(model_key.to_string(), max_id + 1);
                objects.insert(model_key.to_string(), rows);
            }
        }
        store
    }

    fn pk_matches(object: &Value, pk: &str) -> bool {
        match object.get("id") {
            Some(Value::Number(n)) => n.to_string() == pk,
            Some(Value::String(s)) => s == pk,
            _ => false,
        }
    }
}

#[async_trait]
impl AdminStore for InMemoryStore {
    async fn list(&self, model_key: &str) -> BackofficeResult<Vec<Value>> {
        let objects = self
            .objects
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(objects.get(model_key).cloned().unwrap_or_default())
    }

    async fn get(&self, model_key: &str, pk: &str) -> BackofficeResult<Value> {
        let objects = self
            .objects
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        objects
            .get(model_key)
            .and_then(|rows| rows.iter().find(|o| Self::pk_matches(o, pk)))
            .cloned()
            .ok_or_else(|| BackofficeError::NotFound(format!("{model_key} object {pk}")))
    }

    async fn insert(&self, model_key: &str, object: Value) -> BackofficeResult<Value> {
        let Value::Object(mut fields) = object else {
            return Err(BackofficeError::BadRequest(
                "expected a JSON object".to_string(),
            ));
        };

        let mut next_ids = self
            .next_ids
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = next_ids.entry(model_key.to_string()).or_insert(1);
        fields.insert("id".to_string(), Value::from(*id));
        *id += 1;
        drop(next_ids);

        let stored = Value::Object(fields);
        let mut objects = self
            .objects
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        objects
            .entry(model_key.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, model_key: &str, pk: &str, patch: Value) -> BackofficeResult<Value> {
        let Value::Object(patch_fields) = patch else {
            return Err(BackofficeError::BadRequest(
                "expected a JSON object".to_string(),
            ));
        };

        let mut objects = self
            .objects
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let rows = objects
            .get_mut(model_key)
            .ok_or_else(|| BackofficeError::NotFound(format!("{model_key} object {pk}")))?;
        let row = rows
            .iter_mut()
            .find(|o| Self::pk_matches(o, pk))
            .ok_or_else(|| BackofficeError::NotFound(format!("{model_key} object {pk}")))?;

        if let Value::Object(fields) = row {
            for (name, value) in patch_fields {
                if name != "id" {
                    fields.insert(name, value);
                }
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, model_key: &str, pk: &str) -> BackofficeResult<bool> {
        let mut objects = self
            .objects
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(rows) = objects.get_mut(model_key) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|o| !Self::pk_matches(o, pk));
        Ok(rows.len() < before)
    }

    async fn count(&self, model_key: &str) -> usize {
        let objects = self
            .objects
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        objects.get(model_key).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = InMemoryStore::new();
        let first = store
            .insert("catalog.product", json!({"name": "Keyboard"}))
            .await
            .unwrap();
        let second = store
            .insert("catalog.product", json!({"name": "Mouse"}))
            .await
            .unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert_eq!(store.count("catalog.product").await, 2);
    }

    #[tokio::test]
    async fn test_get_by_pk() {
        let store = InMemoryStore::new();
        store
            .insert("sales.order", json!({"order_number": "ORD-1"}))
            .await
            .unwrap();
        let found = store.get("sales.order", "1").await.unwrap();
        assert_eq!(found["order_number"], "ORD-1");
        assert!(store.get("sales.order", "99").await.is_err());
        assert!(store.get("sales.invoice", "1").await.is_err());
    }

    #[tokio::test]
    async fn test_update_preserves_id() {
        let store = InMemoryStore::new();
        store
            .insert("sales.order", json!({"status": "pending"}))
            .await
            .unwrap();
        let updated = store
            .update("sales.order", "1", json!({"status": "shipped", "id": 42}))
            .await
            .unwrap();
        assert_eq!(updated["status"], "shipped");
        assert_eq!(updated["id"], 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        store.insert("sales.order", json!({})).await.unwrap();
        assert!(store.delete("sales.order", "1").await.unwrap());
        assert!(!store.delete("sales.order", "1").await.unwrap());
        assert_eq!(store.count("sales.order").await, 0);
    }

    #[tokio::test]
    async fn test_with_data_advances_id_counter() {
        let store = InMemoryStore::with_data(vec![(
            "catalog.product",
            vec![json!({"id": 7, "name": "Desk"})],
        )]);
        let inserted = store
            .insert("catalog.product", json!({"name": "Chair"}))
            .await
            .unwrap();
        assert_eq!(inserted["id"], 8);
    }

    #[tokio::test]
    async fn test_insert_rejects_non_object() {
        let store = InMemoryStore::new();
        assert!(store
            .insert("catalog.product", json!(["not", "an", "object"]))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_list_unknown_model_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.list("nope.model").await.unwrap().is_empty());
        assert_eq!(store.count("nope.model").await, 0);
    }
}
