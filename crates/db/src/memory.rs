//! In-process record store.
//!
//! Evaluates the same [`Query`] shape as the REST backend over JSON rows held
//! in memory, keeps a journal of every query it answered, and can be told to
//! fail reads against a table.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::{Filter, Query, RecordStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    failing: HashMap<String, String>,
    journal: Vec<Query>,
}

/// Cloneable in-memory store; clones share the same tables and journal.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows of `table`.
    pub fn with_table(self, table: impl Into<String>, rows: Vec<Value>) -> Self {
        self.lock().tables.insert(table.into(), rows);
        self
    }

    /// Make every read against `table` fail with `message`.
    pub fn failing(self, table: impl Into<String>, message: impl Into<String>) -> Self {
        self.lock().failing.insert(table.into(), message.into());
        self
    }

    /// Queries answered (or rejected) so far, oldest first.
    pub fn journal(&self) -> Vec<Query> {
        self.lock().journal.clone()
    }

    /// Queries issued against `table`.
    pub fn queries_for(&self, table: &str) -> Vec<Query> {
        self.lock()
            .journal
            .iter()
            .filter(|q| q.table_name() == table)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned journal is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut inner = self.lock();
        inner.journal.push(query.clone());

        if let Some(message) = inner.failing.get(query.table_name()) {
            return Err(StoreError::Unavailable(message.clone()));
        }

        let rows = inner
            .tables
            .get(query.table_name())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut matched: Vec<Value> = rows
            .iter()
            .filter(|row| query.filters().iter().all(|f| matches(row, f)))
            .cloned()
            .collect();

        if let Some(order) = query.ordering() {
            // Stable sort keeps insertion order between equal keys.
            matched.sort_by(|a, b| {
                let ord = compare(&a[&order.column], &b[&order.column]);
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        if !query.columns().is_empty() {
            matched = matched
                .into_iter()
                .map(|row| project(row, query.columns()))
                .collect();
        }

        Ok(matched)
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let Some(cell) = as_text(&row[filter.column()]) else {
        return false;
    };
    match filter {
        Filter::Eq { value, .. } => &cell == value,
        Filter::In { values, .. } => values.contains(&cell),
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => as_text(a).cmp(&as_text(b)),
    }
}

fn project(row: Value, columns: &[String]) -> Value {
    match row {
        Value::Object(mut map) => {
            let projected = columns
                .iter()
                .filter_map(|c| map.remove(c).map(|v| (c.clone(), v)))
                .collect();
            Value::Object(projected)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Order;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new().with_table(
            "bookings",
            vec![
                json!({"id": "b1", "client_id": "c1", "created_at": "2024-01-01"}),
                json!({"id": "b2", "client_id": "c2", "created_at": "2024-01-03"}),
                json!({"id": "b3", "client_id": "c1", "created_at": "2024-01-02"}),
            ],
        )
    }

    fn ids(rows: &[Value]) -> Vec<&str> {
        rows.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn eq_filter_and_order() {
        let rows = store()
            .select(
                &Query::table("bookings")
                    .filter(Filter::eq("client_id", "c1"))
                    .order(Order::desc("created_at")),
            )
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec!["b3", "b1"]);
    }

    #[tokio::test]
    async fn in_filter_and_projection() {
        let rows = store()
            .select(
                &Query::table("bookings")
                    .select(["id"])
                    .filter(Filter::in_list("id", ["b2", "missing"])),
            )
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({"id": "b2"})]);
    }

    #[tokio::test]
    async fn unknown_table_is_empty() {
        let rows = store().select(&Query::table("nothing")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn failing_table_errors_and_is_journaled() {
        let store = store().failing("bookings", "connection refused");
        let err = store.select(&Query::table("bookings")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref m) if m == "connection refused"));
        assert_eq!(store.queries_for("bookings").len(), 1);
    }

    #[tokio::test]
    async fn clones_share_journal() {
        let store = store();
        let clone = store.clone();
        clone.select(&Query::table("bookings")).await.unwrap();
        assert_eq!(store.journal().len(), 1);
    }
}
