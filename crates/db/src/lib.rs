//! Record store client for Staybook.
//!
//! The application never talks to a database directly: rows live in a remote
//! store reached through simple request/response calls. [`RecordStore`] is the
//! seam; [`RestStore`] speaks to the hosted REST endpoint and [`MemoryStore`]
//! backs tests and local fixtures.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub mod error;
pub mod memory;
pub mod query;
pub mod rest;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use query::{Filter, Order, Query};
pub use rest::{RestStore, RestStoreConfig};

/// Read access to a remote table store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run a read query and return the raw JSON rows.
    ///
    /// An empty vector means the query succeeded and matched nothing; any
    /// failure to reach or query the store is reported as an error.
    async fn select(&self, query: &Query) -> Result<Vec<serde_json::Value>, StoreError>;
}

/// Run `query` against `store` and deserialize each row into `T`.
pub async fn fetch<T>(store: &dyn RecordStore, query: &Query) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
{
    let rows = store.select(query).await?;
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|source| StoreError::Decode {
                table: query.table_name().to_string(),
                source,
            })
        })
        .collect()
}
