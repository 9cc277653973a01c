//! Errors surfaced by record store clients.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("store request to '{table}' failed: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    /// The store answered with a non-success status.
    #[error("store rejected query on '{table}' ({status}): {message}")]
    Status {
        table: String,
        status: u16,
        message: String,
    },

    /// The store answered, but not with rows we understand.
    #[error("unexpected payload from '{table}': {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid store configuration: {0}")]
    Config(String),
}
