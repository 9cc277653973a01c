//! HTTP client for the hosted REST record store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::{Query, RecordStore, StoreError};

const REST_PREFIX: &str = "rest/v1";

/// Connection parameters for [`RestStore`].
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Record store reached over HTTP with PostgREST-style query strings.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let apikey = HeaderValue::from_str(key)
                .map_err(|e| StoreError::Config(format!("api key is not a valid header: {e}")))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StoreError::Config(format!("api key is not a valid header: {e}")))?;
            headers.insert("apikey", apikey);
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, table)
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select(&self, query: &Query) -> Result<Vec<serde_json::Value>, StoreError> {
        let table = query.table_name();
        let params = query.to_params();

        tracing::debug!(table, ?params, "querying record store");

        let transport = |source: reqwest::Error| StoreError::Transport {
            table: table.to_string(),
            source,
        };

        let response = self
            .client
            .get(self.table_url(table))
            .query(&params)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::warn!(table, status = status.as_u16(), %message, "record store query rejected");
            return Err(StoreError::Status {
                table: table.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|source| StoreError::Decode {
            table: table.to_string(),
            source,
        })
    }
}

/// Pull the human-readable message out of an error body, falling back to the
/// raw text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Filter, Order};
    use axum::{
        extract::RawQuery,
        http::{HeaderMap as AxumHeaders, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn store(base_url: String, api_key: Option<&str>) -> RestStore {
        RestStore::new(RestStoreConfig {
            base_url,
            api_key: api_key.map(String::from),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn select_sends_encoded_query_and_key() {
        let router = Router::new().route(
            "/rest/v1/bookings",
            get(|RawQuery(raw): RawQuery, headers: AxumHeaders| async move {
                Json(json!([{
                    "query": raw.unwrap_or_default(),
                    "apikey": headers.get("apikey").and_then(|v| v.to_str().ok()),
                    "auth": headers.get("authorization").and_then(|v| v.to_str().ok()),
                }]))
            }),
        );
        let base = spawn(router).await;

        let query = Query::table("bookings")
            .filter(Filter::eq("client_id", "c1"))
            .order(Order::desc("created_at"));
        let rows = store(base, Some("secret")).select(&query).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0]["query"],
            "select=*&client_id=eq.c1&order=created_at.desc"
        );
        assert_eq!(rows[0]["apikey"], "secret");
        assert_eq!(rows[0]["auth"], "Bearer secret");
    }

    #[tokio::test]
    async fn empty_array_is_an_empty_result() {
        let router = Router::new().route("/rest/v1/properties", get(|| async { Json(json!([])) }));
        let base = spawn(router).await;

        let rows = store(base, None)
            .select(&Query::table("properties"))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_not_coerced_to_empty() {
        let router = Router::new().route(
            "/rest/v1/properties",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"code": "42703", "message": "column properties.nope does not exist"})),
                )
            }),
        );
        let base = spawn(router).await;

        let err = store(base, None)
            .select(&Query::table("properties"))
            .await
            .unwrap_err();
        match err {
            StoreError::Status {
                table,
                status,
                message,
            } => {
                assert_eq!(table, "properties");
                assert_eq!(status, 400);
                assert_eq!(message, "column properties.nope does not exist");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_array_payload_is_a_decode_error() {
        let router = Router::new().route(
            "/rest/v1/bookings",
            get(|| async { Json(json!({"unexpected": true})) }),
        );
        let base = spawn(router).await;

        let err = store(base, None)
            .select(&Query::table("bookings"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = store(format!("http://{addr}"), None)
            .select(&Query::table("bookings"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transport { ref table, .. } if table == "bookings"));
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        assert_eq!(error_message(b"  upstream down \n"), "upstream down");
        assert_eq!(error_message(br#"{"message":"nope"}"#), "nope");
    }
}
