use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use staybook_app::build_registry;
use staybook_db::MemoryStore;
use staybook_kernel::settings::Settings;
use tower::ServiceExt;

fn store() -> MemoryStore {
    MemoryStore::new()
        .with_table(
            "bookings",
            vec![
                json!({
                    "id": "b2", "client_id": "c1", "property_id": "p9",
                    "created_at": "2024-01-01", "status": "cancelled"
                }),
                json!({
                    "id": "b1", "client_id": "c1", "property_id": "p1",
                    "created_at": "2024-01-02", "status": "confirmed",
                    "start_date": "2024-07-01", "end_date": "2024-07-08", "total_price": 840
                }),
            ],
        )
        .with_table(
            "properties",
            vec![json!({
                "id": "p1", "name": "Cabane", "location": "Vercors",
                "images": ["p1/a.jpg", "p1/b.jpg"], "owner_id": "o1"
            })],
        )
}

async fn call(store: MemoryStore, uri: &str) -> (StatusCode, Value) {
    let registry = build_registry(Arc::new(store)).unwrap();
    let router = staybook_http::build_router(&registry, &Settings::default());

    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn enriched_bookings_over_http() {
    let (status, body) = call(store(), "/api/bookings?client_id=c1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "data": [
                {
                    "id": "b1",
                    "client_id": "c1",
                    "property_id": "p1",
                    "created_at": "2024-01-02",
                    "status": "confirmed",
                    "start_date": "2024-07-01",
                    "end_date": "2024-07-08",
                    "total_price": 840,
                    "properties": {
                        "name": "Cabane",
                        "location": "Vercors",
                        "images": ["p1/a.jpg", "p1/b.jpg"]
                    }
                },
                {
                    "id": "b2",
                    "client_id": "c1",
                    "property_id": "p9",
                    "created_at": "2024-01-01",
                    "status": "cancelled",
                    "properties": {
                        "name": "Propriété inconnue",
                        "location": "Localisation inconnue",
                        "images": []
                    }
                }
            ]
        })
    );
}

#[tokio::test]
async fn missing_client_id_is_rejected_without_store_access() {
    let store = store();
    let (status, body) = call(store.clone(), "/api/bookings").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn property_store_outage_is_not_masked() {
    let store = store().failing("properties", "upstream timeout");
    let (status, body) = call(store, "/api/bookings?clientId=c1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "properties_fetch_failed");
}

#[tokio::test]
async fn module_is_documented() {
    let (status, body) = call(store(), "/docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/bookings"]["get"].is_object());
    assert!(body["components"]["schemas"]["EnrichedBooking"].is_object());
}
