use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use staybook_http::error::AppError;

use super::models::EnrichedBooking;
use super::service::{BookingService, EnrichError};

/// Query string accepted by the bookings listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsParams {
    #[serde(default, alias = "clientId")]
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListBookingsResponse {
    pub data: Vec<EnrichedBooking>,
}

impl From<EnrichError> for AppError {
    fn from(err: EnrichError) -> Self {
        match &err {
            EnrichError::MissingClientId => AppError::bad_request(err.to_string()),
            EnrichError::BookingsFetch(source) => {
                AppError::upstream("bookings_fetch_failed", err.stage(), source.to_string())
            }
            EnrichError::PropertiesFetch(source) => {
                AppError::upstream("properties_fetch_failed", err.stage(), source.to_string())
            }
        }
    }
}

/// Routes mounted under `/api/bookings`.
pub fn router(service: BookingService) -> Router {
    Router::new()
        .route("/", get(list_bookings))
        .route("/health", get(health_check))
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "bookings module is healthy"
}

/// List a client's bookings with their properties attached
async fn list_bookings(
    State(service): State<BookingService>,
    params: Result<Query<ListBookingsParams>, QueryRejection>,
) -> Result<Json<ListBookingsResponse>, AppError> {
    let Query(params) =
        params.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let client_id = params.client_id.unwrap_or_default();
    let data = service.enrich_bookings(&client_id).await?;
    Ok(Json(ListBookingsResponse { data }))
}
