pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use staybook_db::RecordStore;
use staybook_kernel::{InitCtx, Module};

use service::BookingService;

/// Bookings module: the client booking history with property details
pub struct BookingsModule {
    service: BookingService,
}

impl BookingsModule {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            service: BookingService::new(store),
        }
    }

    pub fn service(&self) -> &BookingService {
        &self.service
    }
}

#[async_trait]
impl Module for BookingsModule {
    fn name(&self) -> &'static str {
        "bookings"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            store = %ctx.settings.store.url,
            "bookings module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List a client's bookings with property details",
                        "tags": ["Bookings"],
                        "parameters": [
                            {
                                "name": "client_id",
                                "in": "query",
                                "required": true,
                                "description": "Client whose bookings are listed (alias: clientId)",
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Bookings, most recent first",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookingList"
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing or empty client_id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            },
                            "500": {
                                "description": "Bookings or properties fetch failed",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Bookings health check",
                        "tags": ["Bookings"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "PropertySummary": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "location": { "type": "string" },
                            "images": {
                                "type": "array",
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["name", "location", "images"]
                    },
                    "EnrichedBooking": {
                        "type": "object",
                        "description": "Booking row with every stored column plus the embedded property",
                        "properties": {
                            "id": { "type": "string" },
                            "client_id": { "type": "string" },
                            "property_id": { "type": ["string", "null"] },
                            "created_at": { "type": "string" },
                            "properties": { "$ref": "#/components/schemas/PropertySummary" }
                        },
                        "required": ["id", "client_id", "created_at", "properties"],
                        "additionalProperties": true
                    },
                    "BookingList": {
                        "type": "object",
                        "properties": {
                            "data": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/EnrichedBooking" }
                            }
                        },
                        "required": ["data"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "bookings module stopped");
        Ok(())
    }
}

/// Create a new instance of the bookings module
pub fn create_module(store: Arc<dyn RecordStore>) -> Arc<dyn Module> {
    Arc::new(BookingsModule::new(store))
}
