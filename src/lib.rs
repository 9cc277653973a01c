//! Staybook application library
//!
//! Wires the application modules onto the kernel, store, and HTTP crates.

use std::sync::Arc;

use anyhow::Context;
use staybook_db::{RecordStore, RestStore};
use staybook_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

pub use modules::bookings::{
    models::{Booking, EnrichedBooking, Property, PropertySummary},
    service::{BookingService, EnrichError},
};

/// Connect to the record store described by `settings`.
pub fn connect_store(settings: &Settings) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store = RestStore::new(settings.store.rest_config())
        .with_context(|| format!("failed to configure store client for {}", settings.store.url))?;
    Ok(Arc::new(store))
}

/// Build a registry holding every application module.
pub fn build_registry(store: Arc<dyn RecordStore>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store)?;
    Ok(registry)
}

/// Run the HTTP service until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let store = connect_store(settings)?;
    let registry = build_registry(store)?;
    let ctx = InitCtx { settings };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served =
        staybook_http::start_server(&registry, settings, staybook_http::shutdown_signal()).await;

    registry.stop_all().await?;
    served
}
