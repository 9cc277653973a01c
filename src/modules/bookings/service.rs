//! Booking enrichment read path.
//!
//! Fetches a client's bookings newest first, resolves the properties they
//! reference with a single follow-up query, and joins the two in memory.
//! A property that cannot be found falls back to [`PropertySummary::unknown`];
//! a store failure at either stage is an error.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use staybook_db::{fetch, Filter, Order, Query, RecordStore, StoreError};
use thiserror::Error;

use super::models::{Booking, EnrichedBooking, Property, PropertySummary};

pub const BOOKINGS_TABLE: &str = "bookings";
pub const PROPERTIES_TABLE: &str = "properties";
const PROPERTY_COLUMNS: [&str; 4] = ["id", "name", "location", "images"];

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("client_id is required")]
    MissingClientId,

    #[error("bookings fetch failed: {0}")]
    BookingsFetch(#[source] StoreError),

    #[error("properties fetch failed: {0}")]
    PropertiesFetch(#[source] StoreError),
}

impl EnrichError {
    /// Short tag naming the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            EnrichError::MissingClientId => "invalid input",
            EnrichError::BookingsFetch(_) => "bookings fetch failed",
            EnrichError::PropertiesFetch(_) => "properties fetch failed",
        }
    }
}

/// Query for every booking of `client_id`, most recent first.
pub fn bookings_query(client_id: &str) -> Query {
    Query::table(BOOKINGS_TABLE)
        .filter(Filter::eq("client_id", client_id))
        .order(Order::desc("created_at"))
}

/// Query for the booking projection of the given properties.
pub fn properties_query<'a, I>(property_ids: I) -> Query
where
    I: IntoIterator<Item = &'a str>,
{
    Query::table(PROPERTIES_TABLE)
        .select(PROPERTY_COLUMNS)
        .filter(Filter::in_list("id", property_ids))
}

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn RecordStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Bookings of `client_id`, newest first, each with its property attached.
    #[tracing::instrument(skip(self))]
    pub async fn enrich_bookings(
        &self,
        client_id: &str,
    ) -> Result<Vec<EnrichedBooking>, EnrichError> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(EnrichError::MissingClientId);
        }

        let bookings: Vec<Booking> = fetch(self.store.as_ref(), &bookings_query(client_id))
            .await
            .map_err(EnrichError::BookingsFetch)?;

        if bookings.is_empty() {
            tracing::debug!("client has no bookings");
            return Ok(Vec::new());
        }

        let property_ids: BTreeSet<&str> = bookings
            .iter()
            .filter_map(|b| b.property_id.as_deref())
            .collect();

        let mut lookup: HashMap<String, PropertySummary> = HashMap::new();
        if !property_ids.is_empty() {
            let properties: Vec<Property> = fetch(
                self.store.as_ref(),
                &properties_query(property_ids.iter().copied()),
            )
            .await
            .map_err(EnrichError::PropertiesFetch)?;

            lookup.extend(properties.into_iter().map(|p| (p.id.clone(), p.into())));
        }

        let unresolved = property_ids
            .iter()
            .filter(|id| !lookup.contains_key(**id))
            .count();

        tracing::info!(
            bookings = bookings.len(),
            properties = lookup.len(),
            unresolved,
            "bookings enriched"
        );

        let enriched = bookings
            .into_iter()
            .map(|booking| {
                let properties = booking
                    .property_id
                    .as_deref()
                    .and_then(|id| lookup.get(id))
                    .cloned()
                    .unwrap_or_else(PropertySummary::unknown);
                EnrichedBooking::new(booking, properties)
            })
            .collect();

        Ok(enriched)
    }
}
