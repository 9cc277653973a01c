use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Name shown for a booking whose property could not be resolved.
pub const UNKNOWN_PROPERTY_NAME: &str = "Propriété inconnue";
/// Location shown for a booking whose property could not be resolved.
pub const UNKNOWN_PROPERTY_LOCATION: &str = "Localisation inconnue";

/// A reservation row as stored in the `bookings` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier for the booking
    #[serde(deserialize_with = "key_as_string")]
    pub id: String,
    /// Client who made the booking
    #[serde(deserialize_with = "key_as_string")]
    pub client_id: String,
    /// Booked property; may be null or point at a deleted row
    #[serde(default, deserialize_with = "optional_key_as_string")]
    pub property_id: Option<String>,
    /// Creation timestamp as stored
    pub created_at: String,
    /// Remaining columns (dates, status, price, ...) carried through untouched
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A listing row from the `properties` table, restricted to the columns the
/// booking view needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Property {
    #[serde(deserialize_with = "key_as_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

/// The property projection embedded in an enriched booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySummary {
    pub name: String,
    pub location: String,
    pub images: Vec<String>,
}

impl PropertySummary {
    /// Placeholder used when the booked property cannot be found.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_PROPERTY_NAME.to_string(),
            location: UNKNOWN_PROPERTY_LOCATION.to_string(),
            images: Vec::new(),
        }
    }
}

impl From<Property> for PropertySummary {
    fn from(property: Property) -> Self {
        Self {
            name: property.name,
            location: property.location,
            images: property.images,
        }
    }
}

/// A booking with its property denormalized into `properties`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub properties: PropertySummary,
}

impl EnrichedBooking {
    pub fn new(mut booking: Booking, properties: PropertySummary) -> Self {
        // A stale embedded column would collide with the projection on output.
        booking.attributes.remove("properties");
        Self {
            booking,
            properties,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keys may be stored as text or as integers; both join as text.
fn optional_key_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or integer key, found {other}"
        ))),
    }
}

fn key_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_key_as_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("key must not be null"))
}
