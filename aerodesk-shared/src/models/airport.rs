use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Airport master record, owned by the admin tooling. The engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airport {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub country: String,
    pub address: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_terminal_count")]
    pub terminal_count: i32,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub international: bool,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Soft-disable flag; airports are never hard-deleted.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_terminal_count() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

/// What flight validation and route codes need from an airport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AirportSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub country: String,
    pub address: String,
}

impl From<&Airport> for AirportSummary {
    fn from(airport: &Airport) -> Self {
        Self {
            id: airport.id,
            code: airport.code.clone(),
            name: airport.name.clone(),
            country: airport.country.clone(),
            address: airport.address.clone(),
        }
    }
}
