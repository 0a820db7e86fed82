use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A named regulation record. `values` is keyed by convention
/// (`min_flight_time`, `max_transit_airports`, ...), not by schema; the typed
/// views live in `aerodesk-catalog::rules`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub detail: Option<String>,
    pub values: BTreeMap<String, f64>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(
        name: String,
        code: String,
        detail: Option<String>,
        values: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            code,
            detail,
            values,
            updated_at: Utc::now(),
        }
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}
