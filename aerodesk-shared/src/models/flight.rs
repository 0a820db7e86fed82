use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fare tier on a flight with its own capacity.
///
/// `status == false` means the class is closed for booking. It is forced
/// closed whenever `booked_seats == count`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatClass {
    pub class_label: String,
    pub count: i32,
    pub booked_seats: i32,
    pub status: bool,
}

impl SeatClass {
    pub fn new(class_label: impl Into<String>, count: i32) -> Self {
        Self {
            class_label: class_label.into(),
            count,
            booked_seats: 0,
            status: count > 0,
        }
    }

    pub fn available(&self) -> i32 {
        self.count - self.booked_seats
    }

    pub fn is_full(&self) -> bool {
        self.booked_seats >= self.count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitStop {
    pub airport: Uuid,
    pub duration_minutes: i64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Rule names a flight is regulated by, one per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FlightRules {
    pub flight_time: Option<String>,
    pub intermediate: Option<String>,
    pub ticket_class: Option<String>,
    pub booking_window: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    /// Route grouping key shared by schedule variants, e.g. `HAN-SGN`.
    pub flight_code: String,
    pub departure_airport: Uuid,
    pub destination_airport: Uuid,
    pub departure_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub seat_classes: Vec<SeatClass>,
    /// Base fare in minor currency units.
    pub ticket_price: i64,
    pub transit_stops: Vec<TransitStop>,
    pub rules: FlightRules,
    /// Bumped on every write; conditional updates are keyed on it.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flight {
    pub fn seat_class(&self, class_label: &str) -> Option<&SeatClass> {
        self.seat_classes
            .iter()
            .find(|class| class.class_label == class_label)
    }

    pub fn arrival_time(&self) -> DateTime<Utc> {
        self.departure_time + Duration::minutes(self.duration_minutes)
    }

    pub fn total_seats(&self) -> i32 {
        self.seat_classes.iter().map(|class| class.count).sum()
    }

    pub fn booked_seats(&self) -> i32 {
        self.seat_classes.iter().map(|class| class.booked_seats).sum()
    }

    /// `<departure>-<destination>` route code, e.g. `HAN-SGN`.
    pub fn route_code(departure_code: &str, destination_code: &str) -> String {
        format!(
            "{}-{}",
            departure_code.trim().to_uppercase(),
            destination_code.trim().to_uppercase()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatClassDraft {
    pub class_label: String,
    pub count: i32,
}

/// Candidate flight definition submitted for creation or update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightDraft {
    pub flight_number: String,
    #[serde(default)]
    pub flight_code: Option<String>,
    pub departure_airport: Uuid,
    pub destination_airport: Uuid,
    pub departure_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub seat_classes: Vec<SeatClassDraft>,
    pub ticket_price: i64,
    #[serde(default)]
    pub transit_stops: Vec<TransitStop>,
    #[serde(default)]
    pub rules: FlightRules,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_code_is_normalised() {
        assert_eq!(Flight::route_code("han", " sgn "), "HAN-SGN");
    }

    #[test]
    fn test_new_seat_class_is_open_unless_empty() {
        assert!(SeatClass::new("1", 10).status);
        assert!(!SeatClass::new("2", 0).status);
        assert!(SeatClass::new("2", 0).is_full());
    }

    #[test]
    fn test_draft_defaults() {
        let json = r#"
            {
                "flight_number": "VN210",
                "departure_airport": "6f1c2f5e-7b77-4a55-9a71-0f3f1f0a1a01",
                "destination_airport": "6f1c2f5e-7b77-4a55-9a71-0f3f1f0a1a02",
                "departure_time": "2024-06-10T08:00:00Z",
                "duration_minutes": 125,
                "seat_classes": [{ "class_label": "1", "count": 20 }],
                "ticket_price": 1500000
            }
        "#;
        let draft: FlightDraft = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(draft.transit_stops.is_empty());
        assert_eq!(draft.rules, FlightRules::default());
        assert!(draft.flight_code.is_none());
    }
}
