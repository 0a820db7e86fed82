use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReservationBookedEvent {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub seat_class: String,
    pub price: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReservationCancelledEvent {
    pub request_id: Uuid,
    pub flight_id: Uuid,
    pub seat_class: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReservationPaidEvent {
    pub request_id: Uuid,
    pub settled_id: Uuid,
    pub flight_id: Uuid,
    pub price: i64,
    pub timestamp: i64,
}

/// Lifecycle transitions, broadcast after they are persisted.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationEvent {
    Booked(ReservationBookedEvent),
    Cancelled(ReservationCancelledEvent),
    Paid(ReservationPaidEvent),
}

impl ReservationEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            ReservationEvent::Booked(e) => e.request_id,
            ReservationEvent::Cancelled(e) => e.request_id,
            ReservationEvent::Paid(e) => e.request_id,
        }
    }
}
