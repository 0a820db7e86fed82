use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::pii::Masked;

/// Booked → Cancelled | Paid. Both outcomes are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Booked,
    Cancelled,
    Paid,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Booked => "BOOKED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Paid => "PAID",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Booked)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOKED" => Ok(ReservationStatus::Booked),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            "PAID" => Ok(ReservationStatus::Paid),
            other => Err(format!("unknown reservation status: {}", other)),
        }
    }
}

/// A provisional ticket, created by booking and awaiting payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub seat_class: String,
    pub passenger_name: String,
    pub identification_number: Masked<String>,
    pub phone_number: Masked<String>,
    pub price: i64,
    pub booked_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        flight_id: Uuid,
        seat_class: String,
        passenger_name: String,
        identification_number: String,
        phone_number: String,
        price: i64,
        booked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            flight_id,
            seat_class,
            passenger_name,
            identification_number: Masked(identification_number),
            phone_number: Masked(phone_number),
            price,
            booked_at,
            status: ReservationStatus::Booked,
            updated_at: booked_at,
        }
    }
}

/// Finalized record of a paid ticket; the input of revenue reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettledReservation {
    pub id: Uuid,
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub seat_class: String,
    pub passenger_name: String,
    pub identification_number: Masked<String>,
    pub price: i64,
    pub booked_at: DateTime<Utc>,
    pub settled_at: DateTime<Utc>,
}

impl SettledReservation {
    pub fn from_request(request: &ReservationRequest, settled_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id: request.id,
            user_id: request.user_id,
            flight_id: request.flight_id,
            seat_class: request.seat_class.clone(),
            passenger_name: request.passenger_name.clone(),
            identification_number: request.identification_number.clone(),
            price: request.price,
            booked_at: request.booked_at,
            settled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            ReservationStatus::Booked,
            ReservationStatus::Cancelled,
            ReservationStatus::Paid,
        ] {
            assert_eq!(status.as_str().parse::<ReservationStatus>(), Ok(status));
        }
        assert!("REFUNDED".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_settled_copies_commercial_fields() {
        let request = ReservationRequest::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "1".to_string(),
            "Nguyen Van A".to_string(),
            "001099012345".to_string(),
            "0912345678".to_string(),
            1_800_000,
            Utc::now(),
        );
        let settled = SettledReservation::from_request(&request, Utc::now());

        assert_eq!(settled.request_id, request.id);
        assert_eq!(settled.flight_id, request.flight_id);
        assert_eq!(settled.price, 1_800_000);
        assert_eq!(settled.identification_number.expose(), "001099012345");
        assert!(!format!("{:?}", settled).contains("001099012345"));
    }
}
