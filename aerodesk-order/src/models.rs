use aerodesk_core::{CoreError, CoreResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking input. The caller is trusted to pass an existing, authorized user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub seat_class: String,
    pub passenger_name: String,
    pub identification_number: String,
    pub phone_number: String,
}

/// Partial overwrite of a reservation request. Absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationPatch {
    pub passenger_name: Option<String>,
    pub identification_number: Option<String>,
    pub phone_number: Option<String>,
    pub price: Option<i64>,
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        self.passenger_name.is_none()
            && self.identification_number.is_none()
            && self.phone_number.is_none()
            && self.price.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueRow {
    pub flight_code: String,
    pub number_of_tickets: i64,
    pub total_revenue: i64,
    /// Share of the period's revenue, two decimals, e.g. `"50.00"`.
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_tickets: i64,
    pub total_revenue: i64,
    pub rows: Vec<RevenueRow>,
}

/// Half-open `[start, end)` range of departure times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    pub fn month(year: i32, month: u32) -> CoreResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::ValidationError(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        let (next_year, next_month) = if month == 12 {
            (following(year)?, 1)
        } else {
            (year, month + 1)
        };
        Ok(Self {
            start: first_of(year, month)?,
            end: first_of(next_year, next_month)?,
        })
    }

    pub fn year(year: i32) -> CoreResult<Self> {
        Ok(Self {
            start: first_of(year, 1)?,
            end: first_of(following(year)?, 1)?,
        })
    }
}

fn out_of_range(year: i32) -> CoreError {
    CoreError::ValidationError(format!("year {} is out of range", year))
}

fn following(year: i32) -> CoreResult<i32> {
    year.checked_add(1).ok_or_else(|| out_of_range(year))
}

fn first_of(year: i32, month: u32) -> CoreResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| out_of_range(year))
}
