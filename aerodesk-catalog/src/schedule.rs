use aerodesk_core::CoreError;
use aerodesk_shared::FlightDraft;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::rules::{FlightTimeRule, IntermediateRule};

/// Why a proposed flight was rejected. The message is shown to the admin as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleViolation {
    #[error("flight number must not be empty")]
    EmptyFlightNumber,

    #[error("flight duration must be positive")]
    NonPositiveDuration,

    #[error("departure and destination airports must differ")]
    SameAirports,

    #[error("ticket price must not be negative")]
    NegativePrice,

    #[error("a flight needs at least one seat class")]
    NoSeatClasses,

    #[error("seat class label must not be empty")]
    EmptyClassLabel,

    #[error("duplicate seat class {0}")]
    DuplicateSeatClass(String),

    #[error("seat class {0} cannot have a negative seat count")]
    NegativeSeatCount(String),

    #[error("stop at {0} cannot have a negative duration")]
    NegativeStopDuration(String),

    #[error("minimum flight time must be {min} minutes")]
    FlightTooShort { min: i64, actual: i64 },

    #[error("only a maximum of {max} intermediary airports")]
    TooManyStops { max: usize, actual: usize },

    #[error("stop at {airport} must last at least {min} minutes")]
    StopTooShort { airport: String, min: i64 },

    #[error("stop at {airport} must last at most {max} minutes")]
    StopTooLong { airport: String, max: i64 },
}

impl From<ScheduleViolation> for CoreError {
    fn from(err: ScheduleViolation) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

pub struct ScheduleValidator<'a> {
    flight_time: &'a FlightTimeRule,
    intermediate: &'a IntermediateRule,
}

impl<'a> ScheduleValidator<'a> {
    pub fn new(flight_time: &'a FlightTimeRule, intermediate: &'a IntermediateRule) -> Self {
        Self {
            flight_time,
            intermediate,
        }
    }

    /// Returns the first violation found. `airport_names` maps transit airport
    /// ids to display names; unknown ids are reported by id.
    pub fn validate(
        &self,
        draft: &FlightDraft,
        airport_names: &HashMap<Uuid, String>,
    ) -> Result<(), ScheduleViolation> {
        self.check_structure(draft, airport_names)?;

        if let Some(min) = self.flight_time.min_flight_time {
            if draft.duration_minutes < min {
                return Err(ScheduleViolation::FlightTooShort {
                    min,
                    actual: draft.duration_minutes,
                });
            }
        }

        if let Some(max) = self.intermediate.max_transit_airports {
            if draft.transit_stops.len() > max {
                return Err(ScheduleViolation::TooManyStops {
                    max,
                    actual: draft.transit_stops.len(),
                });
            }
        }

        for stop in &draft.transit_stops {
            if let Some(min) = self.intermediate.min_stop {
                if stop.duration_minutes < min {
                    return Err(ScheduleViolation::StopTooShort {
                        airport: display_name(airport_names, stop.airport),
                        min,
                    });
                }
            }
            if let Some(max) = self.intermediate.max_stop {
                if stop.duration_minutes > max {
                    return Err(ScheduleViolation::StopTooLong {
                        airport: display_name(airport_names, stop.airport),
                        max,
                    });
                }
            }
        }

        Ok(())
    }

    fn check_structure(
        &self,
        draft: &FlightDraft,
        airport_names: &HashMap<Uuid, String>,
    ) -> Result<(), ScheduleViolation> {
        if draft.flight_number.trim().is_empty() {
            return Err(ScheduleViolation::EmptyFlightNumber);
        }
        if draft.duration_minutes <= 0 {
            return Err(ScheduleViolation::NonPositiveDuration);
        }
        if draft.departure_airport == draft.destination_airport {
            return Err(ScheduleViolation::SameAirports);
        }
        if draft.ticket_price < 0 {
            return Err(ScheduleViolation::NegativePrice);
        }
        if draft.seat_classes.is_empty() {
            return Err(ScheduleViolation::NoSeatClasses);
        }

        let mut labels = HashSet::new();
        for class in &draft.seat_classes {
            if class.class_label.trim().is_empty() {
                return Err(ScheduleViolation::EmptyClassLabel);
            }
            if !labels.insert(class.class_label.as_str()) {
                return Err(ScheduleViolation::DuplicateSeatClass(class.class_label.clone()));
            }
            if class.count < 0 {
                return Err(ScheduleViolation::NegativeSeatCount(class.class_label.clone()));
            }
        }

        if let Some(stop) = draft.transit_stops.iter().find(|s| s.duration_minutes < 0) {
            return Err(ScheduleViolation::NegativeStopDuration(display_name(
                airport_names,
                stop.airport,
            )));
        }

        Ok(())
    }
}

fn display_name(airport_names: &HashMap<Uuid, String>, id: Uuid) -> String {
    airport_names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| id.to_string())
}
