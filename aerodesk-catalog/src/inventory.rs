use aerodesk_core::repository::FlightRepository;
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_shared::{Flight, SeatClass, SeatClassDraft};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("Seat class not found: {0}")]
    UnknownClass(String),

    #[error("No available seats in this class")]
    SoldOut,

    #[error("Seat class {0} is closed for booking")]
    Closed(String),

    #[error("No booked seats to release in class {0}")]
    NothingToRelease(String),

    #[error("Seat count must not be negative")]
    NegativeCount,

    #[error("Cannot set class {class} to {requested} seats: {booked} already booked")]
    BelowBooked {
        class: String,
        requested: i32,
        booked: i32,
    },

    #[error("Booked seats must be between 0 and {count}, got {requested}")]
    BookedOutOfRange { requested: i32, count: i32 },

    #[error("Cannot remove class {0}: it has booked seats")]
    ClassInUse(String),

    #[error("Flight {flight} kept changing; gave up after {attempts} attempts")]
    Contended { flight: Uuid, attempts: u32 },
}

impl From<InventoryError> for CoreError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::UnknownClass(class) => CoreError::not_found("Seat class", class),
            InventoryError::NegativeCount | InventoryError::BookedOutOfRange { .. } => {
                CoreError::ValidationError(err.to_string())
            }
            _ => CoreError::ConflictError(err.to_string()),
        }
    }
}

/// One change to a single seat class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatMutation {
    Reserve,
    Release,
    SetCapacity(i32),
    SetBooked(i32),
}

impl SeatMutation {
    pub fn apply(&self, classes: &mut [SeatClass], class_label: &str) -> Result<(), InventoryError> {
        let class = classes
            .iter_mut()
            .find(|c| c.class_label == class_label)
            .ok_or_else(|| InventoryError::UnknownClass(class_label.to_string()))?;

        match *self {
            SeatMutation::Reserve => {
                if class.is_full() {
                    return Err(InventoryError::SoldOut);
                }
                if !class.status {
                    return Err(InventoryError::Closed(class.class_label.clone()));
                }
                class.booked_seats += 1;
                if class.is_full() {
                    class.status = false;
                }
            }
            SeatMutation::Release => {
                if class.booked_seats <= 0 {
                    return Err(InventoryError::NothingToRelease(class.class_label.clone()));
                }
                // A class closed by filling up stays closed until capacity is set again.
                class.booked_seats -= 1;
            }
            SeatMutation::SetCapacity(count) => {
                if count < 0 {
                    return Err(InventoryError::NegativeCount);
                }
                if count < class.booked_seats {
                    return Err(InventoryError::BelowBooked {
                        class: class.class_label.clone(),
                        requested: count,
                        booked: class.booked_seats,
                    });
                }
                class.count = count;
                class.status = class.booked_seats < count;
            }
            SeatMutation::SetBooked(booked) => {
                if booked < 0 || booked > class.count {
                    return Err(InventoryError::BookedOutOfRange {
                        requested: booked,
                        count: class.count,
                    });
                }
                class.booked_seats = booked;
                class.status = booked < class.count;
            }
        }

        Ok(())
    }
}

/// Builds the seat classes of an updated flight, carrying booked counts over
/// by class label.
pub fn reconcile_seat_classes(
    existing: &[SeatClass],
    drafts: &[SeatClassDraft],
) -> Result<Vec<SeatClass>, InventoryError> {
    if let Some(removed) = existing
        .iter()
        .find(|c| c.booked_seats > 0 && !drafts.iter().any(|d| d.class_label == c.class_label))
    {
        return Err(InventoryError::ClassInUse(removed.class_label.clone()));
    }

    drafts
        .iter()
        .map(|draft| {
            let booked = existing
                .iter()
                .find(|c| c.class_label == draft.class_label)
                .map(|c| c.booked_seats)
                .unwrap_or(0);
            if draft.count < booked {
                return Err(InventoryError::BelowBooked {
                    class: draft.class_label.clone(),
                    requested: draft.count,
                    booked,
                });
            }
            Ok(SeatClass {
                class_label: draft.class_label.clone(),
                count: draft.count,
                booked_seats: booked,
                status: booked < draft.count,
            })
        })
        .collect()
}

/// Seat counts of a flight, mutated through version-checked writes of the
/// whole seat-class array.
#[derive(Clone)]
pub struct SeatInventory {
    flights: Arc<dyn FlightRepository>,
    max_attempts: u32,
}

impl SeatInventory {
    pub fn new(flights: Arc<dyn FlightRepository>, max_attempts: u32) -> Self {
        Self {
            flights,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn set_capacity(
        &self,
        flight_id: Uuid,
        class_label: &str,
        count: i32,
    ) -> CoreResult<Flight> {
        self.mutate(flight_id, class_label, SeatMutation::SetCapacity(count))
            .await
    }

    pub async fn reserve_one(&self, flight_id: Uuid, class_label: &str) -> CoreResult<Flight> {
        self.mutate(flight_id, class_label, SeatMutation::Reserve).await
    }

    pub async fn release_one(&self, flight_id: Uuid, class_label: &str) -> CoreResult<Flight> {
        self.mutate(flight_id, class_label, SeatMutation::Release).await
    }

    /// Administrative override of the booked count.
    pub async fn set_booked_directly(
        &self,
        flight_id: Uuid,
        class_label: &str,
        booked: i32,
    ) -> CoreResult<Flight> {
        self.mutate(flight_id, class_label, SeatMutation::SetBooked(booked))
            .await
    }

    async fn mutate(
        &self,
        flight_id: Uuid,
        class_label: &str,
        mutation: SeatMutation,
    ) -> CoreResult<Flight> {
        for attempt in 1..=self.max_attempts {
            let mut flight = self
                .flights
                .get_flight(flight_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Flight", flight_id))?;

            mutation.apply(&mut flight.seat_classes, class_label)?;

            if self
                .flights
                .update_seat_classes(flight_id, flight.version, &flight.seat_classes)
                .await?
            {
                flight.version += 1;
                info!(
                    "Seat class {} on flight {}: {:?} applied",
                    class_label, flight.flight_number, mutation
                );
                return Ok(flight);
            }

            debug!(
                "Version race on flight {} (attempt {}/{})",
                flight_id, attempt, self.max_attempts
            );
        }

        warn!("Giving up {:?} on flight {}", mutation, flight_id);
        Err(InventoryError::Contended {
            flight: flight_id,
            attempts: self.max_attempts,
        }
        .into())
    }
}
