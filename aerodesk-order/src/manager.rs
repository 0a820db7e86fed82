use aerodesk_catalog::{InventoryError, RuleStore, SeatInventory, TicketPricing};
use aerodesk_core::identity::UserDirectory;
use aerodesk_core::repository::{
    FlightRepository, ReservationRepository, SettledReservationRepository,
};
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_shared::models::events::{
    ReservationBookedEvent, ReservationCancelledEvent, ReservationPaidEvent,
};
use aerodesk_shared::{
    ReservationEvent, ReservationRequest, ReservationStatus, SettledReservation,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{NewReservation, ReservationPatch};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("booking deadline has expired")]
    DeadlineExpired,

    #[error("Reservation {0} was changed concurrently")]
    Concurrent(Uuid),
}

impl From<LifecycleError> for CoreError {
    fn from(err: LifecycleError) -> Self {
        CoreError::ConflictError(err.to_string())
    }
}

/// Drives a reservation request from booking to payment or cancellation and
/// keeps the flight's seat counts in step with it.
#[derive(Clone)]
pub struct ReservationManager {
    flights: Arc<dyn FlightRepository>,
    reservations: Arc<dyn ReservationRepository>,
    settled: Arc<dyn SettledReservationRepository>,
    users: Arc<dyn UserDirectory>,
    rules: RuleStore,
    inventory: SeatInventory,
    events: Option<broadcast::Sender<ReservationEvent>>,
}

impl ReservationManager {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        reservations: Arc<dyn ReservationRepository>,
        settled: Arc<dyn SettledReservationRepository>,
        users: Arc<dyn UserDirectory>,
        rules: RuleStore,
        inventory: SeatInventory,
    ) -> Self {
        Self {
            flights,
            reservations,
            settled,
            users,
            rules,
            inventory,
            events: None,
        }
    }

    pub fn with_events(mut self, sender: broadcast::Sender<ReservationEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub async fn create_request(&self, new: NewReservation) -> CoreResult<ReservationRequest> {
        self.create_request_at(new, Utc::now()).await
    }

    /// Books one seat as of `now`.
    pub async fn create_request_at(
        &self,
        new: NewReservation,
        now: DateTime<Utc>,
    ) -> CoreResult<ReservationRequest> {
        let flight = self
            .flights
            .get_flight(new.flight_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Flight", new.flight_id))?;

        let window = self
            .rules
            .booking_window(flight.rules.booking_window.as_deref())
            .await?;
        // A window too large to represent never closes.
        let deadline = TimeDelta::try_days(window.max_days)
            .and_then(|days| flight.departure_time.checked_add_signed(days));
        if deadline.is_some_and(|deadline| now >= deadline) {
            return Err(LifecycleError::DeadlineExpired.into());
        }

        let class = flight
            .seat_class(&new.seat_class)
            .ok_or_else(|| CoreError::not_found("Seat class", &new.seat_class))?;
        if class.is_full() {
            return Err(InventoryError::SoldOut.into());
        }

        let ticket_class = self
            .rules
            .ticket_class(flight.rules.ticket_class.as_deref())
            .await?;
        let quote = TicketPricing::new(ticket_class).quote(flight.ticket_price, &new.seat_class);

        if self.users.tickets(new.user_id).await?.is_none() {
            return Err(CoreError::not_found("User", new.user_id));
        }

        self.inventory
            .reserve_one(flight.id, &new.seat_class)
            .await?;

        let request = ReservationRequest::new(
            new.user_id,
            flight.id,
            new.seat_class,
            new.passenger_name,
            new.identification_number,
            new.phone_number,
            quote.price,
            now,
        );

        if let Err(err) = self.reservations.insert_request(&request).await {
            self.compensate(None, &request).await;
            return Err(err.into());
        }

        match self.users.append_ticket(request.user_id, request.id).await {
            Ok(true) => {}
            Ok(false) => {
                self.compensate(Some(request.id), &request).await;
                return Err(CoreError::not_found("User", request.user_id));
            }
            Err(err) => {
                self.compensate(Some(request.id), &request).await;
                return Err(err.into());
            }
        }

        info!(
            "Reservation {} booked: flight {} class {} price {} for {}",
            request.id, flight.flight_number, request.seat_class, request.price, request.passenger_name
        );
        self.publish(ReservationEvent::Booked(ReservationBookedEvent {
            request_id: request.id,
            user_id: request.user_id,
            flight_id: request.flight_id,
            seat_class: request.seat_class.clone(),
            price: request.price,
            timestamp: now.timestamp(),
        }));

        Ok(request)
    }

    /// Undoes a partially completed booking: drops the stored request (if
    /// any) and gives the seat back.
    async fn compensate(&self, stored: Option<Uuid>, request: &ReservationRequest) {
        warn!("Rolling back reservation {}", request.id);
        if let Some(id) = stored {
            if let Err(err) = self.reservations.delete_request(id).await {
                error!("Failed to delete reservation {} during rollback: {}", id, err);
            }
        }
        if let Err(err) = self
            .inventory
            .release_one(request.flight_id, &request.seat_class)
            .await
        {
            error!(
                "Failed to release seat {} on flight {} during rollback: {}",
                request.seat_class, request.flight_id, err
            );
        }
    }

    pub async fn cancel(&self, request_id: Uuid) -> CoreResult<ReservationRequest> {
        let mut request = self.get(request_id).await?;
        self.claim(&request, ReservationStatus::Cancelled).await?;

        if let Err(err) = self
            .inventory
            .release_one(request.flight_id, &request.seat_class)
            .await
        {
            self.restore(request_id, ReservationStatus::Cancelled).await;
            return Err(err);
        }

        let now = Utc::now();
        request.status = ReservationStatus::Cancelled;
        request.updated_at = now;

        info!("Reservation {} cancelled", request_id);
        self.publish(ReservationEvent::Cancelled(ReservationCancelledEvent {
            request_id,
            flight_id: request.flight_id,
            seat_class: request.seat_class.clone(),
            timestamp: now.timestamp(),
        }));

        Ok(request)
    }

    pub async fn mark_paid(
        &self,
        request_id: Uuid,
    ) -> CoreResult<(ReservationRequest, SettledReservation)> {
        let mut request = self.get(request_id).await?;
        self.claim(&request, ReservationStatus::Paid).await?;

        let now = Utc::now();
        let settled = SettledReservation::from_request(&request, now);
        if let Err(err) = self.settled.insert_settled(&settled).await {
            self.restore(request_id, ReservationStatus::Paid).await;
            return Err(err.into());
        }

        request.status = ReservationStatus::Paid;
        request.updated_at = now;

        info!(
            "Reservation {} paid, settled as {} ({})",
            request_id, settled.id, settled.price
        );
        self.publish(ReservationEvent::Paid(ReservationPaidEvent {
            request_id,
            settled_id: settled.id,
            flight_id: settled.flight_id,
            price: settled.price,
            timestamp: now.timestamp(),
        }));

        Ok((request, settled))
    }

    pub async fn update(
        &self,
        request_id: Uuid,
        patch: ReservationPatch,
    ) -> CoreResult<ReservationRequest> {
        if patch.is_empty() {
            return Err(CoreError::ValidationError(
                "update must change at least one field".to_string(),
            ));
        }
        let mut request = self.get(request_id).await?;

        if let Some(name) = patch.passenger_name {
            if name.trim().is_empty() {
                return Err(CoreError::ValidationError(
                    "passenger name must not be empty".to_string(),
                ));
            }
            request.passenger_name = name;
        }
        if let Some(price) = patch.price {
            if price < 0 {
                return Err(CoreError::ValidationError(
                    "price must not be negative".to_string(),
                ));
            }
            request.price = price;
        }
        if let Some(id_number) = patch.identification_number {
            request.identification_number = id_number.into();
        }
        if let Some(phone) = patch.phone_number {
            request.phone_number = phone.into();
        }

        if !self.reservations.update_request(&request).await? {
            return Err(CoreError::not_found("Reservation", request_id));
        }

        info!("Reservation {} updated", request_id);
        self.get(request_id).await
    }

    pub async fn get(&self, request_id: Uuid) -> CoreResult<ReservationRequest> {
        self.reservations
            .get_request(request_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Reservation", request_id))
    }

    pub async fn list(&self, user_id: Option<Uuid>) -> CoreResult<Vec<ReservationRequest>> {
        Ok(self.reservations.list_requests(user_id).await?)
    }

    /// Requests still holding a seat on the flight.
    pub async fn open_reservations_for_flight(
        &self,
        flight_id: Uuid,
    ) -> CoreResult<Vec<ReservationRequest>> {
        Ok(self
            .reservations
            .list_for_flight(flight_id, Some(ReservationStatus::Booked))
            .await?)
    }

    /// Moves a Booked request to `to`, or fails without side effects.
    async fn claim(&self, request: &ReservationRequest, to: ReservationStatus) -> CoreResult<()> {
        if request.status != ReservationStatus::Booked {
            return Err(LifecycleError::InvalidTransition {
                from: request.status,
                to,
            }
            .into());
        }
        if !self
            .reservations
            .transition_status(request.id, ReservationStatus::Booked, to)
            .await?
        {
            return Err(LifecycleError::Concurrent(request.id).into());
        }
        Ok(())
    }

    async fn restore(&self, request_id: Uuid, from: ReservationStatus) {
        match self
            .reservations
            .transition_status(request_id, from, ReservationStatus::Booked)
            .await
        {
            Ok(true) => warn!("Reservation {} restored to BOOKED", request_id),
            Ok(false) => error!("Reservation {} left {} after a failed step", request_id, from),
            Err(err) => error!("Failed to restore reservation {}: {}", request_id, err),
        }
    }

    fn publish(&self, event: ReservationEvent) {
        if let Some(sender) = &self.events {
            // No subscribers is not an error.
            let _ = sender.send(event);
        }
    }
}
