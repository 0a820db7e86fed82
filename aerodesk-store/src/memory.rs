//! In-process repositories backed by `tokio::sync::RwLock`ed maps.
//!
//! Used for the `memory` storage backend and throughout the test suites.
//! Conditional writes take the write lock, so the version check and the
//! write are one atomic step.

use aerodesk_core::identity::{AirportDirectory, UserDirectory};
use aerodesk_core::repository::{
    FlightRepository, RepoResult, ReservationRepository, RuleRepository,
    SettledReservationRepository,
};
use aerodesk_shared::{
    Airport, AirportSummary, Flight, ReservationRequest, ReservationStatus, Rule, SeatClass,
    SettledReservation,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryRuleRepository {
    rules: RwLock<HashMap<String, Rule>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn upsert_rule(&self, rule: &Rule) -> RepoResult<Rule> {
        let mut rules = self.rules.write().await;
        let mut stored = rule.clone();
        if let Some(existing) = rules.get(&rule.name) {
            stored.id = existing.id;
        }
        rules.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_rule(&self, name: &str) -> RepoResult<Option<Rule>> {
        Ok(self.rules.read().await.get(name).cloned())
    }

    async fn delete_rule(&self, name: &str) -> RepoResult<bool> {
        Ok(self.rules.write().await.remove(name).is_some())
    }

    async fn list_rules(&self) -> RepoResult<Vec<Rule>> {
        let mut rules: Vec<Rule> = self.rules.read().await.values().cloned().collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rules)
    }
}

#[derive(Default)]
pub struct InMemoryFlightRepository {
    flights: RwLock<HashMap<Uuid, Flight>>,
}

impl InMemoryFlightRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn insert_flight(&self, flight: &Flight) -> RepoResult<()> {
        let mut flights = self.flights.write().await;
        if flights
            .values()
            .any(|f| f.id == flight.id || f.flight_number == flight.flight_number)
        {
            return Err(format!("duplicate flight {}", flight.flight_number).into());
        }
        flights.insert(flight.id, flight.clone());
        Ok(())
    }

    async fn get_flight(&self, id: Uuid) -> RepoResult<Option<Flight>> {
        Ok(self.flights.read().await.get(&id).cloned())
    }

    async fn find_by_number(&self, flight_number: &str) -> RepoResult<Option<Flight>> {
        Ok(self
            .flights
            .read()
            .await
            .values()
            .find(|f| f.flight_number == flight_number)
            .cloned())
    }

    async fn list_flights(&self) -> RepoResult<Vec<Flight>> {
        let mut flights: Vec<Flight> = self.flights.read().await.values().cloned().collect();
        flights.sort_by_key(|f| f.departure_time);
        Ok(flights)
    }

    async fn list_departing_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Flight>> {
        let mut flights: Vec<Flight> = self
            .flights
            .read()
            .await
            .values()
            .filter(|f| f.departure_time >= start && f.departure_time < end)
            .cloned()
            .collect();
        flights.sort_by_key(|f| f.departure_time);
        Ok(flights)
    }

    async fn replace_flight(&self, flight: &Flight, expected_version: i64) -> RepoResult<bool> {
        let mut flights = self.flights.write().await;
        match flights.get_mut(&flight.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = flight.clone();
                stored.version = expected_version + 1;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_seat_classes(
        &self,
        id: Uuid,
        expected_version: i64,
        seat_classes: &[SeatClass],
    ) -> RepoResult<bool> {
        let mut flights = self.flights.write().await;
        match flights.get_mut(&id) {
            Some(stored) if stored.version == expected_version => {
                stored.seat_classes = seat_classes.to_vec();
                stored.version = expected_version + 1;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_flight(&self, id: Uuid, expected_version: i64) -> RepoResult<bool> {
        let mut flights = self.flights.write().await;
        match flights.get(&id) {
            Some(flight) if flight.version == expected_version => {
                flights.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Holds both reservation requests and their settled counterparts.
#[derive(Default)]
pub struct InMemoryReservationRepository {
    requests: RwLock<HashMap<Uuid, ReservationRequest>>,
    settled: RwLock<HashMap<Uuid, SettledReservation>>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut requests: Vec<ReservationRequest>) -> Vec<ReservationRequest> {
    requests.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
    requests
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn insert_request(&self, request: &ReservationRequest) -> RepoResult<()> {
        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> RepoResult<Option<ReservationRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn list_requests(&self, user_id: Option<Uuid>) -> RepoResult<Vec<ReservationRequest>> {
        let requests = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| user_id.is_none_or(|user| r.user_id == user))
            .cloned()
            .collect();
        Ok(newest_first(requests))
    }

    async fn list_for_flight(
        &self,
        flight_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> RepoResult<Vec<ReservationRequest>> {
        let requests = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.flight_id == flight_id)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        Ok(newest_first(requests))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> RepoResult<bool> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&id) {
            Some(request) if request.status == from => {
                request.status = to;
                request.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_request(&self, request: &ReservationRequest) -> RepoResult<bool> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&request.id) {
            Some(stored) => {
                let status = stored.status;
                *stored = request.clone();
                stored.status = status;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_request(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.requests.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl SettledReservationRepository for InMemoryReservationRepository {
    async fn insert_settled(&self, settled: &SettledReservation) -> RepoResult<()> {
        let mut records = self.settled.write().await;
        if records.values().any(|s| s.request_id == settled.request_id) {
            return Err(format!("request {} is already settled", settled.request_id).into());
        }
        records.insert(settled.id, settled.clone());
        Ok(())
    }

    async fn list_settled_for_flights(
        &self,
        flight_ids: &[Uuid],
    ) -> RepoResult<Vec<SettledReservation>> {
        let mut records: Vec<SettledReservation> = self
            .settled
            .read()
            .await
            .values()
            .filter(|s| flight_ids.contains(&s.flight_id))
            .cloned()
            .collect();
        records.sort_by_key(|s| s.settled_at);
        Ok(records)
    }
}

/// Users and airports, seeded by the caller.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    airports: RwLock<HashMap<Uuid, Airport>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: Uuid) {
        self.users.write().await.entry(user_id).or_default();
    }

    pub async fn add_airport(&self, airport: Airport) {
        self.airports.write().await.insert(airport.id, airport);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn tickets(&self, user_id: Uuid) -> RepoResult<Option<Vec<Uuid>>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn append_ticket(&self, user_id: Uuid, request_id: Uuid) -> RepoResult<bool> {
        match self.users.write().await.get_mut(&user_id) {
            Some(tickets) => {
                tickets.push(request_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AirportDirectory for InMemoryDirectory {
    async fn get_airport(&self, id: Uuid) -> RepoResult<Option<AirportSummary>> {
        Ok(self
            .airports
            .read()
            .await
            .get(&id)
            .map(AirportSummary::from))
    }
}
