use aerodesk_shared::{Flight, ReservationRequest, ReservationStatus, Rule, SeatClass, SettledReservation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository trait for regulation rules, keyed by unique name
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Insert or replace by `rule.name`. An existing rule keeps its id.
    async fn upsert_rule(&self, rule: &Rule) -> RepoResult<Rule>;

    async fn get_rule(&self, name: &str) -> RepoResult<Option<Rule>>;

    /// Returns false when no rule had that name.
    async fn delete_rule(&self, name: &str) -> RepoResult<bool>;

    async fn list_rules(&self) -> RepoResult<Vec<Rule>>;
}

/// Repository trait for flight records.
///
/// Seat classes and transit stops live inline in the flight record, so every
/// write is a whole-record (or whole-array) write guarded by `version`.
/// A successful conditional write stores `expected_version + 1`.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn insert_flight(&self, flight: &Flight) -> RepoResult<()>;

    async fn get_flight(&self, id: Uuid) -> RepoResult<Option<Flight>>;

    async fn find_by_number(&self, flight_number: &str) -> RepoResult<Option<Flight>>;

    async fn list_flights(&self) -> RepoResult<Vec<Flight>>;

    /// Flights with `start <= departure_time < end`.
    async fn list_departing_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Flight>>;

    /// Returns false if the stored version no longer equals `expected_version`.
    async fn replace_flight(&self, flight: &Flight, expected_version: i64) -> RepoResult<bool>;

    /// Returns false if the stored version no longer equals `expected_version`.
    async fn update_seat_classes(
        &self,
        id: Uuid,
        expected_version: i64,
        seat_classes: &[SeatClass],
    ) -> RepoResult<bool>;

    /// Returns false if the flight is absent or its version no longer equals
    /// `expected_version`.
    async fn delete_flight(&self, id: Uuid, expected_version: i64) -> RepoResult<bool>;
}

/// Repository trait for reservation requests
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn insert_request(&self, request: &ReservationRequest) -> RepoResult<()>;

    async fn get_request(&self, id: Uuid) -> RepoResult<Option<ReservationRequest>>;

    /// All requests, or only those of `user_id`, newest first.
    async fn list_requests(&self, user_id: Option<Uuid>) -> RepoResult<Vec<ReservationRequest>>;

    async fn list_for_flight(
        &self,
        flight_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> RepoResult<Vec<ReservationRequest>>;

    /// Sets `to` only if the stored status is still `from`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> RepoResult<bool>;

    /// Overwrites the non-status fields of an existing request.
    async fn update_request(&self, request: &ReservationRequest) -> RepoResult<bool>;

    async fn delete_request(&self, id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for settled (paid) reservations. Records are immutable.
#[async_trait]
pub trait SettledReservationRepository: Send + Sync {
    async fn insert_settled(&self, settled: &SettledReservation) -> RepoResult<()>;

    async fn list_settled_for_flights(
        &self,
        flight_ids: &[Uuid],
    ) -> RepoResult<Vec<SettledReservation>>;
}
