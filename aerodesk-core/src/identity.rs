use aerodesk_shared::AirportSummary;
use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::RepoResult;

/// Identity lookups owned by the user-management side of the back office.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The user's ticket list, or `None` if the user does not exist.
    async fn tickets(&self, user_id: Uuid) -> RepoResult<Option<Vec<Uuid>>>;

    /// Appends a reservation request id to the user's ticket list.
    /// Returns false if the user does not exist.
    async fn append_ticket(&self, user_id: Uuid, request_id: Uuid) -> RepoResult<bool>;
}

/// Airport lookups for validation messages and route codes.
#[async_trait]
pub trait AirportDirectory: Send + Sync {
    async fn get_airport(&self, id: Uuid) -> RepoResult<Option<AirportSummary>>;
}
