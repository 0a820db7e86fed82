use aerodesk_core::repository::{RepoResult, ReservationRepository, SettledReservationRepository};
use aerodesk_shared::{Masked, ReservationRequest, ReservationStatus, SettledReservation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Reservation requests and settled reservations share one pool.
pub struct PostgresReservationRepository {
    pool: PgPool,
}

impl PostgresReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const REQUEST_COLUMNS: &str = "id, user_id, flight_id, seat_class, passenger_name, \
     identification_number, phone_number, price, booked_at, status, updated_at";

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    user_id: Uuid,
    flight_id: Uuid,
    seat_class: String,
    passenger_name: String,
    identification_number: String,
    phone_number: String,
    price: i64,
    booked_at: DateTime<Utc>,
    status: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for ReservationRequest {
    type Error = String;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(ReservationRequest {
            id: row.id,
            user_id: row.user_id,
            flight_id: row.flight_id,
            seat_class: row.seat_class,
            passenger_name: row.passenger_name,
            identification_number: Masked(row.identification_number),
            phone_number: Masked(row.phone_number),
            price: row.price,
            booked_at: row.booked_at,
            status: row.status.parse()?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SettledRow {
    id: Uuid,
    request_id: Uuid,
    user_id: Uuid,
    flight_id: Uuid,
    seat_class: String,
    passenger_name: String,
    identification_number: String,
    price: i64,
    booked_at: DateTime<Utc>,
    settled_at: DateTime<Utc>,
}

impl From<SettledRow> for SettledReservation {
    fn from(row: SettledRow) -> Self {
        SettledReservation {
            id: row.id,
            request_id: row.request_id,
            user_id: row.user_id,
            flight_id: row.flight_id,
            seat_class: row.seat_class,
            passenger_name: row.passenger_name,
            identification_number: Masked(row.identification_number),
            price: row.price,
            booked_at: row.booked_at,
            settled_at: row.settled_at,
        }
    }
}

fn into_requests(rows: Vec<RequestRow>) -> RepoResult<Vec<ReservationRequest>> {
    rows.into_iter()
        .map(|row| ReservationRequest::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepository {
    async fn insert_request(&self, request: &ReservationRequest) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reservation_requests (id, user_id, flight_id, seat_class, passenger_name,
                identification_number, phone_number, price, booked_at, status, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.flight_id)
        .bind(&request.seat_class)
        .bind(&request.passenger_name)
        .bind(request.identification_number.expose())
        .bind(request.phone_number.expose())
        .bind(request.price)
        .bind(request.booked_at)
        .bind(request.status.as_str())
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> RepoResult<Option<ReservationRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM reservation_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(ReservationRequest::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn list_requests(&self, user_id: Option<Uuid>) -> RepoResult<Vec<ReservationRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM reservation_requests WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY booked_at DESC",
            REQUEST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_requests(rows)
    }

    async fn list_for_flight(
        &self,
        flight_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> RepoResult<Vec<ReservationRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM reservation_requests WHERE flight_id = $1 AND ($2::text IS NULL OR status = $2) ORDER BY booked_at DESC",
            REQUEST_COLUMNS
        ))
        .bind(flight_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        into_requests(rows)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE reservation_requests SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_request(&self, request: &ReservationRequest) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservation_requests
            SET passenger_name = $2, identification_number = $3, phone_number = $4, price = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(request.id)
        .bind(&request.passenger_name)
        .bind(request.identification_number.expose())
        .bind(request.phone_number.expose())
        .bind(request.price)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_request(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM reservation_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SettledReservationRepository for PostgresReservationRepository {
    async fn insert_settled(&self, settled: &SettledReservation) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settled_reservations (id, request_id, user_id, flight_id, seat_class,
                passenger_name, identification_number, price, booked_at, settled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(settled.id)
        .bind(settled.request_id)
        .bind(settled.user_id)
        .bind(settled.flight_id)
        .bind(&settled.seat_class)
        .bind(&settled.passenger_name)
        .bind(settled.identification_number.expose())
        .bind(settled.price)
        .bind(settled.booked_at)
        .bind(settled.settled_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_settled_for_flights(
        &self,
        flight_ids: &[Uuid],
    ) -> RepoResult<Vec<SettledReservation>> {
        if flight_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, SettledRow>(
            r#"
            SELECT id, request_id, user_id, flight_id, seat_class, passenger_name,
                identification_number, price, booked_at, settled_at
            FROM settled_reservations WHERE flight_id = ANY($1)
            ORDER BY settled_at
            "#,
        )
        .bind(flight_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SettledReservation::from).collect())
    }
}
