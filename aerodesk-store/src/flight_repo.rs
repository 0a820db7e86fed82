use aerodesk_core::repository::{FlightRepository, RepoResult};
use aerodesk_shared::{Flight, FlightRules, SeatClass, TransitStop};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const FLIGHT_COLUMNS: &str = "id, flight_number, flight_code, departure_airport, destination_airport, \
     departure_time, duration_minutes, seat_classes, ticket_price, transit_stops, rules, version, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    flight_code: String,
    departure_airport: Uuid,
    destination_airport: Uuid,
    departure_time: DateTime<Utc>,
    duration_minutes: i64,
    seat_classes: Json<Vec<SeatClass>>,
    ticket_price: i64,
    transit_stops: Json<Vec<TransitStop>>,
    rules: Json<FlightRules>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            flight_number: row.flight_number,
            flight_code: row.flight_code,
            departure_airport: row.departure_airport,
            destination_airport: row.destination_airport,
            departure_time: row.departure_time,
            duration_minutes: row.duration_minutes,
            seat_classes: row.seat_classes.0,
            ticket_price: row.ticket_price,
            transit_stops: row.transit_stops.0,
            rules: row.rules.0,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn insert_flight(&self, flight: &Flight) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flights (id, flight_number, flight_code, departure_airport, destination_airport,
                departure_time, duration_minutes, seat_classes, ticket_price, transit_stops, rules,
                version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(flight.id)
        .bind(&flight.flight_number)
        .bind(&flight.flight_code)
        .bind(flight.departure_airport)
        .bind(flight.destination_airport)
        .bind(flight.departure_time)
        .bind(flight.duration_minutes)
        .bind(Json(&flight.seat_classes))
        .bind(flight.ticket_price)
        .bind(Json(&flight.transit_stops))
        .bind(Json(&flight.rules))
        .bind(flight.version)
        .bind(flight.created_at)
        .bind(flight.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_flight(&self, id: Uuid) -> RepoResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {} FROM flights WHERE id = $1",
            FLIGHT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Flight::from))
    }

    async fn find_by_number(&self, flight_number: &str) -> RepoResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {} FROM flights WHERE flight_number = $1",
            FLIGHT_COLUMNS
        ))
        .bind(flight_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Flight::from))
    }

    async fn list_flights(&self) -> RepoResult<Vec<Flight>> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {} FROM flights ORDER BY departure_time",
            FLIGHT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn list_departing_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Flight>> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {} FROM flights WHERE departure_time >= $1 AND departure_time < $2 ORDER BY departure_time",
            FLIGHT_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn replace_flight(&self, flight: &Flight, expected_version: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE flights
            SET flight_number = $3, flight_code = $4, departure_airport = $5, destination_airport = $6,
                departure_time = $7, duration_minutes = $8, seat_classes = $9, ticket_price = $10,
                transit_stops = $11, rules = $12, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(flight.id)
        .bind(expected_version)
        .bind(&flight.flight_number)
        .bind(&flight.flight_code)
        .bind(flight.departure_airport)
        .bind(flight.destination_airport)
        .bind(flight.departure_time)
        .bind(flight.duration_minutes)
        .bind(Json(&flight.seat_classes))
        .bind(flight.ticket_price)
        .bind(Json(&flight.transit_stops))
        .bind(Json(&flight.rules))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_seat_classes(
        &self,
        id: Uuid,
        expected_version: i64,
        seat_classes: &[SeatClass],
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE flights
            SET seat_classes = $3, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(Json(seat_classes))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_flight(&self, id: Uuid, expected_version: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM flights WHERE id = $1 AND version = $2")
            .bind(id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
