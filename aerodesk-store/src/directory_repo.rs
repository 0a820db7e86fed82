use aerodesk_core::identity::{AirportDirectory, UserDirectory};
use aerodesk_core::repository::RepoResult;
use aerodesk_shared::{Airport, AirportSummary};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Read-mostly access to the `users` and `airports` tables, which are
/// maintained by the admin tooling.
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts seed airports, leaving existing codes untouched.
    pub async fn seed_airports(&self, airports: &[Airport]) -> Result<(), sqlx::Error> {
        for airport in airports {
            sqlx::query(
                r#"
                INSERT INTO airports (id, code, name, country, address, timezone, terminal_count,
                    capacity, international, latitude, longitude, active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (code) DO NOTHING
                "#,
            )
            .bind(airport.id)
            .bind(&airport.code)
            .bind(&airport.name)
            .bind(&airport.country)
            .bind(&airport.address)
            .bind(&airport.timezone)
            .bind(airport.terminal_count)
            .bind(airport.capacity)
            .bind(airport.international)
            .bind(airport.location.map(|p| p.latitude))
            .bind(airport.location.map(|p| p.longitude))
            .bind(airport.active)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn seed_users(&self, users: &[Uuid]) -> Result<(), sqlx::Error> {
        for user in users {
            sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
                .bind(user)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: Uuid,
    code: String,
    name: String,
    country: String,
    address: String,
}

#[async_trait]
impl UserDirectory for PostgresDirectory {
    async fn tickets(&self, user_id: Uuid) -> RepoResult<Option<Vec<Uuid>>> {
        let tickets: Option<Vec<Uuid>> =
            sqlx::query_scalar("SELECT tickets FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(tickets)
    }

    async fn append_ticket(&self, user_id: Uuid, request_id: Uuid) -> RepoResult<bool> {
        let result =
            sqlx::query("UPDATE users SET tickets = array_append(tickets, $2) WHERE id = $1")
                .bind(user_id)
                .bind(request_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl AirportDirectory for PostgresDirectory {
    async fn get_airport(&self, id: Uuid) -> RepoResult<Option<AirportSummary>> {
        let row = sqlx::query_as::<_, AirportRow>(
            "SELECT id, code, name, country, address FROM airports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AirportSummary {
            id: r.id,
            code: r.code,
            name: r.name,
            country: r.country,
            address: r.address,
        }))
    }
}
