use aerodesk_api::{app, AppState, Repositories};
use aerodesk_store::app_config::{Config, StorageBackend};
use aerodesk_store::{DbClient, InMemoryDirectory, PostgresDirectory};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aerodesk_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting Aerodesk API on port {} ({:?} storage)",
        config.server.port,
        config.storage.backend
    );

    let (events_tx, mut events_rx) = tokio::sync::broadcast::channel::<aerodesk_shared::ReservationEvent>(100);
    tokio::spawn(async move {
        loop {
            match events_rx.recv().await {
                Ok(event) => tracing::info!(
                    "Reservation event {}: {}",
                    event.request_id(),
                    serde_json::to_string(&event).unwrap_or_default()
                ),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event log lagged, {} events dropped", n)
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let state = match config.storage.backend {
        StorageBackend::Memory => {
            let directory = Arc::new(InMemoryDirectory::new());
            for airport in config.seed.airports.iter().cloned() {
                directory.add_airport(airport).await;
            }
            for user in &config.seed.users {
                directory.add_user(*user).await;
            }
            AppState::new(
                Repositories::in_memory(directory),
                &config.engine,
                Some(events_tx),
            )
        }
        StorageBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .context("storage.backend = \"postgres\" requires a [database] section")?;
            let db = DbClient::new(db_config)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;

            let directory = PostgresDirectory::new(db.pool.clone());
            directory.seed_airports(&config.seed.airports).await?;
            directory.seed_users(&config.seed.users).await?;

            AppState::new(Repositories::postgres(&db), &config.engine, Some(events_tx))
                .with_db(Arc::new(db))
        }
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
