use aerodesk_catalog::{FlightCatalog, RuleStore, SeatInventory};
use aerodesk_core::identity::{AirportDirectory, UserDirectory};
use aerodesk_core::repository::{
    FlightRepository, ReservationRepository, RuleRepository, SettledReservationRepository,
};
use aerodesk_order::{ReservationManager, RevenueAggregator};
use aerodesk_shared::ReservationEvent;
use aerodesk_store::app_config::EngineConfig;
use aerodesk_store::{
    DbClient, InMemoryDirectory, InMemoryFlightRepository, InMemoryReservationRepository,
    InMemoryRuleRepository, PostgresDirectory, PostgresFlightRepository,
    PostgresReservationRepository, PostgresRuleRepository,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// The storage seams the engine is built on.
#[derive(Clone)]
pub struct Repositories {
    pub rules: Arc<dyn RuleRepository>,
    pub flights: Arc<dyn FlightRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub settled: Arc<dyn SettledReservationRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub airports: Arc<dyn AirportDirectory>,
}

impl Repositories {
    pub fn in_memory(directory: Arc<InMemoryDirectory>) -> Self {
        let reservations = Arc::new(InMemoryReservationRepository::new());
        Self {
            rules: Arc::new(InMemoryRuleRepository::new()),
            flights: Arc::new(InMemoryFlightRepository::new()),
            reservations: reservations.clone(),
            settled: reservations,
            users: directory.clone(),
            airports: directory,
        }
    }

    pub fn postgres(db: &DbClient) -> Self {
        let reservations = Arc::new(PostgresReservationRepository::new(db.pool.clone()));
        let directory = Arc::new(PostgresDirectory::new(db.pool.clone()));
        Self {
            rules: Arc::new(PostgresRuleRepository::new(db.pool.clone())),
            flights: Arc::new(PostgresFlightRepository::new(db.pool.clone())),
            reservations: reservations.clone(),
            settled: reservations,
            users: directory.clone(),
            airports: directory,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub rules: RuleStore,
    pub flights: FlightCatalog,
    pub inventory: SeatInventory,
    pub reservations: ReservationManager,
    pub revenue: RevenueAggregator,
    pub db: Option<Arc<DbClient>>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        engine: &EngineConfig,
        events: Option<broadcast::Sender<ReservationEvent>>,
    ) -> Self {
        let rules = RuleStore::new(repos.rules);
        let inventory = SeatInventory::new(repos.flights.clone(), engine.seat_update_attempts);
        let flights = FlightCatalog::new(repos.flights.clone(), repos.airports, rules.clone());

        let mut reservations = ReservationManager::new(
            repos.flights.clone(),
            repos.reservations,
            repos.settled.clone(),
            repos.users,
            rules.clone(),
            inventory.clone(),
        );
        if let Some(sender) = events {
            reservations = reservations.with_events(sender);
        }

        Self {
            revenue: RevenueAggregator::new(repos.flights, repos.settled),
            rules,
            flights,
            inventory,
            reservations,
            db: None,
        }
    }

    pub fn with_db(mut self, db: Arc<DbClient>) -> Self {
        self.db = Some(db);
        self
    }
}
