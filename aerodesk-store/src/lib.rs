pub mod app_config;
pub mod database;
pub mod directory_repo;
pub mod flight_repo;
pub mod memory;
pub mod order_repo;
pub mod rule_repo;

pub use database::DbClient;
pub use directory_repo::PostgresDirectory;
pub use flight_repo::PostgresFlightRepository;
pub use memory::{
    InMemoryDirectory, InMemoryFlightRepository, InMemoryReservationRepository,
    InMemoryRuleRepository,
};
pub use order_repo::PostgresReservationRepository;
pub use rule_repo::PostgresRuleRepository;
