pub mod airport;
pub mod events;
pub mod flight;
pub mod reservation;
pub mod rule;
