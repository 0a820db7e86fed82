pub mod finance;
pub mod manager;
pub mod models;

pub use finance::RevenueAggregator;
pub use manager::{LifecycleError, ReservationManager};
pub use models::{
    NewReservation, ReportPeriod, ReservationPatch, RevenueReport, RevenueRow,
};
