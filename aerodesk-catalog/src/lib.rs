pub mod flight;
pub mod inventory;
pub mod pricing;
pub mod rules;
pub mod schedule;

pub use flight::FlightCatalog;
pub use inventory::{InventoryError, SeatInventory, SeatMutation};
pub use pricing::{PriceQuote, TicketPricing};
pub use rules::{
    BookingWindowRule, FlightTimeRule, IntermediateRule, RuleError, RuleStore, TicketClassRule,
};
pub use schedule::{ScheduleValidator, ScheduleViolation};
