pub mod models;
pub mod pii;

pub use models::airport::{Airport, AirportSummary, GeoPoint};
pub use models::events::ReservationEvent;
pub use models::flight::{Flight, FlightDraft, FlightRules, SeatClass, SeatClassDraft, TransitStop};
pub use models::reservation::{ReservationRequest, ReservationStatus, SettledReservation};
pub use models::rule::Rule;
pub use pii::Masked;
