use aerodesk_core::identity::AirportDirectory;
use aerodesk_core::repository::FlightRepository;
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_shared::{AirportSummary, Flight, FlightDraft, SeatClass};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::inventory::reconcile_seat_classes;
use crate::rules::RuleStore;
use crate::schedule::ScheduleValidator;

/// Admin-facing flight maintenance. Every create and update passes the
/// schedule validator against the rules the draft references.
#[derive(Clone)]
pub struct FlightCatalog {
    flights: Arc<dyn FlightRepository>,
    airports: Arc<dyn AirportDirectory>,
    rules: RuleStore,
}

impl FlightCatalog {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        airports: Arc<dyn AirportDirectory>,
        rules: RuleStore,
    ) -> Self {
        Self {
            flights,
            airports,
            rules,
        }
    }

    pub async fn create_flight(&self, draft: FlightDraft) -> CoreResult<Flight> {
        let (departure, destination) = self.validate(&draft).await?;

        if self.flights.find_by_number(&draft.flight_number).await?.is_some() {
            return Err(CoreError::ConflictError(format!(
                "Flight number {} already exists",
                draft.flight_number
            )));
        }

        let now = Utc::now();
        let flight = Flight {
            id: Uuid::new_v4(),
            flight_code: flight_code(&draft, &departure, &destination),
            flight_number: draft.flight_number,
            departure_airport: draft.departure_airport,
            destination_airport: draft.destination_airport,
            departure_time: draft.departure_time,
            duration_minutes: draft.duration_minutes,
            seat_classes: draft
                .seat_classes
                .iter()
                .map(|c| SeatClass::new(c.class_label.clone(), c.count))
                .collect(),
            ticket_price: draft.ticket_price,
            transit_stops: draft.transit_stops,
            rules: draft.rules,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.flights.insert_flight(&flight).await?;
        info!(
            "Flight {} ({}) created, departs {}",
            flight.flight_number, flight.flight_code, flight.departure_time
        );
        Ok(flight)
    }

    pub async fn update_flight(&self, id: Uuid, draft: FlightDraft) -> CoreResult<Flight> {
        let existing = self.get_flight(id).await?;
        let (departure, destination) = self.validate(&draft).await?;

        if draft.flight_number != existing.flight_number {
            if let Some(other) = self.flights.find_by_number(&draft.flight_number).await? {
                if other.id != id {
                    return Err(CoreError::ConflictError(format!(
                        "Flight number {} already exists",
                        draft.flight_number
                    )));
                }
            }
        }

        let seat_classes = reconcile_seat_classes(&existing.seat_classes, &draft.seat_classes)?;

        let flight = Flight {
            id,
            flight_code: flight_code(&draft, &departure, &destination),
            flight_number: draft.flight_number,
            departure_airport: draft.departure_airport,
            destination_airport: draft.destination_airport,
            departure_time: draft.departure_time,
            duration_minutes: draft.duration_minutes,
            seat_classes,
            ticket_price: draft.ticket_price,
            transit_stops: draft.transit_stops,
            rules: draft.rules,
            version: existing.version,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        if !self.flights.replace_flight(&flight, existing.version).await? {
            warn!("Flight {} changed while being updated", id);
            return Err(CoreError::ConflictError(format!(
                "Flight {} was modified concurrently, reload and retry",
                id
            )));
        }

        info!("Flight {} updated", flight.flight_number);
        self.get_flight(id).await
    }

    pub async fn delete_flight(&self, id: Uuid) -> CoreResult<()> {
        let flight = self.get_flight(id).await?;
        self.delete_unchanged(&flight).await
    }

    /// Deletes `flight` only if no booking or edit has touched it since it
    /// was read.
    pub async fn delete_unchanged(&self, flight: &Flight) -> CoreResult<()> {
        if !self.flights.delete_flight(flight.id, flight.version).await? {
            if self.flights.get_flight(flight.id).await?.is_none() {
                return Err(CoreError::not_found("Flight", flight.id));
            }
            warn!("Flight {} changed while being deleted", flight.id);
            return Err(CoreError::ConflictError(format!(
                "Flight {} was modified concurrently, reload and retry",
                flight.id
            )));
        }
        info!("Flight {} deleted", flight.flight_number);
        Ok(())
    }

    pub async fn get_flight(&self, id: Uuid) -> CoreResult<Flight> {
        self.flights
            .get_flight(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Flight", id))
    }

    pub async fn list_flights(&self) -> CoreResult<Vec<Flight>> {
        Ok(self.flights.list_flights().await?)
    }

    async fn airport(&self, id: Uuid) -> CoreResult<AirportSummary> {
        self.airports
            .get_airport(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Airport", id))
    }

    /// Resolves both endpoints and runs the schedule rules.
    async fn validate(&self, draft: &FlightDraft) -> CoreResult<(AirportSummary, AirportSummary)> {
        let departure = self.airport(draft.departure_airport).await?;
        let destination = self.airport(draft.destination_airport).await?;

        let mut names = HashMap::new();
        for stop in &draft.transit_stops {
            if let Some(airport) = self.airports.get_airport(stop.airport).await? {
                names.insert(airport.id, airport.name);
            }
        }

        let flight_time = self
            .rules
            .flight_time(draft.rules.flight_time.as_deref())
            .await?;
        let intermediate = self
            .rules
            .intermediate(draft.rules.intermediate.as_deref())
            .await?;

        ScheduleValidator::new(&flight_time, &intermediate).validate(draft, &names)?;
        Ok((departure, destination))
    }
}

fn flight_code(draft: &FlightDraft, departure: &AirportSummary, destination: &AirportSummary) -> String {
    match draft.flight_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => Flight::route_code(&departure.code, &destination.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerodesk_shared::{Airport, FlightRules, SeatClassDraft, TransitStop};
    use aerodesk_store::{InMemoryDirectory, InMemoryFlightRepository, InMemoryRuleRepository};
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    use crate::inventory::SeatInventory;

    struct Fixture {
        catalog: FlightCatalog,
        rules: RuleStore,
        flights: Arc<InMemoryFlightRepository>,
        han: Uuid,
        sgn: Uuid,
        dad: Uuid,
    }

    fn airport(code: &str, name: &str) -> Airport {
        Airport {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            country: "Vietnam".into(),
            address: String::new(),
            timezone: "Asia/Ho_Chi_Minh".into(),
            terminal_count: 1,
            capacity: 0,
            international: true,
            location: None,
            active: true,
        }
    }

    async fn fixture() -> Fixture {
        let directory = Arc::new(InMemoryDirectory::new());
        let han = airport("HAN", "Noi Bai International Airport");
        let sgn = airport("SGN", "Tan Son Nhat International Airport");
        let dad = airport("DAD", "Da Nang International Airport");
        let (han_id, sgn_id, dad_id) = (han.id, sgn.id, dad.id);
        for a in [han, sgn, dad] {
            directory.add_airport(a).await;
        }

        let flights = Arc::new(InMemoryFlightRepository::new());
        let rules = RuleStore::new(Arc::new(InMemoryRuleRepository::new()));
        Fixture {
            catalog: FlightCatalog::new(flights.clone(), directory, rules.clone()),
            rules,
            flights,
            han: han_id,
            sgn: sgn_id,
            dad: dad_id,
        }
    }

    fn draft(fx: &Fixture, duration: i64) -> FlightDraft {
        FlightDraft {
            flight_number: "VN210".into(),
            flight_code: None,
            departure_airport: fx.han,
            destination_airport: fx.sgn,
            departure_time: Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap(),
            duration_minutes: duration,
            seat_classes: vec![SeatClassDraft {
                class_label: "1".into(),
                count: 10,
            }],
            ticket_price: 1_000_000,
            transit_stops: vec![],
            rules: FlightRules {
                flight_time: Some("flight_time".into()),
                intermediate: Some("intermediate".into()),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_derives_route_code() {
        let fx = fixture().await;
        let flight = fx.catalog.create_flight(draft(&fx, 125)).await.unwrap();

        assert_eq!(flight.flight_code, "HAN-SGN");
        assert_eq!(flight.version, 0);
        assert!(flight.seat_class("1").unwrap().status);
    }

    #[tokio::test]
    async fn test_create_enforces_flight_time_rule() {
        let fx = fixture().await;
        fx.rules
            .upsert(
                "flight_time",
                "FT",
                None,
                BTreeMap::from([("min_flight_time".to_string(), 30.0)]),
            )
            .await
            .unwrap();

        let err = fx.catalog.create_flight(draft(&fx, 20)).await.unwrap_err();
        assert!(matches!(&err, CoreError::ValidationError(msg) if msg.contains("30")));
        assert!(fx.catalog.list_flights().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stop_violation_names_airport() {
        let fx = fixture().await;
        fx.rules
            .upsert(
                "intermediate",
                "IM",
                None,
                BTreeMap::from([("min".to_string(), 20.0), ("max".to_string(), 60.0)]),
            )
            .await
            .unwrap();

        let mut d = draft(&fx, 180);
        d.transit_stops.push(TransitStop {
            airport: fx.dad,
            duration_minutes: 90,
            note: None,
        });
        let err = fx.catalog.create_flight(d).await.unwrap_err();
        assert!(err.reason().contains("Da Nang International Airport"));
    }

    #[tokio::test]
    async fn test_duplicate_number_and_unknown_airport() {
        let fx = fixture().await;
        fx.catalog.create_flight(draft(&fx, 125)).await.unwrap();
        assert!(matches!(
            fx.catalog.create_flight(draft(&fx, 125)).await,
            Err(CoreError::ConflictError(_))
        ));

        let mut d = draft(&fx, 125);
        d.flight_number = "VN212".into();
        d.destination_airport = Uuid::new_v4();
        assert!(matches!(
            fx.catalog.create_flight(d).await,
            Err(CoreError::NotFound { entity: "Airport", .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_bookings_and_revalidates() {
        let fx = fixture().await;
        let flight = fx.catalog.create_flight(draft(&fx, 125)).await.unwrap();
        let inventory = SeatInventory::new(fx.flights.clone(), 5);
        for _ in 0..3 {
            inventory.reserve_one(flight.id, "1").await.unwrap();
        }

        let mut d = draft(&fx, 130);
        d.seat_classes[0].count = 2;
        assert!(matches!(
            fx.catalog.update_flight(flight.id, d).await,
            Err(CoreError::ConflictError(_))
        ));

        let mut d = draft(&fx, 130);
        d.seat_classes[0].count = 20;
        let updated = fx.catalog.update_flight(flight.id, d).await.unwrap();
        assert_eq!(updated.duration_minutes, 130);
        assert_eq!(updated.seat_class("1").unwrap().booked_seats, 3);
        assert_eq!(updated.version, 4);

        assert!(matches!(
            fx.catalog.update_flight(Uuid::new_v4(), draft(&fx, 130)).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_refuses_stale_flight() {
        let fx = fixture().await;
        let flight = fx.catalog.create_flight(draft(&fx, 125)).await.unwrap();
        let inventory = SeatInventory::new(fx.flights.clone(), 5);
        inventory.reserve_one(flight.id, "1").await.unwrap();

        assert!(matches!(
            fx.catalog.delete_unchanged(&flight).await,
            Err(CoreError::ConflictError(_))
        ));
        assert!(fx.catalog.get_flight(flight.id).await.is_ok());

        fx.catalog.delete_flight(flight.id).await.unwrap();
        assert!(matches!(
            fx.catalog.delete_unchanged(&flight).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_flight() {
        let fx = fixture().await;
        assert!(matches!(
            fx.catalog.delete_flight(Uuid::new_v4()).await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
