use aerodesk_core::repository::{FlightRepository, SettledReservationRepository};
use aerodesk_core::CoreResult;
use aerodesk_shared::{Flight, SettledReservation};
use chrono::{Datelike, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ReportPeriod, RevenueReport, RevenueRow};

/// Revenue per flight code over settled (paid) reservations of flights
/// departing in a period.
#[derive(Clone)]
pub struct RevenueAggregator {
    flights: Arc<dyn FlightRepository>,
    settled: Arc<dyn SettledReservationRepository>,
}

impl RevenueAggregator {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        settled: Arc<dyn SettledReservationRepository>,
    ) -> Self {
        Self { flights, settled }
    }

    /// Defaults to the current UTC month and year.
    pub async fn report_for_month(
        &self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> CoreResult<RevenueReport> {
        let now = Utc::now();
        let period = ReportPeriod::month(year.unwrap_or(now.year()), month.unwrap_or(now.month()))?;
        self.report(period).await
    }

    pub async fn report_for_year(&self, year: Option<i32>) -> CoreResult<RevenueReport> {
        let period = ReportPeriod::year(year.unwrap_or(Utc::now().year()))?;
        self.report(period).await
    }

    pub async fn report(&self, period: ReportPeriod) -> CoreResult<RevenueReport> {
        let flights = self
            .flights
            .list_departing_between(period.start, period.end)
            .await?;
        let ids: Vec<Uuid> = flights.iter().map(|f| f.id).collect();
        let settled = self.settled.list_settled_for_flights(&ids).await?;

        debug!(
            "Revenue {}..{}: {} flights, {} settled tickets",
            period.start,
            period.end,
            flights.len(),
            settled.len()
        );
        Ok(aggregate(period, &flights, &settled))
    }
}

/// Groups `settled` by the flight code of its flight. Every flight code in
/// `flights` gets a row, even without tickets; rows are sorted by code.
pub fn aggregate(
    period: ReportPeriod,
    flights: &[Flight],
    settled: &[SettledReservation],
) -> RevenueReport {
    let code_of: HashMap<Uuid, &str> = flights
        .iter()
        .map(|f| (f.id, f.flight_code.as_str()))
        .collect();

    let mut totals: BTreeMap<&str, (i64, i64)> =
        code_of.values().map(|code| (*code, (0, 0))).collect();
    for ticket in settled {
        if let Some(code) = code_of.get(&ticket.flight_id) {
            let entry = totals.entry(*code).or_default();
            entry.0 += 1;
            entry.1 += ticket.price;
        }
    }

    let total_tickets: i64 = totals.values().map(|(n, _)| n).sum();
    let total_revenue: i64 = totals.values().map(|(_, r)| r).sum();

    let rows = totals
        .into_iter()
        .map(|(code, (tickets, revenue))| RevenueRow {
            flight_code: code.to_string(),
            number_of_tickets: tickets,
            total_revenue: revenue,
            percentage: percentage(revenue, total_revenue),
        })
        .collect();

    RevenueReport {
        period_start: period.start,
        period_end: period.end,
        total_tickets,
        total_revenue,
        rows,
    }
}

fn percentage(part: i64, total: i64) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", part as f64 * 100.0 / total as f64)
}
