use aerodesk_order::RevenueReport;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct YearlyQuery {
    pub year: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reports/revenue/monthly", get(monthly_revenue))
        .route("/v1/reports/revenue/yearly", get(yearly_revenue))
}

/// GET /v1/reports/revenue/monthly?month=&year=
async fn monthly_revenue(
    State(state): State<AppState>,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<RevenueReport>, AppError> {
    Ok(Json(
        state
            .revenue
            .report_for_month(query.month, query.year)
            .await?,
    ))
}

/// GET /v1/reports/revenue/yearly?year=
async fn yearly_revenue(
    State(state): State<AppState>,
    Query(query): Query<YearlyQuery>,
) -> Result<Json<RevenueReport>, AppError> {
    Ok(Json(state.revenue.report_for_year(query.year).await?))
}
