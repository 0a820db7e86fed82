use aerodesk_shared::{Flight, FlightDraft};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetCapacityRequest {
    pub count: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetBookedRequest {
    pub booked_seats: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights", get(list_flights).post(create_flight))
        .route(
            "/v1/flights/{id}",
            get(get_flight).put(update_flight).delete(delete_flight),
        )
        .route(
            "/v1/flights/{id}/seat-classes/{class}/capacity",
            put(set_capacity),
        )
        .route(
            "/v1/flights/{id}/seat-classes/{class}/booked",
            put(set_booked),
        )
}

/// POST /v1/flights
async fn create_flight(
    State(state): State<AppState>,
    AppJson(draft): AppJson<FlightDraft>,
) -> Result<(StatusCode, Json<Flight>), AppError> {
    let flight = state.flights.create_flight(draft).await?;
    Ok((StatusCode::CREATED, Json(flight)))
}

/// GET /v1/flights
async fn list_flights(State(state): State<AppState>) -> Result<Json<Vec<Flight>>, AppError> {
    Ok(Json(state.flights.list_flights().await?))
}

/// GET /v1/flights/{id}
async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(state.flights.get_flight(id).await?))
}

/// PUT /v1/flights/{id}
async fn update_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(draft): AppJson<FlightDraft>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(state.flights.update_flight(id, draft).await?))
}

/// DELETE /v1/flights/{id}
///
/// Refused while any reservation on the flight is still Booked.
async fn delete_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let flight = state.flights.get_flight(id).await?;
    let open = state
        .reservations
        .open_reservations_for_flight(id)
        .await?;
    if !open.is_empty() {
        return Err(AppError::ConflictError(format!(
            "Flight {} still has {} open reservations",
            flight.flight_number,
            open.len()
        )));
    }

    // A booking that lands after the check bumps the version and fails this.
    state.flights.delete_unchanged(&flight).await?;
    info!("Flight {} removed via API", flight.flight_number);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/flights/{id}/seat-classes/{class}/capacity
async fn set_capacity(
    State(state): State<AppState>,
    Path((id, class)): Path<(Uuid, String)>,
    AppJson(req): AppJson<SetCapacityRequest>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(state.inventory.set_capacity(id, &class, req.count).await?))
}

/// PUT /v1/flights/{id}/seat-classes/{class}/booked
async fn set_booked(
    State(state): State<AppState>,
    Path((id, class)): Path<(Uuid, String)>,
    AppJson(req): AppJson<SetBookedRequest>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(
        state
            .inventory
            .set_booked_directly(id, &class, req.booked_seats)
            .await?,
    ))
}
