use aerodesk_order::{NewReservation, ReservationPatch};
use aerodesk_shared::{ReservationRequest, SettledReservation};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub reservation: ReservationRequest,
    pub settled: SettledReservation,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route(
            "/v1/reservations/{id}",
            get(get_reservation).patch(update_reservation),
        )
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
        .route("/v1/reservations/{id}/pay", post(pay_reservation))
}

/// POST /v1/reservations
async fn create_reservation(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewReservation>,
) -> Result<(StatusCode, Json<ReservationRequest>), AppError> {
    let request = state.reservations.create_request(req).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/reservations?user_id=
async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Vec<ReservationRequest>>, AppError> {
    Ok(Json(state.reservations.list(query.user_id).await?))
}

/// GET /v1/reservations/{id}
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationRequest>, AppError> {
    Ok(Json(state.reservations.get(id).await?))
}

/// PATCH /v1/reservations/{id}
async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(patch): AppJson<ReservationPatch>,
) -> Result<Json<ReservationRequest>, AppError> {
    Ok(Json(state.reservations.update(id, patch).await?))
}

/// POST /v1/reservations/{id}/cancel
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationRequest>, AppError> {
    Ok(Json(state.reservations.cancel(id).await?))
}

/// POST /v1/reservations/{id}/pay
async fn pay_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, AppError> {
    let (reservation, settled) = state.reservations.mark_paid(id).await?;
    Ok(Json(PaymentResponse {
        reservation,
        settled,
    }))
}
