use aerodesk_shared::Rule;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertRuleRequest {
    pub code: String,
    pub detail: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rules", get(list_rules))
        .route(
            "/v1/rules/{name}",
            get(get_rule).put(upsert_rule).delete(delete_rule),
        )
}

/// PUT /v1/rules/{name}
async fn upsert_rule(
    State(state): State<AppState>,
    Path(name): Path<String>,
    AppJson(req): AppJson<UpsertRuleRequest>,
) -> Result<Json<Rule>, AppError> {
    let rule = state
        .rules
        .upsert(&name, &req.code, req.detail, req.values)
        .await?;
    Ok(Json(rule))
}

/// GET /v1/rules
async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<Rule>>, AppError> {
    Ok(Json(state.rules.list_all().await?))
}

/// GET /v1/rules/{name}
async fn get_rule(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Rule>, AppError> {
    Ok(Json(state.rules.get(&name).await?))
}

/// DELETE /v1/rules/{name}
async fn delete_rule(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.rules.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}
