use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::cron::CronCaller;
use crate::domain::services::cleanup::purge_expired;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

/// Scheduler entry point for the one-month retention purge.
pub async fn cleanup(
    State(state): State<Arc<AppState>>,
    _caller: CronCaller,
) -> Result<impl IntoResponse, AppError> {
    let report = purge_expired(&state.slot_repo, Utc::now()).await?;
    Ok(Json(report))
}
