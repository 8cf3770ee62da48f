use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::AppJson;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::{
    requests::{CreateSlotRequest, CreateSlotsInRangeRequest, UpdateSlotRequest},
    responses::{BulkSlotsResponse, SlotDeletedResponse},
};
use crate::domain::models::experience::Experience;
use crate::domain::models::slot::{ScheduleSlot, SlotChanges};
use crate::domain::services::capacity::{allowed_dates, check_day_allowed, local_to_utc, validate_total};
use crate::error::AppError;
use std::sync::Arc;
use chrono::NaiveTime;
use tracing::{info, warn};

async fn load_experience(state: &AppState, experience_id: &str) -> Result<Experience, AppError> {
    state.experience_repo.find_by_id(experience_id).await?
        .ok_or(AppError::NotFound("Experience not found".into()))
}

async fn load_slot(state: &AppState, slot_id: &str) -> Result<ScheduleSlot, AppError> {
    state.slot_repo.find_by_id(slot_id).await?
        .ok_or(AppError::NotFound("Slot not found".into()))
}

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(experience_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_experience(&state, &experience_id).await?;
    let slots = state.slot_repo.list_by_experience(&experience_id).await?;
    Ok(Json(slots))
}

pub async fn create_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(experience_id): Path<String>,
    AppJson(payload): AppJson<CreateSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let experience = load_experience(&state, &experience_id).await?;
    validate_total(payload.total_slots)?;
    check_day_allowed(&experience, payload.date, state.config.business_timezone)?;

    let slot = ScheduleSlot::new(experience.id, payload.date, payload.total_slots);
    let created = state.slot_repo.create(&slot).await?;

    info!("Slot created: {} at {} ({} places)", created.id, created.start_time, created.total_slots);
    Ok((StatusCode::CREATED, Json(created)))
}

/// One slot per allowed weekday in the range; existing starts are reported as skipped.
pub async fn create_slots_in_range(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(experience_id): Path<String>,
    AppJson(payload): AppJson<CreateSlotsInRangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let experience = load_experience(&state, &experience_id).await?;
    validate_total(payload.total_slots)?;

    let time = NaiveTime::parse_from_str(&payload.time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;
    let tz = state.config.business_timezone;
    let dates = allowed_dates(payload.start_date, payload.end_date, &experience.frequency())?;

    let mut created = Vec::new();
    let mut skipped = Vec::new();

    for date in dates {
        let start = match local_to_utc(date, time, tz) {
            Ok(start) => start,
            Err(_) => {
                warn!("Skipping {} {}: local time does not exist in {}", date, time, tz);
                skipped.push(date.to_string());
                continue;
            }
        };

        if state.slot_repo.find_by_start(&experience.id, start).await?.is_some() {
            skipped.push(date.to_string());
            continue;
        }

        let slot = ScheduleSlot::new(experience.id.clone(), start, payload.total_slots);
        match state.slot_repo.create(&slot).await {
            Ok(saved) => created.push(saved),
            // Inserted by a concurrent request since the lookup above.
            Err(e) if e.is_unique_violation() => skipped.push(date.to_string()),
            Err(e) => return Err(e),
        }
    }

    info!(
        "Bulk slot creation for {}: {} created, {} skipped",
        experience.id, created.len(), skipped.len()
    );

    Ok((StatusCode::CREATED, Json(BulkSlotsResponse { created, skipped })))
}

pub async fn get_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(slot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_slot(&state, &slot_id).await?))
}

pub async fn update_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(slot_id): Path<String>,
    AppJson(payload): AppJson<UpdateSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let changes = SlotChanges {
        start_time: payload.date,
        total_slots: payload.total_slots,
        is_cancelled: payload.is_cancelled,
    };

    if let Some(date) = changes.start_time {
        let slot = load_slot(&state, &slot_id).await?;
        let experience = load_experience(&state, &slot.experience_id).await?;
        check_day_allowed(&experience, date, state.config.business_timezone)?;
    }

    if changes.is_empty() {
        return Ok(Json(load_slot(&state, &slot_id).await?));
    }

    let slot = state.slot_repo.apply_changes(&slot_id, &changes).await?;

    info!("Slot updated: {}", slot.id);
    Ok(Json(slot))
}

pub async fn delete_slot(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(slot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings_deleted = state.slot_repo.delete_cascade(&slot_id).await?;
    info!("Slot {} deleted by {} with {} bookings", slot_id, admin.id, bookings_deleted);
    Ok(Json(SlotDeletedResponse { status: "deleted", bookings_deleted }))
}

pub async fn list_slot_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(slot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_slot(&state, &slot_id).await?;
    let bookings = state.booking_repo.list_by_slot(&slot_id).await?;
    Ok(Json(bookings))
}
