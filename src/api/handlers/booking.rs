use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::AppJson;
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::api::dtos::{
    requests::{CreateBookingRequest, UpdateBookingRequest},
    responses::BookingWithSlot,
};
use crate::domain::models::booking::Booking;
use crate::domain::models::user::User;
use crate::domain::services::capacity::validate_people;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Validates the payload, then reserves the places and inserts the booking
/// for `user_id` in one repository transaction.
async fn place_booking(
    state: &AppState,
    user_id: String,
    payload: CreateBookingRequest,
) -> Result<Booking, AppError> {
    let (Some(slot_id), Some(number_of_people)) = (payload.slot_id, payload.number_of_people) else {
        return Err(AppError::Validation("slotId and numberOfPeople are required".into()));
    };
    validate_people(number_of_people)?;

    let booking = Booking::new(user_id, slot_id, number_of_people, payload.notes);
    let created = state.booking_repo.create(&booking).await?;

    info!(
        "Booking {} created: {} people on slot {} for user {}",
        created.id, created.number_of_people, created.slot_id, created.user_id
    );
    Ok(created)
}

async fn load_owned(state: &AppState, booking_id: &str, user: &User) -> Result<Booking, AppError> {
    let booking = state.booking_repo.find_by_id(booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden("Not your booking".into()));
    }
    Ok(booking)
}

async fn with_slot(state: &AppState, booking: Booking) -> Result<BookingWithSlot, AppError> {
    let slot = state.slot_repo.find_by_id(&booking.slot_id).await?;
    Ok(BookingWithSlot { booking, slot })
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = place_booking(&state, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_user(&user.id).await?;

    let mut result = Vec::with_capacity(bookings.len());
    for booking in bookings {
        result.push(with_slot(&state, booking).await?);
    }
    Ok(Json(result))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = load_owned(&state, &booking_id, &user).await?;
    Ok(Json(with_slot(&state, booking).await?))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_owned(&state, &booking_id, &user).await?;
    let cancelled = state.booking_repo.cancel(&booking_id).await?;
    info!("Booking {} cancelled by {}", booking_id, user.id);
    Ok(Json(cancelled))
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_owned(&state, &booking_id, &user).await?;
    state.booking_repo.delete(&booking_id).await?;
    info!("Booking {} deleted by {}", booking_id, user.id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn admin_list_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_all().await?;
    Ok(Json(bookings))
}

/// Books on behalf of `userId`.
pub async fn admin_create_booking(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    AppJson(mut payload): AppJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = payload.user_id.take()
        .ok_or(AppError::Validation("userId is required".into()))?;

    let owner = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    info!("Admin {} booking on behalf of {}", admin.id, owner.id);
    let created = place_booking(&state, owner.id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn admin_update_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(booking_id): Path<String>,
    AppJson(payload): AppJson<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.booking_repo.update_notes(&booking_id, payload.notes).await?;
    info!("Booking {} notes updated", booking_id);
    Ok(Json(updated))
}

pub async fn admin_delete_booking(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.booking_repo.delete(&booking_id).await?;
    info!("Booking {} deleted by admin {}", booking_id, admin.id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
