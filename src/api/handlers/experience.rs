use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::AppJson;
use crate::api::extractors::{auth::AdminUser, maybe_auth::MaybeAuthUser};
use crate::api::dtos::{
    requests::{CreateExperienceRequest, UpdateExperienceRequest},
    responses::ExperienceSlotsResponse,
};
use crate::domain::models::experience::{Experience, ExperienceView, NewExperienceParams, parse_weekday};
use crate::domain::models::slot::SlotAvailability;
use crate::error::AppError;
use std::sync::Arc;
use chrono::{Utc, Weekday};
use tracing::info;

fn parse_frequency(days: &[String]) -> Result<Vec<Weekday>, AppError> {
    days.iter()
        .map(|d| parse_weekday(d).ok_or_else(|| AppError::Validation(format!("Unknown weekday: {}", d))))
        .collect()
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_slug(slug: &str) -> Result<(), AppError> {
    let valid = !slug.is_empty()
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(AppError::Validation("Slug may only contain lowercase letters, digits and '-'".into()));
    }
    Ok(())
}

fn validate_terms(price: f64, duration_min: i32) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("Price must be zero or positive".into()));
    }
    if duration_min <= 0 {
        return Err(AppError::Validation("Duration must be positive".into()));
    }
    Ok(())
}

/// Public catalogue; admins also see hidden experiences.
pub async fn list_experiences(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> Result<impl IntoResponse, AppError> {
    let include_hidden = user.is_some_and(|u| u.is_admin());
    let experiences = state.experience_repo.list(include_hidden).await?;
    let views: Vec<ExperienceView> = experiences.into_iter().map(ExperienceView::from).collect();
    Ok(Json(views))
}

pub async fn get_experience(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let experience = find_public(&state, &slug, user.is_some_and(|u| u.is_admin())).await?;
    Ok(Json(ExperienceView::from(experience)))
}

pub async fn list_available_slots(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let experience = find_public(&state, &slug, user.is_some_and(|u| u.is_admin())).await?;
    let slots = state.slot_repo.list_open_after(&experience.id, Utc::now()).await?;

    Ok(Json(ExperienceSlotsResponse {
        experience: ExperienceView::from(experience),
        slots: slots.into_iter().map(SlotAvailability::from).collect(),
    }))
}

async fn find_public(state: &AppState, slug: &str, include_hidden: bool) -> Result<Experience, AppError> {
    let experience = state.experience_repo.find_by_slug(slug).await?
        .ok_or(AppError::NotFound("Experience not found".into()))?;
    if !experience.is_visible && !include_hidden {
        return Err(AppError::NotFound("Experience not found".into()));
    }
    Ok(experience)
}

pub async fn admin_list_experiences(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let experiences = state.experience_repo.list(true).await?;
    let views: Vec<ExperienceView> = experiences.into_iter().map(ExperienceView::from).collect();
    Ok(Json(views))
}

pub async fn admin_get_experience(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(experience_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let experience = state.experience_repo.find_by_id(&experience_id).await?
        .ok_or(AppError::NotFound("Experience not found".into()))?;
    Ok(Json(ExperienceView::from(experience)))
}

pub async fn create_experience(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    AppJson(payload): AppJson<CreateExperienceRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating experience: {} by {}", payload.slug, admin.id);

    let name = validate_name(&payload.name)?;
    validate_slug(&payload.slug)?;
    validate_terms(payload.price, payload.duration_min)?;
    let frequency = parse_frequency(&payload.frequency)?;

    if state.experience_repo.find_by_slug(&payload.slug).await?.is_some() {
        return Err(AppError::Conflict("Slug already in use".into()));
    }

    let experience = Experience::new(NewExperienceParams {
        name,
        slug: payload.slug,
        description: payload.description,
        price: payload.price,
        location: payload.location,
        duration_min: payload.duration_min,
        images: payload.images,
        frequency,
        is_visible: payload.is_visible.unwrap_or(true),
    });

    let created = state.experience_repo.create(&experience).await?;
    info!("Experience created: {}", created.id);
    Ok((StatusCode::CREATED, Json(ExperienceView::from(created))))
}

pub async fn update_experience(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(experience_id): Path<String>,
    AppJson(payload): AppJson<UpdateExperienceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut experience = state.experience_repo.find_by_id(&experience_id).await?
        .ok_or(AppError::NotFound("Experience not found".into()))?;

    if let Some(val) = payload.slug {
        validate_slug(&val)?;
        if val != experience.slug && state.experience_repo.find_by_slug(&val).await?.is_some() {
            return Err(AppError::Conflict("Slug already in use".into()));
        }
        experience.slug = val;
    }
    if let Some(val) = payload.name { experience.name = validate_name(&val)?; }
    if let Some(val) = payload.description { experience.description = val; }
    if let Some(val) = payload.price { experience.price = val; }
    if let Some(val) = payload.location { experience.location = val; }
    if let Some(val) = payload.duration_min { experience.duration_min = val; }
    if let Some(val) = payload.images { experience.set_images(&val); }
    if let Some(val) = payload.frequency { experience.set_frequency(&parse_frequency(&val)?); }
    if let Some(val) = payload.is_visible { experience.is_visible = val; }

    validate_terms(experience.price, experience.duration_min)?;

    let updated = state.experience_repo.update(&experience).await?;
    info!("Experience updated: {}", updated.id);
    Ok(Json(ExperienceView::from(updated)))
}

pub async fn delete_experience(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(experience_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.experience_repo.delete(&experience_id).await?;
    info!("Experience deleted: {}", experience_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
