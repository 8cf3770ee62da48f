use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::AppJson;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::requests::{CreateUserRequest, UpdateUserRequest};
use crate::domain::models::user::{is_valid_role, User, ROLE_USER};
use crate::domain::services::session_service::hash_password;
use std::sync::Arc;
use crate::error::AppError;
use tracing::{info, error};

fn check_role(role: &str) -> Result<(), AppError> {
    if !is_valid_role(role) {
        return Err(AppError::Validation(format!("Unknown role: {}", role)));
    }
    Ok(())
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let users = state.user_repo.list().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = payload.role.as_deref().unwrap_or(ROLE_USER);
    check_role(role)?;

    if !payload.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if state.user_repo.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(payload.email, payload.name, password_hash, role);
    let created = state.user_repo.create(&user).await?;

    info!("Created user {} with role {}", created.id, created.role);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if let Some(name) = payload.name { user.name = name; }
    let mut credentials_changed = false;
    if let Some(role) = payload.role {
        check_role(&role)?;
        credentials_changed |= role != user.role;
        user.role = role;
    }
    if let Some(password) = payload.password {
        user.password_hash = hash_password(&password)?;
        credentials_changed = true;
    }

    let updated = state.user_repo.update(&user).await?;
    if credentials_changed {
        state.sessions.revoke_user(&updated.id).await?;
    }
    info!("Updated user {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if admin.id == user_id {
        return Err(AppError::Conflict("Cannot delete yourself".into()));
    }

    let target = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    match state.user_repo.delete(&target.id).await {
        Ok(_) => {
            info!("Deleted user {}", user_id);
            Ok(Json(serde_json::json!({"status": "deleted"})))
        },
        Err(e) => {
            error!("Failed to delete user {}: {:?}", user_id, e);
            Err(e)
        }
    }
}
