use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::json::AppJson;
use crate::error::AppError;
use crate::api::dtos::requests::{LoginRequest, RegisterRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::{AuthResponse, UserProfile};
use crate::domain::models::user::{User, ROLE_USER};
use crate::domain::services::session_service::{hash_password, SessionTokens, REFRESH_TOKEN_DAYS, ACCESS_TOKEN_MINUTES};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::{info, warn};

pub async fn register(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if state.user_repo.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(payload.email, payload.name.trim().to_string(), password_hash, ROLE_USER);
    let created = state.user_repo.create(&user).await?;

    let tokens = state.sessions.open(&created).await?;
    let csrf_token = set_cookies(&cookies, tokens);

    info!("User registered: {}", created.id);

    Ok((StatusCode::CREATED, Json(auth_response(csrf_token, created))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tokens) = state.sessions.login(&payload.email, &payload.password).await?;
    let csrf_token = set_cookies(&cookies, tokens);

    info!("User logged in: {}", user.id);

    Ok(Json(auth_response(csrf_token, user)))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get("refresh_token").ok_or(AppError::Unauthorized)?;

    let (user, tokens) = state.sessions.rotate(refresh_cookie.value()).await?;
    let csrf_token = set_cookies(&cookies, tokens);

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(auth_response(csrf_token, user)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get("refresh_token") {
        if let Err(e) = state.sessions.close(cookie.value()).await {
            warn!("Failed to revoke session on logout: {}", e);
        }
    }

    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    cookies.remove(Cookie::build(("refresh_token", "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&session.id).await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user))
}

fn auth_response(csrf_token: String, user: User) -> AuthResponse {
    AuthResponse {
        csrf_token,
        user: UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Sets both token cookies and hands back the CSRF token for the response body.
fn set_cookies(cookies: &Cookies, tokens: SessionTokens) -> String {
    let mut access_c = Cookie::new("access_token", tokens.access_token);
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(ACCESS_TOKEN_MINUTES));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new("refresh_token", tokens.refresh_token);
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/");
    refresh_c.set_max_age(Duration::days(REFRESH_TOKEN_DAYS));
    cookies.add(refresh_c);

    tokens.csrf_token
}
