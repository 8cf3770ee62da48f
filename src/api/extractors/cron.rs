use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts},
};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Compares SHA-256 digests of both sides. An empty configured secret never matches.
fn secret_matches(presented: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Scheduler call carrying `Authorization: Bearer <CRON_SECRET>`.
pub struct CronCaller;

impl<S> FromRequestParts<S> for CronCaller
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let token = parts.headers.get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        if !secret_matches(token, &app_state.config.cron_secret) {
            warn!("Rejected cron call with invalid secret");
            return Err(AppError::Unauthorized);
        }

        Ok(CronCaller)
    }
}
