use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::user::User;
use crate::api::extractors::auth::{decode_claims, user_from_claims};
use std::convert::Infallible;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::debug;

/// Session user when a valid access token is present; guests get `None`.
pub struct MaybeAuthUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let Some(cookies) = parts.extensions.get::<Cookies>() else {
            return Ok(MaybeAuthUser(None));
        };

        let access_token = match cookies.get("access_token") {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(MaybeAuthUser(None)),
        };

        match decode_claims(&app_state, &access_token) {
            Ok(claims) => Ok(MaybeAuthUser(Some(user_from_claims(claims)))),
            Err(e) => {
                // Invalid token (expired, bad signature) -> Treat as guest
                debug!("MaybeAuth: treating request as guest: {}", e);
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
