use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,

    #[serde(rename = "https://experiences.local/claims/email")]
    pub email: String,

    #[serde(rename = "https://experiences.local/claims/role")]
    pub role: String,

    #[serde(rename = "https://experiences.local/claims/csrf")]
    pub csrf_token: String,
}

/// One refresh token of a login family. Rotation marks the presented token
/// used and stores the next generation under the same `family_id`.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub token_hash: String,
    pub user_id: String,
    pub family_id: Uuid,
    pub generation_id: i32,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn new(token_hash: String, user_id: String, family_id: Uuid, generation_id: i32, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_hash,
            user_id,
            family_id,
            generation_id,
            expires_at: now + ttl,
            used_at: None,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub csrf_token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}
