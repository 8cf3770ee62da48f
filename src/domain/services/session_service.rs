use std::sync::Arc;
use crate::domain::{
    models::{auth::{Claims, RefreshSession}, user::User},
    ports::{SessionRepository, UserRepository},
};
use crate::error::AppError;
use crate::config::Config;
use argon2::{password_hash::{SaltString, PasswordHash, PasswordHasher, PasswordVerifier}, Argon2};
use jsonwebtoken::{encode, EncodingKey, Header, Algorithm};
use uuid::Uuid;
use chrono::{Utc, Duration};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::{Sha256, Digest};
use tracing::{info, warn};

pub const ACCESS_TOKEN_AUDIENCE: &str = "experiences-frontend";
pub const ACCESS_TOKEN_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_DAYS: i64 = 7;
const MIN_PASSWORD_LEN: usize = 8;

/// What the client receives after login or rotation.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub csrf_token: String,
}

/// Owns the login lifecycle: credential checks, access token signing and
/// refresh-token families.
///
/// Each login opens a family. A refresh claims the presented token and issues
/// the next generation. Presenting an already-claimed token is treated as
/// theft and revokes the family, as does an expired one.
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    issuer: String,
    encoding_key: EncodingKey,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>, users: Arc<dyn UserRepository>, config: &Config) -> Self {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())
            .expect("Invalid JWT Private Key PEM");

        Self { sessions, users, issuer: config.auth_issuer.clone(), encoding_key }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, SessionTokens), AppError> {
        let user = self.users.find_by_email(email).await?
            .ok_or(AppError::Unauthorized)?;
        verify_password(password, &user.password_hash)?;

        let tokens = self.open(&user).await?;
        Ok((user, tokens))
    }

    /// Starts a new family for `user` without a password check (fresh registration).
    pub async fn open(&self, user: &User) -> Result<SessionTokens, AppError> {
        self.issue(user, Uuid::new_v4(), 1).await
    }

    pub async fn rotate(&self, raw_refresh_token: &str) -> Result<(User, SessionTokens), AppError> {
        let token_hash = hash_token(raw_refresh_token);
        let now = Utc::now();

        let Some(session) = self.sessions.claim(&token_hash, now).await? else {
            if let Some(replayed) = self.sessions.find(&token_hash).await? {
                let revoked = self.sessions.revoke_family(replayed.family_id).await?;
                warn!(
                    user_id = %replayed.user_id,
                    family_id = %replayed.family_id,
                    revoked,
                    "Refresh token reused, family revoked"
                );
            }
            return Err(AppError::Unauthorized);
        };

        if session.is_expired(now) {
            self.sessions.revoke_family(session.family_id).await?;
            warn!(user_id = %session.user_id, "Expired refresh token presented");
            return Err(AppError::Unauthorized);
        }

        let user = self.users.find_by_id(&session.user_id).await?
            .ok_or(AppError::Unauthorized)?;

        let tokens = self.issue(&user, session.family_id, session.generation_id + 1).await?;
        Ok((user, tokens))
    }

    /// Ends the family the presented token belongs to.
    pub async fn close(&self, raw_refresh_token: &str) -> Result<(), AppError> {
        if let Some(session) = self.sessions.find(&hash_token(raw_refresh_token)).await? {
            self.sessions.revoke_family(session.family_id).await?;
        }
        Ok(())
    }

    /// Ends every session of `user_id`. Outstanding access tokens stay valid
    /// until they expire.
    pub async fn revoke_user(&self, user_id: &str) -> Result<(), AppError> {
        let revoked = self.sessions.revoke_user(user_id).await?;
        info!(user_id, revoked, "Revoked refresh sessions");
        Ok(())
    }

    async fn issue(&self, user: &User, family_id: Uuid, generation_id: i32) -> Result<SessionTokens, AppError> {
        let csrf_token = random_token(32);
        let access_token = self.sign_access_token(user, &csrf_token)?;

        let refresh_token = random_token(64);
        let session = RefreshSession::new(
            hash_token(&refresh_token),
            user.id.clone(),
            family_id,
            generation_id,
            Duration::days(REFRESH_TOKEN_DAYS),
        );
        self.sessions.store(&session).await?;

        Ok(SessionTokens { access_token, refresh_token, csrf_token })
    }

    fn sign_access_token(&self, user: &User, csrf_token: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user.id.clone(),
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
            exp: (now + Duration::minutes(ACCESS_TOKEN_MINUTES)).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            csrf_token: csrf_token.to_string(),
        };

        encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })
    }
}

fn random_token(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// Refresh tokens are stored as hex SHA-256 digests only.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters", MIN_PASSWORD_LEN
        )));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AppError::Internal)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal)?;

    Argon2::default().verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(verify_password("wrong horse", &hash), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(hash_password("short"), Err(AppError::Validation(_))));
        // Length counts characters, not bytes.
        assert!(matches!(hash_password("ééééééé"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_token_hash_is_stable_hex() {
        let a = hash_token("abc");
        assert_eq!(a, hash_token("abc"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_token("abd"));
    }
}
