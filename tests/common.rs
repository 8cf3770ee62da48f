#![allow(dead_code)]

use experience_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::factory::{seed_admin, sqlite_state},
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "admin@experiences.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const CRON_SECRET: &str = "test-cron-secret";

#[derive(Clone)]
pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(StdDuration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            cron_secret: CRON_SECRET.to_string(),
            business_timezone: chrono_tz::UTC,
            cleanup_interval_secs: None,
            admin_email: Some(ADMIN_EMAIL.to_string()),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
        };

        let state = Arc::new(sqlite_state(&config, pool.clone()));
        seed_admin(&state).await.expect("Failed to seed admin");

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthHeaders {
        let payload = json!({ "email": email, "password": password });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        auth_from_response(response).await
    }

    pub async fn login_admin(&self) -> AuthHeaders {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Self-registers a customer and returns their session.
    pub async fn register(&self, email: &str) -> AuthHeaders {
        let payload = json!({ "email": email, "name": "Guest", "password": "guest-password" });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED, "registration failed");
        auth_from_response(response).await
    }

    /// Sends a JSON request, attaching the session cookie and CSRF header when given.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&AuthHeaders>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// Creates an experience bookable on every weekday and returns its id.
    pub async fn create_experience(&self, admin: &AuthHeaders, slug: &str, frequency: &[&str]) -> String {
        let (status, body) = self.send("POST", "/api/v1/admin/experiences", Some(admin), Some(json!({
            "name": format!("Experience {}", slug),
            "slug": slug,
            "description": "A day out",
            "price": 50.0,
            "location": "Old Town",
            "duration_min": 120,
            "images": ["cover.jpg"],
            "frequency": frequency,
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "experience creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_slot(&self, admin: &AuthHeaders, experience_id: &str, date: DateTime<Utc>, total: i32) -> String {
        let (status, body) = self.send(
            "POST",
            &format!("/api/v1/admin/experiences/{}/slots", experience_id),
            Some(admin),
            Some(json!({ "date": date.to_rfc3339(), "total_slots": total })),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "slot creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn book(&self, auth: &AuthHeaders, slot_id: &str, people: i32) -> (StatusCode, Value) {
        self.send("POST", "/api/v1/bookings", Some(auth), Some(json!({
            "slotId": slot_id,
            "numberOfPeople": people,
            "notes": null,
        }))).await
    }

    pub async fn booked_slots(&self, slot_id: &str) -> i64 {
        let slot = self.state.slot_repo.find_by_id(slot_id).await.unwrap().expect("slot exists");
        slot.booked_slots as i64
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub const ALL_DAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

async fn auth_from_response(response: axum::response::Response) -> AuthHeaders {
    let cookies: Vec<String> = response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();

    let access_token_cookie = cookies.iter()
        .find(|c| c.contains("access_token="))
        .expect("No access_token cookie returned");

    let start = access_token_cookie.find("access_token=").unwrap() + 13;
    let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
    let access_token = access_token_cookie[start..start + end].to_string();

    let body_json = parse_body(response).await;
    let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

    AuthHeaders { access_token, csrf_token }
}

/// 10:00 UTC on the first `day` at least a week ahead.
pub fn upcoming(day: Weekday) -> DateTime<Utc> {
    let mut date = (Utc::now() + Duration::days(7)).date_naive();
    while date.weekday() != day {
        date = date.succ_opt().unwrap();
    }
    Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap())
}
