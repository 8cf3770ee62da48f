use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::user::{User, ROLE_ADMIN};
use crate::domain::ports::UserRepository;
use crate::domain::services::session_service::{SessionService, hash_password};
use crate::infra::repositories::{
    postgres_user_repo::PostgresUserRepo, postgres_session_repo::PostgresSessionRepo,
    postgres_experience_repo::PostgresExperienceRepo, postgres_slot_repo::PostgresSlotRepo,
    postgres_booking_repo::PostgresBookingRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_session_repo::SqliteSessionRepo,
    sqlite_experience_repo::SqliteExperienceRepo, sqlite_slot_repo::SqliteSlotRepo,
    sqlite_booking_repo::SqliteBookingRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_state(config, pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_state(config, pool)
    };

    if let Err(e) = seed_admin(&state).await {
        warn!("Admin seeding failed: {}", e);
    }

    state
}

pub fn postgres_state(config: &Config, pool: PgPool) -> AppState {
    let user_repo: Arc<dyn UserRepository> = Arc::new(PostgresUserRepo::new(pool.clone()));
    let sessions = Arc::new(SessionService::new(
        Arc::new(PostgresSessionRepo::new(pool.clone())),
        user_repo.clone(),
        config,
    ));

    AppState {
        config: config.clone(),
        user_repo,
        experience_repo: Arc::new(PostgresExperienceRepo::new(pool.clone())),
        slot_repo: Arc::new(PostgresSlotRepo::new(pool.clone())),
        booking_repo: Arc::new(PostgresBookingRepo::new(pool)),
        sessions,
    }
}

pub fn sqlite_state(config: &Config, pool: SqlitePool) -> AppState {
    let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepo::new(pool.clone()));
    let sessions = Arc::new(SessionService::new(
        Arc::new(SqliteSessionRepo::new(pool.clone())),
        user_repo.clone(),
        config,
    ));

    AppState {
        config: config.clone(),
        user_repo,
        experience_repo: Arc::new(SqliteExperienceRepo::new(pool.clone())),
        slot_repo: Arc::new(SqliteSlotRepo::new(pool.clone())),
        booking_repo: Arc::new(SqliteBookingRepo::new(pool)),
        sessions,
    }
}

/// Creates the configured admin account unless it already exists.
pub async fn seed_admin(state: &AppState) -> Result<Option<User>, AppError> {
    let (Some(email), Some(password)) = (&state.config.admin_email, &state.config.admin_password) else {
        return Ok(None);
    };

    if state.user_repo.find_by_email(email).await?.is_some() {
        return Ok(None);
    }

    let password_hash = hash_password(password)?;
    let admin = User::new(email.clone(), "Administrator".to_string(), password_hash, ROLE_ADMIN);
    let created = state.user_repo.create(&admin).await?;
    info!("Seeded admin user {}", created.id);
    Ok(Some(created))
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
