pub mod auth;
pub mod cron;
pub mod json;
pub mod maybe_auth;
