pub mod auth;
pub mod booking;
pub mod cron;
pub mod experience;
pub mod health;
pub mod slot;
pub mod user;
