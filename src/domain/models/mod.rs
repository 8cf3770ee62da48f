pub mod auth;
pub mod booking;
pub mod experience;
pub mod slot;
pub mod user;
