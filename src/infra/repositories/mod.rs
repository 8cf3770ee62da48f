pub mod sqlite_user_repo;
pub mod sqlite_session_repo;
pub mod sqlite_experience_repo;
pub mod sqlite_slot_repo;
pub mod sqlite_booking_repo;

pub mod postgres_user_repo;
pub mod postgres_session_repo;
pub mod postgres_experience_repo;
pub mod postgres_slot_repo;
pub mod postgres_booking_repo;
