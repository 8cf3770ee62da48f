use crate::domain::models::{
    user::User, experience::Experience, slot::{ScheduleSlot, SlotChanges, PurgeReport}, booking::Booking,
    auth::RefreshSession,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Refresh-token store. Tokens are never deleted on rotation; they are marked
/// used so a replayed token can be recognised and its family revoked.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn store(&self, session: &RefreshSession) -> Result<(), AppError>;
    async fn find(&self, token_hash: &str) -> Result<Option<RefreshSession>, AppError>;
    /// Marks the token used and returns it, or `None` when it is unknown or
    /// was already used. Two concurrent claims of one token cannot both win.
    async fn claim(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<RefreshSession>, AppError>;
    async fn revoke_family(&self, family_id: Uuid) -> Result<u64, AppError>;
    async fn revoke_user(&self, user_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    async fn create(&self, experience: &Experience) -> Result<Experience, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Experience>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Experience>, AppError>;
    async fn list(&self, include_hidden: bool) -> Result<Vec<Experience>, AppError>;
    async fn update(&self, experience: &Experience) -> Result<Experience, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Schedule slots. Every capacity change goes through a conditional update so
/// `0 <= booked_slots <= total_slots` holds without a prior read.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn create(&self, slot: &ScheduleSlot) -> Result<ScheduleSlot, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleSlot>, AppError>;
    async fn find_by_start(&self, experience_id: &str, start: DateTime<Utc>) -> Result<Option<ScheduleSlot>, AppError>;
    async fn list_by_experience(&self, experience_id: &str) -> Result<Vec<ScheduleSlot>, AppError>;
    async fn list_open_after(&self, experience_id: &str, after: DateTime<Utc>) -> Result<Vec<ScheduleSlot>, AppError>;
    /// Moves, resizes and/or toggles the cancelled flag in one statement.
    /// Nothing is written when `total_slots` would drop below the booked count
    /// (`InvalidCapacity`).
    async fn apply_changes(&self, id: &str, changes: &SlotChanges) -> Result<ScheduleSlot, AppError>;
    /// Deletes the slot and its bookings; returns how many bookings went with it.
    async fn delete_cascade(&self, id: &str) -> Result<u64, AppError>;
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<PurgeReport, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Reserves `booking.number_of_people` on the slot and inserts the booking in one transaction.
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_all(&self) -> Result<Vec<Booking>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_slot(&self, slot_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn update_notes(&self, id: &str, notes: Option<String>) -> Result<Booking, AppError>;
    /// Marks the booking cancelled and releases its places.
    async fn cancel(&self, id: &str) -> Result<Booking, AppError>;
    /// Deletes the booking and releases its places (floored at zero).
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}
