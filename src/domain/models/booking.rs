use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const STATUS_CONFIRMED: &str = "CONFIRMED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub slot_id: String,
    pub number_of_people: i32,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(user_id: String, slot_id: String, number_of_people: i32, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            slot_id,
            number_of_people,
            notes,
            status: STATUS_CONFIRMED.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == STATUS_CANCELLED
    }

    /// Places this booking currently holds on its slot.
    pub fn held_places(&self) -> i32 {
        if self.is_cancelled() { 0 } else { self.number_of_people }
    }
}
