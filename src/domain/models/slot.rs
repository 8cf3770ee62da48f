use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleSlot {
    pub id: String,
    pub experience_id: String,
    pub start_time: DateTime<Utc>,
    pub total_slots: i32,
    pub booked_slots: i32,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
}

impl ScheduleSlot {
    pub fn new(experience_id: String, start_time: DateTime<Utc>, total_slots: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            experience_id,
            start_time,
            total_slots,
            booked_slots: 0,
            is_cancelled: false,
            created_at: Utc::now(),
        }
    }

    pub fn remaining(&self) -> i32 {
        (self.total_slots - self.booked_slots).max(0)
    }
}

/// Partial slot update; `None` leaves the column unchanged.
#[derive(Debug, Default, Clone)]
pub struct SlotChanges {
    pub start_time: Option<DateTime<Utc>>,
    pub total_slots: Option<i32>,
    pub is_cancelled: Option<bool>,
}

impl SlotChanges {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.total_slots.is_none() && self.is_cancelled.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct SlotAvailability {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub total_slots: i32,
    pub booked_slots: i32,
    pub remaining: i32,
}

impl From<ScheduleSlot> for SlotAvailability {
    fn from(s: ScheduleSlot) -> Self {
        let remaining = s.remaining();
        Self {
            id: s.id,
            start_time: s.start_time,
            total_slots: s.total_slots,
            booked_slots: s.booked_slots,
            remaining,
        }
    }
}

/// Rows removed by a cleanup run.
#[derive(Debug, Serialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub bookings_deleted: u64,
    pub slots_deleted: u64,
}
