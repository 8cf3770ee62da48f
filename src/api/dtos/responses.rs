use serde::Serialize;
use crate::domain::models::booking::Booking;
use crate::domain::models::experience::ExperienceView;
use crate::domain::models::slot::{ScheduleSlot, SlotAvailability};

#[derive(Serialize)]
pub struct ExperienceSlotsResponse {
    pub experience: ExperienceView,
    pub slots: Vec<SlotAvailability>,
}

#[derive(Serialize)]
pub struct BulkSlotsResponse {
    pub created: Vec<ScheduleSlot>,
    pub skipped: Vec<String>,
}

#[derive(Serialize)]
pub struct SlotDeletedResponse {
    pub status: &'static str,
    pub bookings_deleted: u64,
}

#[derive(Serialize)]
pub struct BookingWithSlot {
    #[serde(flatten)]
    pub booking: Booking,
    pub slot: Option<ScheduleSlot>,
}
