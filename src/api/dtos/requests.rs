use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateExperienceRequest {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub duration_min: i32,
    #[serde(default)]
    pub images: Vec<String>,
    pub frequency: Vec<String>,
    pub is_visible: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateExperienceRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub duration_min: Option<i32>,
    pub images: Option<Vec<String>>,
    pub frequency: Option<Vec<String>>,
    pub is_visible: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateSlotRequest {
    pub date: DateTime<Utc>,
    pub total_slots: i32,
}

#[derive(Deserialize)]
pub struct CreateSlotsInRangeRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Wall-clock start in the business time zone, `HH:MM`.
    pub time: String,
    pub total_slots: i32,
}

#[derive(Deserialize)]
pub struct UpdateSlotRequest {
    pub date: Option<DateTime<Utc>>,
    pub total_slots: Option<i32>,
    pub is_cancelled: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(alias = "slot_id")]
    pub slot_id: Option<String>,
    #[serde(alias = "number_of_people")]
    pub number_of_people: Option<i32>,
    pub notes: Option<String>,
    /// Admin bookings on behalf of another user.
    #[serde(alias = "user_id")]
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBookingRequest {
    pub notes: Option<String>,
}
