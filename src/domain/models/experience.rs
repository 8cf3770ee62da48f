use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Weekday};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Experience {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub duration_min: i32,
    pub images_json: String,
    pub frequency_json: String,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewExperienceParams {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub duration_min: i32,
    pub images: Vec<String>,
    pub frequency: Vec<Weekday>,
    pub is_visible: bool,
}

impl Experience {
    pub fn new(params: NewExperienceParams) -> Self {
        let mut experience = Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            slug: params.slug,
            description: params.description,
            price: params.price,
            location: params.location,
            duration_min: params.duration_min,
            images_json: "[]".to_string(),
            frequency_json: "[]".to_string(),
            is_visible: params.is_visible,
            created_at: Utc::now(),
        };
        experience.set_images(&params.images);
        experience.set_frequency(&params.frequency);
        experience
    }

    pub fn images(&self) -> Vec<String> {
        serde_json::from_str(&self.images_json).unwrap_or_default()
    }

    pub fn set_images(&mut self, images: &[String]) {
        self.images_json = serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string());
    }

    /// Allowed weekdays; unknown names stored by older writers are ignored.
    pub fn frequency(&self) -> Vec<Weekday> {
        let names: Vec<String> = serde_json::from_str(&self.frequency_json).unwrap_or_default();
        names.iter().filter_map(|n| parse_weekday(n)).collect()
    }

    pub fn set_frequency(&mut self, days: &[Weekday]) {
        let mut sorted: Vec<Weekday> = days.to_vec();
        sorted.sort_by_key(|d| d.num_days_from_monday());
        sorted.dedup();
        let names: Vec<&str> = sorted.iter().map(|d| weekday_name(*d)).collect();
        self.frequency_json = serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string());
    }

    pub fn allows(&self, day: Weekday) -> bool {
        self.frequency().contains(&day)
    }
}

pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Public shape of an experience with the JSON columns unpacked.
#[derive(Debug, Serialize)]
pub struct ExperienceView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub duration_min: i32,
    pub images: Vec<String>,
    pub frequency: Vec<&'static str>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Experience> for ExperienceView {
    fn from(e: Experience) -> Self {
        let images = e.images();
        let frequency = e.frequency().into_iter().map(weekday_name).collect();
        Self {
            id: e.id,
            name: e.name,
            slug: e.slug,
            description: e.description,
            price: e.price,
            location: e.location,
            duration_min: e.duration_min,
            images,
            frequency,
            is_visible: e.is_visible,
            created_at: e.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(frequency: Vec<Weekday>) -> Experience {
        Experience::new(NewExperienceParams {
            name: "Sunset Kayak".into(),
            slug: "sunset-kayak".into(),
            description: "Paddle at dusk".into(),
            price: 45.0,
            location: "Harbour".into(),
            duration_min: 120,
            images: vec!["a.jpg".into()],
            frequency,
            is_visible: true,
        })
    }

    #[test]
    fn test_frequency_is_normalized() {
        let exp = sample(vec![Weekday::Fri, Weekday::Mon, Weekday::Fri]);
        assert_eq!(exp.frequency_json, r#"["Monday","Friday"]"#);
        assert!(exp.allows(Weekday::Mon));
        assert!(!exp.allows(Weekday::Tue));
    }

    #[test]
    fn test_parse_weekday_is_case_insensitive() {
        assert_eq!(parse_weekday("saturday"), Some(Weekday::Sat));
        assert_eq!(parse_weekday(" SUNDAY "), Some(Weekday::Sun));
        assert_eq!(parse_weekday("Someday"), None);
    }
}
