use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use crate::domain::models::experience::{Experience, weekday_name};
use crate::domain::models::slot::ScheduleSlot;
use crate::error::AppError;

pub const MAX_RANGE_DAYS: i64 = 366;

pub fn validate_people(number_of_people: i32) -> Result<(), AppError> {
    if number_of_people < 1 {
        return Err(AppError::Validation("numberOfPeople must be a positive integer".into()));
    }
    Ok(())
}

pub fn validate_total(total_slots: i32) -> Result<(), AppError> {
    if total_slots < 1 {
        return Err(AppError::Validation("totalSlots must be a positive integer".into()));
    }
    Ok(())
}

/// Explains why `number_of_people` cannot be reserved on `slot`.
/// Returns `Ok(())` when the reservation fits.
pub fn check_reservation(slot: &ScheduleSlot, number_of_people: i32) -> Result<(), AppError> {
    if slot.is_cancelled {
        return Err(AppError::SlotCancelled);
    }
    let remaining = slot.remaining();
    if remaining < number_of_people {
        return Err(AppError::CapacityExceeded { requested: number_of_people, remaining });
    }
    Ok(())
}

pub fn check_resize(slot: &ScheduleSlot, new_total: i32) -> Result<(), AppError> {
    validate_total(new_total)?;
    if new_total < slot.booked_slots {
        return Err(AppError::InvalidCapacity { new_total, booked: slot.booked_slots });
    }
    Ok(())
}

/// Booked count after `released` places are handed back, never below zero.
pub fn release(booked_slots: i32, released: i32) -> i32 {
    (booked_slots - released).max(0)
}

pub fn weekday_in(start: DateTime<Utc>, tz: Tz) -> Weekday {
    start.with_timezone(&tz).weekday()
}

pub fn check_day_allowed(experience: &Experience, start: DateTime<Utc>, tz: Tz) -> Result<(), AppError> {
    let day = weekday_in(start, tz);
    if !experience.allows(day) {
        return Err(AppError::DayNotAllowed(format!(
            "{} is not an allowed day for {}",
            weekday_name(day),
            experience.name
        )));
    }
    Ok(())
}

/// Resolves a wall-clock date and time in the business zone to UTC.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>, AppError> {
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))
}

/// Dates in `[start, end]` whose weekday is in `allowed`.
pub fn allowed_dates(start: NaiveDate, end: NaiveDate, allowed: &[Weekday]) -> Result<Vec<NaiveDate>, AppError> {
    if end < start {
        return Err(AppError::Validation("end_date must not be before start_date".into()));
    }
    if (end - start).num_days() >= MAX_RANGE_DAYS {
        return Err(AppError::Validation(format!("Range may span at most {} days", MAX_RANGE_DAYS)));
    }
    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| allowed.contains(&d.weekday()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::experience::NewExperienceParams;

    fn slot(total: i32, booked: i32) -> ScheduleSlot {
        let mut s = ScheduleSlot::new("exp".into(), Utc::now(), total);
        s.booked_slots = booked;
        s
    }

    fn experience(days: Vec<Weekday>) -> Experience {
        Experience::new(NewExperienceParams {
            name: "Wine Tour".into(),
            slug: "wine-tour".into(),
            description: ".".into(),
            price: 80.0,
            location: "Valley".into(),
            duration_min: 180,
            images: vec![],
            frequency: days,
            is_visible: true,
        })
    }

    #[test]
    fn test_reservation_over_remaining_is_rejected() {
        let s = slot(10, 8);
        match check_reservation(&s, 3) {
            Err(AppError::CapacityExceeded { requested, remaining }) => {
                assert_eq!(requested, 3);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
        assert!(check_reservation(&s, 2).is_ok());
    }

    #[test]
    fn test_cancelled_slot_rejects_before_capacity() {
        let mut s = slot(10, 0);
        s.is_cancelled = true;
        assert!(matches!(check_reservation(&s, 1), Err(AppError::SlotCancelled)));
    }

    #[test]
    fn test_resize_below_booked_is_rejected() {
        let s = slot(10, 6);
        assert!(matches!(check_resize(&s, 5), Err(AppError::InvalidCapacity { new_total: 5, booked: 6 })));
        assert!(check_resize(&s, 6).is_ok());
        assert!(matches!(check_resize(&s, 0), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_release_floors_at_zero() {
        assert_eq!(release(5, 3), 2);
        assert_eq!(release(2, 3), 0);
    }

    #[test]
    fn test_people_must_be_positive() {
        assert!(validate_people(1).is_ok());
        assert!(validate_people(0).is_err());
        assert!(validate_people(-4).is_err());
    }

    #[test]
    fn test_weekday_uses_business_zone() {
        // 2025-03-03 is a Monday; 23:30 UTC is already Tuesday in Athens.
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 23, 30, 0).unwrap();
        assert_eq!(weekday_in(start, chrono_tz::UTC), Weekday::Mon);
        assert_eq!(weekday_in(start, chrono_tz::Europe::Athens), Weekday::Tue);

        let exp = experience(vec![Weekday::Mon]);
        assert!(check_day_allowed(&exp, start, chrono_tz::UTC).is_ok());
        assert!(matches!(
            check_day_allowed(&exp, start, chrono_tz::Europe::Athens),
            Err(AppError::DayNotAllowed(_))
        ));
    }

    #[test]
    fn test_allowed_dates_filters_weekdays() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        let dates = allowed_dates(start, end, &[Weekday::Mon, Weekday::Sat]).unwrap();
        let expected: Vec<NaiveDate> = [3, 8, 10, 15]
            .iter()
            .map(|d| NaiveDate::from_ymd_opt(2025, 3, *d).unwrap())
            .collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_allowed_dates_rejects_bad_ranges() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert!(allowed_dates(start, start.pred_opt().unwrap(), &[Weekday::Mon]).is_err());
        let far = start + chrono::Duration::days(MAX_RANGE_DAYS);
        assert!(allowed_dates(start, far, &[Weekday::Mon]).is_err());
    }
}
