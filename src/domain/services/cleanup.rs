use std::sync::Arc;
use chrono::{DateTime, Months, Utc};
use tracing::info;
use crate::domain::models::slot::PurgeReport;
use crate::domain::ports::SlotRepository;
use crate::error::AppError;

/// Everything scheduled before this instant is expired.
pub fn cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(1)).unwrap_or(now)
}

pub async fn purge_expired(slot_repo: &Arc<dyn SlotRepository>, now: DateTime<Utc>) -> Result<PurgeReport, AppError> {
    let cutoff = cutoff(now);
    let report = slot_repo.purge_before(cutoff).await?;
    info!(
        cutoff = %cutoff,
        bookings_deleted = report.bookings_deleted,
        slots_deleted = report.slots_deleted,
        "Expired schedule data purged"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cutoff_is_one_calendar_month_back() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(cutoff(now), Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap());

        let now = Utc.with_ymd_and_hms(2025, 6, 15, 8, 0, 0).unwrap();
        assert_eq!(cutoff(now), Utc.with_ymd_and_hms(2025, 5, 15, 8, 0, 0).unwrap());
    }
}
