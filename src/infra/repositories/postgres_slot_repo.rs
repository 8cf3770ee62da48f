use crate::domain::{models::slot::{ScheduleSlot, SlotChanges, PurgeReport}, ports::SlotRepository};
use crate::domain::services::capacity::{check_resize, validate_total};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::{DateTime, Utc};

pub struct PostgresSlotRepo {
    pool: PgPool,
}

impl PostgresSlotRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotRepository for PostgresSlotRepo {
    async fn create(&self, slot: &ScheduleSlot) -> Result<ScheduleSlot, AppError> {
        sqlx::query_as::<_, ScheduleSlot>(
            r#"INSERT INTO schedule_slots (id, experience_id, start_time, total_slots, booked_slots, is_cancelled, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#
        )
            .bind(&slot.id)
            .bind(&slot.experience_id)
            .bind(slot.start_time)
            .bind(slot.total_slots)
            .bind(slot.booked_slots)
            .bind(slot.is_cancelled)
            .bind(slot.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleSlot>, AppError> {
        sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedule_slots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_start(&self, experience_id: &str, start: DateTime<Utc>) -> Result<Option<ScheduleSlot>, AppError> {
        sqlx::query_as::<_, ScheduleSlot>(
            "SELECT * FROM schedule_slots WHERE experience_id = $1 AND start_time = $2"
        )
            .bind(experience_id)
            .bind(start)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_experience(&self, experience_id: &str) -> Result<Vec<ScheduleSlot>, AppError> {
        sqlx::query_as::<_, ScheduleSlot>(
            "SELECT * FROM schedule_slots WHERE experience_id = $1 ORDER BY start_time ASC"
        )
            .bind(experience_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_open_after(&self, experience_id: &str, after: DateTime<Utc>) -> Result<Vec<ScheduleSlot>, AppError> {
        sqlx::query_as::<_, ScheduleSlot>(
            "SELECT * FROM schedule_slots WHERE experience_id = $1 AND start_time > $2 AND NOT is_cancelled ORDER BY start_time ASC"
        )
            .bind(experience_id)
            .bind(after)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn apply_changes(&self, id: &str, changes: &SlotChanges) -> Result<ScheduleSlot, AppError> {
        if let Some(new_total) = changes.total_slots {
            validate_total(new_total)?;
        }

        let updated = sqlx::query_as::<_, ScheduleSlot>(
            "UPDATE schedule_slots SET
                start_time = COALESCE($1, start_time),
                is_cancelled = COALESCE($2, is_cancelled),
                total_slots = COALESCE($3, total_slots)
             WHERE id = $4 AND booked_slots <= COALESCE($3, total_slots)
             RETURNING *"
        )
            .bind(changes.start_time)
            .bind(changes.is_cancelled)
            .bind(changes.total_slots)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if let Some(slot) = updated {
            return Ok(slot);
        }

        let slot = self.find_by_id(id).await?
            .ok_or(AppError::NotFound("Slot not found".into()))?;
        if let Some(new_total) = changes.total_slots {
            check_resize(&slot, new_total)?;
        }
        Err(AppError::InternalWithMsg(format!("Update of slot {} matched no row", id)))
    }

    async fn delete_cascade(&self, id: &str) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let bookings = sqlx::query("DELETE FROM bookings WHERE slot_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let slot = sqlx::query("DELETE FROM schedule_slots WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if slot.rows_affected() == 0 {
            return Err(AppError::NotFound("Slot not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(bookings.rows_affected())
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<PurgeReport, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let bookings = sqlx::query(
            "DELETE FROM bookings WHERE slot_id IN (SELECT id FROM schedule_slots WHERE start_time < $1)"
        )
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let slots = sqlx::query("DELETE FROM schedule_slots WHERE start_time < $1")
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(PurgeReport {
            bookings_deleted: bookings.rows_affected(),
            slots_deleted: slots.rows_affected(),
        })
    }
}
