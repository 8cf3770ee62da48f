use crate::domain::{models::{booking::{Booking, STATUS_CANCELLED}, slot::ScheduleSlot}, ports::BookingRepository};
use crate::domain::services::capacity::{check_reservation, validate_people};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn release_places(tx: &mut Transaction<'_, Postgres>, slot_id: &str, places: i32) -> Result<(), AppError> {
    if places == 0 {
        return Ok(());
    }
    sqlx::query("UPDATE schedule_slots SET booked_slots = GREATEST(booked_slots - $1, 0) WHERE id = $2")
        .bind(places)
        .bind(slot_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        validate_people(booking.number_of_people)?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // The row lock taken by this UPDATE serializes concurrent reservations on the slot.
        let reserved = sqlx::query(
            "UPDATE schedule_slots SET booked_slots = booked_slots + $1
             WHERE id = $2 AND NOT is_cancelled AND booked_slots <= total_slots - $1"
        )
            .bind(booking.number_of_people)
            .bind(&booking.slot_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if reserved.rows_affected() == 0 {
            let slot = sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedule_slots WHERE id = $1")
                .bind(&booking.slot_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?
                .ok_or(AppError::NotFound("Slot not found".into()))?;

            if let Err(e) = check_reservation(&slot, booking.number_of_people) {
                warn!("Booking rejected on slot {}: {}", slot.id, e);
                return Err(e);
            }
            return Err(AppError::InternalWithMsg(format!("Reservation on slot {} matched no row", slot.id)));
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, slot_id, number_of_people, notes, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.slot_id)
            .bind(booking.number_of_people).bind(&booking.notes).bind(&booking.status)
            .bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC").bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_slot(&self, slot_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE slot_id = $1 ORDER BY created_at ASC").bind(slot_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_notes(&self, id: &str, notes: Option<String>) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET notes = $1 WHERE id = $2 RETURNING *")
            .bind(notes)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        if booking.is_cancelled() {
            return Err(AppError::Validation("Booking is already cancelled".into()));
        }

        release_places(&mut tx, &booking.slot_id, booking.held_places()).await?;

        let cancelled = sqlx::query_as::<_, Booking>("UPDATE bookings SET status = $1 WHERE id = $2 RETURNING *")
            .bind(STATUS_CANCELLED)
            .bind(id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        release_places(&mut tx, &booking.slot_id, booking.held_places()).await?;

        sqlx::query("DELETE FROM bookings WHERE id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
