//! Booking persistence

use async_trait::async_trait;
use sqlx::{types::Json, Pool, Postgres};

use super::conflict_on_unique;
use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, BookingRow, BookingStatus, NewBooking},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// List bookings, newest first
    async fn list(&self) -> AppResult<Vec<Booking>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Booking>;

    /// Store a priced booking; a duplicate code is a conflict
    async fn insert(&self, booking: &NewBooking) -> AppResult<Booking>;

    /// Compare-and-set the status. Returns `None` when the stored status is no
    /// longer `current`.
    async fn set_status(
        &self,
        id: i32,
        current: BookingStatus,
        next: BookingStatus,
    ) -> AppResult<Option<Booking>>;
}

#[derive(Clone)]
pub struct PgBookingRepository {
    pool: Pool<Postgres>,
}

impl PgBookingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn list(&self) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Booking::from)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn insert(&self, booking: &NewBooking) -> AppResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings (
                booking_id, source_quotation_id, customer_id, customer_name, customer_phone,
                start_date, end_date, items, total_amount, security_deposit, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&booking.booking_id)
        .bind(booking.source_quotation_id)
        .bind(booking.customer_id)
        .bind(&booking.customer_name)
        .bind(&booking.customer_phone)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(Json(&booking.items))
        .bind(booking.total_amount)
        .bind(booking.security_deposit)
        .bind(booking.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique("Booking id already exists"))?;
        Ok(row.into())
    }

    async fn set_status(
        &self,
        id: i32,
        current: BookingStatus,
        next: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            UPDATE bookings SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(current.as_str())
        .bind(next.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Booking::from))
    }
}
