use crate::domain::{models::booking::BookingRequest, ports::BookingRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &BookingRequest) -> Result<BookingRequest, EngineError> {
        sqlx::query_as::<_, BookingRequest>(
            "INSERT INTO booking_requests (id, business_id, service_id, customer_name, customer_email, customer_phone, preferred_start, preferred_end, proposed_start, proposed_end, status, internal_notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&booking.id).bind(&booking.business_id).bind(&booking.service_id)
        .bind(&booking.customer_name).bind(&booking.customer_email).bind(&booking.customer_phone)
        .bind(booking.preferred_start).bind(booking.preferred_end)
        .bind(booking.proposed_start).bind(booking.proposed_end)
        .bind(booking.status).bind(&booking.internal_notes)
        .bind(booking.created_at).bind(booking.updated_at)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<BookingRequest>, EngineError> {
        sqlx::query_as::<_, BookingRequest>("SELECT * FROM booking_requests WHERE business_id = ? AND id = ?")
            .bind(business_id).bind(id).fetch_optional(&self.pool).await.map_err(EngineError::Database)
    }

    async fn list_by_business(&self, business_id: &str) -> Result<Vec<BookingRequest>, EngineError> {
        sqlx::query_as::<_, BookingRequest>(
            "SELECT * FROM booking_requests WHERE business_id = ? ORDER BY created_at DESC",
        )
        .bind(business_id).fetch_all(&self.pool).await.map_err(EngineError::Database)
    }

    async fn list_by_range(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BookingRequest>, EngineError> {
        // Non-terminal bookings overlapping [start, end), on whichever
        // interval currently holds them (proposed wins over preferred).
        sqlx::query_as::<_, BookingRequest>(
            "SELECT * FROM booking_requests
             WHERE business_id = ?
               AND status NOT IN ('DECLINED', 'COMPLETED', 'CANCELED')
               AND COALESCE(proposed_start, preferred_start) < ?
               AND COALESCE(proposed_end, preferred_end) > ?",
        )
        .bind(business_id).bind(end).bind(start)
        .fetch_all(&self.pool).await.map_err(EngineError::Database)
    }

    async fn update(&self, booking: &BookingRequest) -> Result<BookingRequest, EngineError> {
        sqlx::query_as::<_, BookingRequest>(
            "UPDATE booking_requests SET service_id=?, customer_name=?, customer_email=?, customer_phone=?,
               preferred_start=?, preferred_end=?, proposed_start=?, proposed_end=?, status=?, internal_notes=?, updated_at=?
             WHERE id=? AND business_id=?
             RETURNING *",
        )
        .bind(&booking.service_id).bind(&booking.customer_name).bind(&booking.customer_email).bind(&booking.customer_phone)
        .bind(booking.preferred_start).bind(booking.preferred_end)
        .bind(booking.proposed_start).bind(booking.proposed_end)
        .bind(booking.status).bind(&booking.internal_notes).bind(booking.updated_at)
        .bind(&booking.id).bind(&booking.business_id)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn delete(&self, business_id: &str, id: &str) -> Result<(), EngineError> {
        let result = sqlx::query("DELETE FROM booking_requests WHERE id = ? AND business_id = ?")
            .bind(id).bind(business_id).execute(&self.pool).await.map_err(EngineError::Database)?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound("Booking not found".into()));
        }
        Ok(())
    }
}
