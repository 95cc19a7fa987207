use crate::domain::{
    models::availability::{AvailabilityException, AvailabilityWindow},
    ports::{AvailabilityExceptionRepository, AvailabilityWindowRepository},
};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteWindowRepo {
    pool: SqlitePool,
}

impl SqliteWindowRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityWindowRepository for SqliteWindowRepo {
    async fn create(&self, window: &AvailabilityWindow) -> Result<AvailabilityWindow, EngineError> {
        sqlx::query_as::<_, AvailabilityWindow>(
            "INSERT INTO availability_windows (id, business_id, day_of_week, start_time, end_time, is_enabled, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&window.id).bind(&window.business_id).bind(window.day_of_week)
        .bind(&window.start_time).bind(&window.end_time).bind(window.is_enabled).bind(window.created_at)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn list_by_business(&self, business_id: &str) -> Result<Vec<AvailabilityWindow>, EngineError> {
        sqlx::query_as::<_, AvailabilityWindow>(
            "SELECT * FROM availability_windows WHERE business_id = ? ORDER BY day_of_week, start_time",
        )
        .bind(business_id).fetch_all(&self.pool).await.map_err(EngineError::Database)
    }

    async fn delete(&self, business_id: &str, id: &str) -> Result<(), EngineError> {
        let result = sqlx::query("DELETE FROM availability_windows WHERE id = ? AND business_id = ?")
            .bind(id).bind(business_id).execute(&self.pool).await.map_err(EngineError::Database)?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound("Availability window not found".into()));
        }
        Ok(())
    }
}

pub struct SqliteExceptionRepo {
    pool: SqlitePool,
}

impl SqliteExceptionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityExceptionRepository for SqliteExceptionRepo {
    async fn create(&self, exception: &AvailabilityException) -> Result<AvailabilityException, EngineError> {
        sqlx::query_as::<_, AvailabilityException>(
            "INSERT INTO availability_exceptions (id, business_id, date, start_time, end_time, kind, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&exception.id).bind(&exception.business_id).bind(exception.date)
        .bind(&exception.start_time).bind(&exception.end_time).bind(exception.kind).bind(exception.created_at)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn list_by_date(&self, business_id: &str, date: NaiveDate) -> Result<Vec<AvailabilityException>, EngineError> {
        sqlx::query_as::<_, AvailabilityException>(
            "SELECT * FROM availability_exceptions WHERE business_id = ? AND date = ?",
        )
        .bind(business_id).bind(date).fetch_all(&self.pool).await.map_err(EngineError::Database)
    }

    async fn delete(&self, business_id: &str, id: &str) -> Result<(), EngineError> {
        let result = sqlx::query("DELETE FROM availability_exceptions WHERE id = ? AND business_id = ?")
            .bind(id).bind(business_id).execute(&self.pool).await.map_err(EngineError::Database)?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound("Availability exception not found".into()));
        }
        Ok(())
    }
}
