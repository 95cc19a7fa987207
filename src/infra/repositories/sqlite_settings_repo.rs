use crate::domain::{models::settings::BookingSettings, ports::SettingsRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSettingsRepo {
    pool: SqlitePool,
}

impl SqliteSettingsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepo {
    async fn upsert(&self, settings: &BookingSettings) -> Result<BookingSettings, EngineError> {
        sqlx::query_as::<_, BookingSettings>(
            "INSERT INTO booking_settings (business_id, timezone, buffer_minutes, min_notice_hours, max_days_out, booking_mode, notification_email, booking_key, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(business_id) DO UPDATE SET
               timezone=excluded.timezone, buffer_minutes=excluded.buffer_minutes,
               min_notice_hours=excluded.min_notice_hours, max_days_out=excluded.max_days_out,
               booking_mode=excluded.booking_mode, notification_email=excluded.notification_email
             RETURNING *",
        )
        .bind(&settings.business_id).bind(&settings.timezone).bind(settings.buffer_minutes)
        .bind(settings.min_notice_hours).bind(settings.max_days_out).bind(settings.booking_mode)
        .bind(&settings.notification_email).bind(&settings.booking_key).bind(settings.created_at)
        .fetch_one(&self.pool).await.map_err(EngineError::Database)
    }

    async fn find_by_business(&self, business_id: &str) -> Result<Option<BookingSettings>, EngineError> {
        sqlx::query_as::<_, BookingSettings>("SELECT * FROM booking_settings WHERE business_id = ?")
            .bind(business_id).fetch_optional(&self.pool).await.map_err(EngineError::Database)
    }
}
