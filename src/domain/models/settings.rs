use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingMode {
    RequestOnly,
    InstantAllowed,
}

/// Per-tenant scheduling policy. One row per business.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingSettings {
    pub business_id: String,
    pub timezone: String,
    pub buffer_minutes: i32,
    pub min_notice_hours: i32,
    pub max_days_out: i32,
    pub booking_mode: BookingMode,
    pub notification_email: Option<String>,
    pub booking_key: String,
    pub created_at: DateTime<Utc>,
}

impl BookingSettings {
    pub fn new(business_id: String) -> Self {
        let booking_key: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        Self {
            business_id,
            timezone: "UTC".to_string(),
            buffer_minutes: 0,
            min_notice_hours: 0,
            max_days_out: 60,
            booking_mode: BookingMode::RequestOnly,
            notification_email: None,
            booking_key,
            created_at: Utc::now(),
        }
    }
}
