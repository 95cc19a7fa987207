use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingService {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub duration_minutes: i32,
    pub active: bool,
    pub deposit_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl BookingService {
    pub fn new(business_id: String, name: String, duration_minutes: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            business_id,
            name,
            duration_minutes,
            active: true,
            deposit_cents: None,
            created_at: Utc::now(),
        }
    }
}
