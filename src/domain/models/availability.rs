use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recurring weekly opening rule. `day_of_week` is 0 = Sunday .. 6 = Saturday,
/// times are local "HH:MM" in the business timezone.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityWindow {
    pub id: String,
    pub business_id: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    pub fn new(business_id: String, day_of_week: i32, start_time: String, end_time: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            business_id,
            day_of_week,
            start_time,
            end_time,
            is_enabled: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionKind {
    Blocked,
    Open,
}

/// Date-scoped override. Absent times mean the whole day.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityException {
    pub id: String,
    pub business_id: String,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub kind: ExceptionKind,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityException {
    pub fn new(business_id: String, date: NaiveDate, kind: ExceptionKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            business_id,
            date,
            start_time: None,
            end_time: None,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn whole_day(&self) -> bool {
        self.start_time.is_none() || self.end_time.is_none()
    }
}
