use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Requested,
    ProposedTime,
    Approved,
    Declined,
    Completed,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Requested => "REQUESTED",
            BookingStatus::ProposedTime => "PROPOSED_TIME",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Declined => "DECLINED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Canceled => "CANCELED",
        }
    }

    /// Terminal bookings no longer occupy calendar time.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Declined | BookingStatus::Completed | BookingStatus::Canceled
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingRequest {
    pub id: String,
    pub business_id: String,
    pub service_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub preferred_start: Option<DateTime<Utc>>,
    pub preferred_end: Option<DateTime<Utc>>,
    pub proposed_start: Option<DateTime<Utc>>,
    pub proposed_end: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub business_id: String,
    pub service_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub instant: bool,
}

impl BookingRequest {
    pub fn new(params: NewBookingParams) -> Self {
        let end = params.start + chrono::Duration::minutes(params.duration_min as i64);
        let now = Utc::now();

        // Instant bookings land as APPROVED with an authoritative interval;
        // requests carry the customer's preference until the business answers.
        let (status, proposed_start, proposed_end) = if params.instant {
            (BookingStatus::Approved, Some(params.start), Some(end))
        } else {
            (BookingStatus::Requested, None, None)
        };

        Self {
            id: Uuid::new_v4().to_string(),
            business_id: params.business_id,
            service_id: params.service_id,
            customer_name: params.customer_name,
            customer_email: params.customer_email,
            customer_phone: params.customer_phone,
            preferred_start: Some(params.start),
            preferred_end: Some(end),
            proposed_start,
            proposed_end,
            status,
            internal_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The interval this booking occupies: the proposed interval once set,
    /// the customer's preference before that.
    pub fn occupied_interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.proposed_start, self.proposed_end) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => match (self.preferred_start, self.preferred_end) {
                (Some(s), Some(e)) => Some((s, e)),
                _ => None,
            },
        }
    }
}
