use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Opaque public booking code, optionally paired with a vanity slug.
/// Immutable once created except for the slug.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingPublicLink {
    pub code: String,
    pub business_id: String,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookingPublicLink {
    pub fn new(business_id: String, slug: Option<String>) -> Self {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();

        Self {
            code,
            business_id,
            slug,
            created_at: Utc::now(),
        }
    }
}
