use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CalendarProvider {
    Google,
    Microsoft,
}

impl CalendarProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarProvider::Google => "google",
            CalendarProvider::Microsoft => "microsoft",
        }
    }
}

/// Per-tenant, per-provider credential record. Tokens are stored encrypted;
/// one row per (business, provider).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct CalendarConnection {
    pub id: String,
    pub business_id: String,
    pub provider: CalendarProvider,
    pub access_token_enc: String,
    pub refresh_token_enc: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub account_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarConnection {
    pub fn new(
        business_id: String,
        provider: CalendarProvider,
        access_token_enc: String,
        refresh_token_enc: Option<String>,
        expires_at: DateTime<Utc>,
        account_email: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            business_id,
            provider,
            access_token_enc,
            refresh_token_enc,
            expires_at,
            account_email,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Normalized provider free/busy shape. Consumers never see provider identity
/// past the adapter boundary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Result of an OAuth code exchange or refresh, decrypted form.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub account_email: Option<String>,
}
