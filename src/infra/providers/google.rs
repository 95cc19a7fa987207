use crate::domain::models::calendar::{BusyInterval, CalendarProvider, TokenResponse};
use crate::domain::ports::CalendarProviderClient;
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use url::Url;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const GOOGLE_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

pub struct GoogleCalendarClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_endpoint: String,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        timeout_secs: u64,
    ) -> Self {
        Self::with_endpoints(
            client_id,
            client_secret,
            redirect_uri,
            timeout_secs,
            GOOGLE_TOKEN_ENDPOINT.to_string(),
            GOOGLE_CALENDAR_API.to_string(),
        )
    }

    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        timeout_secs: u64,
        token_endpoint: String,
        api_base: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build Google HTTP client");

        Self { client, client_id, client_secret, redirect_uri, token_endpoint, api_base }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, EngineError> {
        let res = self
            .client
            .post(&self.token_endpoint)
            .form(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(EngineError::AuthFailure(format!(
                "Google token endpoint returned {status}: {body}"
            )));
        }

        let token: GoogleTokenResponse = res
            .json()
            .await
            .map_err(|e| EngineError::ProviderRequest(format!("Malformed token response: {e}")))?;

        Ok(TokenResponse {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
            account_email: None,
        })
    }
}

#[async_trait]
impl CalendarProviderClient for GoogleCalendarClient {
    fn provider(&self) -> CalendarProvider {
        CalendarProvider::Google
    }

    fn authorization_url(&self, state: &str) -> String {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", GOOGLE_SCOPE),
                ("access_type", "offline"),
                ("state", state),
            ],
        )
        .expect("Google auth endpoint URL is valid");
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, EngineError> {
        self.token_request(&[
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, EngineError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn free_busy(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, EngineError> {
        let body = serde_json::json!({
            "timeMin": time_min.to_rfc3339(),
            "timeMax": time_max.to_rfc3339(),
            "items": [{ "id": "primary" }],
        });

        let res = self
            .client
            .post(format!("{}/freeBusy", self.api_base))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(EngineError::ProviderRequest(format!(
                "Google freeBusy returned {status}: {body}"
            )));
        }

        let parsed: GoogleFreeBusyResponse = res
            .json()
            .await
            .map_err(|e| EngineError::ProviderRequest(format!("Malformed freeBusy response: {e}")))?;

        let mut intervals: Vec<BusyInterval> = parsed
            .calendars
            .into_values()
            .flat_map(|c| c.busy)
            .map(|p| BusyInterval { start: p.start.with_timezone(&Utc), end: p.end.with_timezone(&Utc) })
            .collect();
        intervals.sort_by_key(|i| i.start);
        Ok(intervals)
    }
}

pub(crate) fn map_transport_error(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::ProviderTimeout(e.to_string())
    } else {
        EngineError::ProviderRequest(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct GoogleFreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, GoogleCalendarBusy>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarBusy {
    #[serde(default)]
    busy: Vec<GoogleBusyPeriod>,
}

#[derive(Debug, Deserialize)]
struct GoogleBusyPeriod {
    start: DateTime<chrono::FixedOffset>,
    end: DateTime<chrono::FixedOffset>,
}
