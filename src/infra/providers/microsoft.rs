use crate::domain::models::calendar::{BusyInterval, CalendarProvider, TokenResponse};
use crate::domain::ports::CalendarProviderClient;
use crate::error::EngineError;
use crate::infra::providers::google::map_transport_error;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use url::Url;

const MS_AUTH_ENDPOINT: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";
const MS_TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
const GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";
const MS_SCOPE: &str = "offline_access Calendars.Read";

pub struct MicrosoftCalendarClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_endpoint: String,
    api_base: String,
}

impl MicrosoftCalendarClient {
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
            MS_TOKEN_ENDPOINT.to_string(),
            GRAPH_ENDPOINT.to_string(),
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
            .expect("Failed to build Microsoft HTTP client");

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
                "Microsoft token endpoint returned {status}: {body}"
            )));
        }

        let token: MicrosoftTokenResponse = res
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
impl CalendarProviderClient for MicrosoftCalendarClient {
    fn provider(&self) -> CalendarProvider {
        CalendarProvider::Microsoft
    }

    fn authorization_url(&self, state: &str) -> String {
        let url = Url::parse_with_params(
            MS_AUTH_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("response_mode", "query"),
                ("scope", MS_SCOPE),
                ("state", state),
            ],
        )
        .expect("Microsoft auth endpoint URL is valid");
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, EngineError> {
        self.token_request(&[
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
            ("scope", MS_SCOPE),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, EngineError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("scope", MS_SCOPE),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    /// Graph has no direct free/busy query; `getSchedule` returns typed
    /// schedule items instead. Everything that is not `free` blocks time:
    /// busy, tentative, oof, workingElsewhere.
    async fn free_busy(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, EngineError> {
        let body = serde_json::json!({
            "schedules": ["primary"],
            "startTime": { "dateTime": time_min.to_rfc3339(), "timeZone": "UTC" },
            "endTime": { "dateTime": time_max.to_rfc3339(), "timeZone": "UTC" },
            "availabilityViewInterval": 15,
        });

        let res = self
            .client
            .post(format!("{}/me/calendar/getSchedule", self.api_base))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(EngineError::ProviderRequest(format!(
                "Microsoft getSchedule returned {status}: {body}"
            )));
        }

        let parsed: GetScheduleResponse = res
            .json()
            .await
            .map_err(|e| EngineError::ProviderRequest(format!("Malformed getSchedule response: {e}")))?;

        let mut intervals = Vec::new();
        for schedule in parsed.value {
            for item in schedule.schedule_items {
                if item.status.eq_ignore_ascii_case("free") {
                    continue;
                }
                if let (Some(start), Some(end)) =
                    (parse_graph_time(&item.start), parse_graph_time(&item.end))
                {
                    intervals.push(BusyInterval { start, end });
                }
            }
        }
        intervals.sort_by_key(|i| i.start);
        Ok(intervals)
    }
}

/// Graph emits local date-times like "2026-08-25T10:00:00.0000000" with the
/// zone carried separately; we always request UTC.
fn parse_graph_time(t: &GraphDateTime) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(&t.date_time, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
struct MicrosoftTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct GetScheduleResponse {
    #[serde(default)]
    value: Vec<ScheduleInformation>,
}

#[derive(Debug, Deserialize)]
struct ScheduleInformation {
    #[serde(rename = "scheduleItems", default)]
    schedule_items: Vec<ScheduleItem>,
}

#[derive(Debug, Deserialize)]
struct ScheduleItem {
    status: String,
    start: GraphDateTime,
    end: GraphDateTime,
}

#[derive(Debug, Deserialize)]
struct GraphDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
}
