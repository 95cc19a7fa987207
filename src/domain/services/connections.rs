use crate::domain::models::calendar::{
    BusyInterval, CalendarConnection, CalendarProvider, TokenResponse,
};
use crate::domain::ports::{CalendarProviderClient, ConnectionRepository};
use crate::error::EngineError;
use crate::infra::crypto::token_vault::TokenVault;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Tokens are refreshed ahead of their actual expiry so a token handed to a
/// provider call cannot expire mid-flight.
const EXPIRY_SKEW_MINUTES: i64 = 5;

/// Per-tenant, per-provider credential lifecycle: lazy refresh inline with the
/// request that needs a fresh token, last successful write wins.
pub struct CalendarConnectionManager {
    connection_repo: Arc<dyn ConnectionRepository>,
    vault: Arc<TokenVault>,
    providers: HashMap<CalendarProvider, Arc<dyn CalendarProviderClient>>,
}

impl CalendarConnectionManager {
    pub fn new(
        connection_repo: Arc<dyn ConnectionRepository>,
        vault: Arc<TokenVault>,
        providers: HashMap<CalendarProvider, Arc<dyn CalendarProviderClient>>,
    ) -> Self {
        Self { connection_repo, vault, providers }
    }

    fn client(
        &self,
        provider: CalendarProvider,
    ) -> Result<&Arc<dyn CalendarProviderClient>, EngineError> {
        self.providers.get(&provider).ok_or_else(|| {
            EngineError::Configuration(format!(
                "No client configured for provider {}",
                provider.as_str()
            ))
        })
    }

    /// Builds the provider consent URL with an opaque state token binding the
    /// flow to this tenant.
    pub fn authorization_url(
        &self,
        business_id: &str,
        provider: CalendarProvider,
    ) -> Result<String, EngineError> {
        let state = self.seal_state(business_id)?;
        Ok(self.client(provider)?.authorization_url(&state))
    }

    /// State is the tenant id plus a nonce, sealed with the token vault. Only
    /// this process can mint or open one, which pins the OAuth callback to the
    /// tenant that started the flow.
    pub fn seal_state(&self, business_id: &str) -> Result<String, EngineError> {
        self.vault
            .encrypt(&format!("{}:{}", business_id, Uuid::new_v4()))
    }

    pub fn verify_state(&self, state: &str) -> Result<String, EngineError> {
        let opened = self.vault.decrypt(state)?;
        let (business_id, _nonce) = opened
            .split_once(':')
            .ok_or_else(|| EngineError::AuthFailure("Malformed OAuth state".into()))?;
        Ok(business_id.to_string())
    }

    /// OAuth callback: verify state, exchange the code, persist the encrypted
    /// tokens. A missing refresh token is expected on re-consent and must not
    /// clobber the one already stored.
    pub async fn complete_oauth(
        &self,
        provider: CalendarProvider,
        code: &str,
        state: &str,
    ) -> Result<CalendarConnection, EngineError> {
        let business_id = self.verify_state(state)?;
        let tokens = self.client(provider)?.exchange_code(code).await?;

        let existing = self.connection_repo.find(&business_id, provider).await?;

        let access_token_enc = self.vault.encrypt(&tokens.access_token)?;
        let refresh_token_enc = match &tokens.refresh_token {
            Some(rt) => Some(self.vault.encrypt(rt)?),
            None => existing.as_ref().and_then(|c| c.refresh_token_enc.clone()),
        };

        let connection = match existing {
            Some(mut conn) => {
                conn.access_token_enc = access_token_enc;
                conn.refresh_token_enc = refresh_token_enc;
                conn.expires_at = tokens.expires_at;
                conn.account_email = tokens.account_email.or(conn.account_email);
                conn.updated_at = Utc::now();
                conn
            }
            None => CalendarConnection::new(
                business_id.clone(),
                provider,
                access_token_enc,
                refresh_token_enc,
                tokens.expires_at,
                tokens.account_email,
            ),
        };

        let saved = self.connection_repo.upsert(&connection).await?;
        info!(
            "Calendar connection established for business {} ({})",
            business_id,
            provider.as_str()
        );
        Ok(saved)
    }

    /// Returns a valid decrypted access token, refreshing and persisting it
    /// first when expiry is inside the safety window.
    pub async fn get_access_token(
        &self,
        business_id: &str,
        provider: CalendarProvider,
    ) -> Result<String, EngineError> {
        let mut connection = self
            .connection_repo
            .find(business_id, provider)
            .await?
            .ok_or_else(|| EngineError::ConnectionNotFound(provider.as_str().to_string()))?;

        if connection.expires_at - Utc::now() > Duration::minutes(EXPIRY_SKEW_MINUTES) {
            return self.vault.decrypt(&connection.access_token_enc);
        }

        let refresh_token_enc = connection
            .refresh_token_enc
            .as_ref()
            .ok_or(EngineError::RefreshTokenMissing)?;
        let refresh_token = self.vault.decrypt(refresh_token_enc)?;

        let tokens: TokenResponse = self.client(provider)?.refresh(&refresh_token).await?;

        connection.access_token_enc = self.vault.encrypt(&tokens.access_token)?;
        connection.expires_at = tokens.expires_at;
        connection.updated_at = Utc::now();
        self.connection_repo.upsert(&connection).await?;

        info!(
            "Refreshed access token for business {} ({})",
            business_id,
            provider.as_str()
        );
        Ok(tokens.access_token)
    }

    /// Free/busy for one provider, with a single deterministic retry on a
    /// transient failure.
    pub async fn fetch_busy(
        &self,
        business_id: &str,
        provider: CalendarProvider,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, EngineError> {
        let access_token = self.get_access_token(business_id, provider).await?;
        let client = self.client(provider)?;

        match client.free_busy(&access_token, time_min, time_max).await {
            Ok(intervals) => Ok(intervals),
            Err(e @ (EngineError::ProviderRequest(_) | EngineError::ProviderTimeout(_))) => {
                warn!(
                    "Free/busy failed for {} ({}), retrying once: {}",
                    business_id,
                    provider.as_str(),
                    e
                );
                client.free_busy(&access_token, time_min, time_max).await
            }
            Err(e) => Err(e),
        }
    }

    /// Busy time across every connected provider for this tenant. A provider
    /// that still fails after its retry is skipped and reported by name so the
    /// caller can mark the batch as partial.
    pub async fn fetch_all_busy(
        &self,
        business_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<(Vec<BusyInterval>, Vec<String>), EngineError> {
        let connections = self.connection_repo.list_by_business(business_id).await?;

        let mut intervals = Vec::new();
        let mut failed = Vec::new();
        for conn in connections {
            match self
                .fetch_busy(business_id, conn.provider, time_min, time_max)
                .await
            {
                Ok(mut batch) => intervals.append(&mut batch),
                Err(e) => {
                    warn!(
                        "Dropping busy data from {} for business {}: {}",
                        conn.provider.as_str(),
                        business_id,
                        e
                    );
                    failed.push(conn.provider.as_str().to_string());
                }
            }
        }

        Ok((intervals, failed))
    }
}
