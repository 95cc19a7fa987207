use crate::domain::models::{
    availability::{AvailabilityException, AvailabilityWindow},
    booking::BookingRequest,
    calendar::{BusyInterval, CalendarConnection, CalendarProvider, TokenResponse},
    public_link::BookingPublicLink,
    service::BookingService,
    settings::BookingSettings,
};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn upsert(&self, settings: &BookingSettings) -> Result<BookingSettings, EngineError>;
    async fn find_by_business(&self, business_id: &str) -> Result<Option<BookingSettings>, EngineError>;
}

#[async_trait]
pub trait AvailabilityWindowRepository: Send + Sync {
    async fn create(&self, window: &AvailabilityWindow) -> Result<AvailabilityWindow, EngineError>;
    async fn list_by_business(&self, business_id: &str) -> Result<Vec<AvailabilityWindow>, EngineError>;
    async fn delete(&self, business_id: &str, id: &str) -> Result<(), EngineError>;
}

#[async_trait]
pub trait AvailabilityExceptionRepository: Send + Sync {
    async fn create(&self, exception: &AvailabilityException) -> Result<AvailabilityException, EngineError>;
    async fn list_by_date(&self, business_id: &str, date: NaiveDate) -> Result<Vec<AvailabilityException>, EngineError>;
    async fn delete(&self, business_id: &str, id: &str) -> Result<(), EngineError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &BookingService) -> Result<BookingService, EngineError>;
    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<BookingService>, EngineError>;
    async fn list_by_business(&self, business_id: &str) -> Result<Vec<BookingService>, EngineError>;
    async fn update(&self, service: &BookingService) -> Result<BookingService, EngineError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &BookingRequest) -> Result<BookingRequest, EngineError>;
    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<BookingRequest>, EngineError>;
    async fn list_by_business(&self, business_id: &str) -> Result<Vec<BookingRequest>, EngineError>;
    async fn list_by_range(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BookingRequest>, EngineError>;
    async fn update(&self, booking: &BookingRequest) -> Result<BookingRequest, EngineError>;
    async fn delete(&self, business_id: &str, id: &str) -> Result<(), EngineError>;
}

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn upsert(&self, connection: &CalendarConnection) -> Result<CalendarConnection, EngineError>;
    async fn find(
        &self,
        business_id: &str,
        provider: CalendarProvider,
    ) -> Result<Option<CalendarConnection>, EngineError>;
    async fn list_by_business(&self, business_id: &str) -> Result<Vec<CalendarConnection>, EngineError>;
    async fn delete(&self, business_id: &str, provider: CalendarProvider) -> Result<(), EngineError>;
}

#[async_trait]
pub trait PublicLinkRepository: Send + Sync {
    async fn create(&self, link: &BookingPublicLink) -> Result<BookingPublicLink, EngineError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<BookingPublicLink>, EngineError>;
    async fn find_by_business(&self, business_id: &str) -> Result<Option<BookingPublicLink>, EngineError>;
    async fn update_slug(&self, code: &str, slug: Option<String>) -> Result<(), EngineError>;
}

/// One adapter per calendar provider. Callers depend only on this trait,
/// never on provider identity, except to pick which adapter to instantiate.
#[async_trait]
pub trait CalendarProviderClient: Send + Sync {
    fn provider(&self) -> CalendarProvider;
    fn authorization_url(&self, state: &str) -> String;
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, EngineError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, EngineError>;
    async fn free_busy(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, EngineError>;
}

/// Best-effort notification dispatch. Failures are reported as warnings by
/// callers, never as errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_customer(&self, event: &str, booking: &BookingRequest) -> Result<(), EngineError>;
    async fn notify_business(&self, event: &str, booking: &BookingRequest) -> Result<(), EngineError>;
}

#[async_trait]
pub trait CrmSync: Send + Sync {
    async fn sync_booking(&self, business_id: &str, booking: &BookingRequest) -> Result<(), EngineError>;
}
