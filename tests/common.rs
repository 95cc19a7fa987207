use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use scheduling_engine::{
    config::Config,
    domain::models::{
        availability::{AvailabilityException, AvailabilityWindow, ExceptionKind},
        booking::BookingRequest,
        calendar::{BusyInterval, CalendarProvider, TokenResponse},
        service::BookingService,
        settings::{BookingMode, BookingSettings},
    },
    domain::ports::{CalendarProviderClient, CrmSync, Notifier},
    domain::services::{
        connections::CalendarConnectionManager, lifecycle::BookingLifecycle,
        public_link::PublicLinkResolver, scheduling::SchedulingService,
    },
    error::EngineError,
    infra::crypto::token_vault::TokenVault,
    infra::factory::run_migrations,
    infra::repositories::{
        sqlite_availability_repo::{SqliteExceptionRepo, SqliteWindowRepo},
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_connection_repo::SqliteConnectionRepo,
        sqlite_link_repo::SqliteLinkRepo,
        sqlite_service_repo::SqliteServiceRepo,
        sqlite_settings_repo::SqliteSettingsRepo,
    },
    state::EngineState,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_KEY: [u8; 32] = [42u8; 32];

/// Records every notification; can be told to fail to exercise the
/// warning-isolation path.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_customer(&self, event: &str, booking: &BookingRequest) -> Result<(), EngineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::ProviderRequest("notifier down".into()));
        }
        self.events
            .lock()
            .unwrap()
            .push((format!("customer:{event}"), booking.id.clone()));
        Ok(())
    }

    async fn notify_business(&self, event: &str, booking: &BookingRequest) -> Result<(), EngineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::ProviderRequest("notifier down".into()));
        }
        self.events
            .lock()
            .unwrap()
            .push((format!("business:{event}"), booking.id.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingCrm {
    pub synced: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl CrmSync for RecordingCrm {
    async fn sync_booking(&self, _business_id: &str, booking: &BookingRequest) -> Result<(), EngineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::ProviderRequest("crm down".into()));
        }
        self.synced.lock().unwrap().push(booking.id.clone());
        Ok(())
    }
}

/// Scriptable in-process provider adapter.
pub struct MockProviderClient {
    pub which: CalendarProvider,
    pub busy: Mutex<Vec<BusyInterval>>,
    pub exchange_response: Mutex<Option<TokenResponse>>,
    pub refresh_response: Mutex<Option<TokenResponse>>,
    pub busy_failures_remaining: AtomicUsize,
    pub busy_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

impl MockProviderClient {
    pub fn new(which: CalendarProvider) -> Self {
        Self {
            which,
            busy: Mutex::new(Vec::new()),
            exchange_response: Mutex::new(None),
            refresh_response: Mutex::new(None),
            busy_failures_remaining: AtomicUsize::new(0),
            busy_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CalendarProviderClient for MockProviderClient {
    fn provider(&self) -> CalendarProvider {
        self.which
    }

    fn authorization_url(&self, state: &str) -> String {
        format!("https://auth.example/consent?state={state}")
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenResponse, EngineError> {
        self.exchange_response
            .lock()
            .unwrap()
            .clone()
            .ok_or(EngineError::AuthFailure("no scripted exchange".into()))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse, EngineError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_response
            .lock()
            .unwrap()
            .clone()
            .ok_or(EngineError::AuthFailure("no scripted refresh".into()))
    }

    async fn free_busy(
        &self,
        _access_token: &str,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, EngineError> {
        self.busy_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .busy_failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(EngineError::ProviderRequest("flaky upstream".into()));
        }
        Ok(self.busy.lock().unwrap().clone())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub state: EngineState,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub notifier: Arc<RecordingNotifier>,
    pub crm: Arc<RecordingCrm>,
    pub google: Arc<MockProviderClient>,
    pub microsoft: Arc<MockProviderClient>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_migrations(&pool).await;

        let config = Config {
            database_url: db_url,
            token_encryption_key: TEST_KEY.to_vec(),
            google_client_id: "google-client".into(),
            google_client_secret: "google-secret".into(),
            google_redirect_uri: "http://localhost/callback/google".into(),
            microsoft_client_id: "ms-client".into(),
            microsoft_client_secret: "ms-secret".into(),
            microsoft_redirect_uri: "http://localhost/callback/microsoft".into(),
            provider_timeout_secs: 5,
        };

        let vault = Arc::new(TokenVault::new(&config.token_encryption_key).unwrap());

        let notifier = Arc::new(RecordingNotifier::default());
        let crm = Arc::new(RecordingCrm::default());
        let google = Arc::new(MockProviderClient::new(CalendarProvider::Google));
        let microsoft = Arc::new(MockProviderClient::new(CalendarProvider::Microsoft));

        let mut providers: HashMap<CalendarProvider, Arc<dyn CalendarProviderClient>> =
            HashMap::new();
        providers.insert(CalendarProvider::Google, google.clone());
        providers.insert(CalendarProvider::Microsoft, microsoft.clone());

        let settings_repo = Arc::new(SqliteSettingsRepo::new(pool.clone()));
        let window_repo = Arc::new(SqliteWindowRepo::new(pool.clone()));
        let exception_repo = Arc::new(SqliteExceptionRepo::new(pool.clone()));
        let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let connection_repo = Arc::new(SqliteConnectionRepo::new(pool.clone()));
        let link_repo = Arc::new(SqliteLinkRepo::new(pool.clone()));

        let connections = Arc::new(CalendarConnectionManager::new(
            connection_repo.clone(),
            vault.clone(),
            providers,
        ));
        let scheduling = Arc::new(SchedulingService::new(
            settings_repo.clone(),
            window_repo.clone(),
            exception_repo.clone(),
            service_repo.clone(),
            booking_repo.clone(),
            connections.clone(),
            notifier.clone(),
            crm.clone(),
        ));
        let lifecycle = Arc::new(BookingLifecycle::new(
            booking_repo.clone(),
            notifier.clone(),
            crm.clone(),
        ));
        let links = Arc::new(PublicLinkResolver::new(link_repo.clone()));

        let state = EngineState {
            config,
            settings_repo,
            window_repo,
            exception_repo,
            service_repo,
            booking_repo,
            connection_repo,
            link_repo,
            notifier: notifier.clone(),
            crm: crm.clone(),
            vault,
            connections,
            scheduling,
            lifecycle,
            links,
        };

        Self {
            state,
            pool,
            db_filename,
            notifier,
            crm,
            google,
            microsoft,
        }
    }

    pub async fn seed_business(&self, buffer_minutes: i32, mode: BookingMode) -> String {
        let business_id = Uuid::new_v4().to_string();
        let mut settings = BookingSettings::new(business_id.clone());
        settings.buffer_minutes = buffer_minutes;
        settings.booking_mode = mode;
        self.state.settings_repo.upsert(&settings).await.unwrap();
        business_id
    }

    pub async fn add_window(&self, business_id: &str, day_of_week: i32, start: &str, end: &str) {
        let window = AvailabilityWindow::new(
            business_id.to_string(),
            day_of_week,
            start.to_string(),
            end.to_string(),
        );
        self.state.window_repo.create(&window).await.unwrap();
    }

    pub async fn add_exception(
        &self,
        business_id: &str,
        date: NaiveDate,
        kind: ExceptionKind,
        range: Option<(&str, &str)>,
    ) {
        let mut exception = AvailabilityException::new(business_id.to_string(), date, kind);
        if let Some((start, end)) = range {
            exception.start_time = Some(start.to_string());
            exception.end_time = Some(end.to_string());
        }
        self.state.exception_repo.create(&exception).await.unwrap();
    }

    pub async fn add_service(&self, business_id: &str, duration_minutes: i32) -> String {
        let service = BookingService::new(
            business_id.to_string(),
            "Consultation".to_string(),
            duration_minutes,
        );
        self.state.service_repo.create(&service).await.unwrap();
        service.id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

/// The next Monday strictly in the future, far enough out that min-notice
/// checks never interfere.
#[allow(dead_code)]
pub fn next_monday() -> NaiveDate {
    let mut next = Utc::now().date_naive() + Duration::days(7);
    while next.format("%A").to_string() != "Monday" {
        next += Duration::days(1);
    }
    next
}
