use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::config::Config;
use crate::domain::models::calendar::CalendarProvider;
use crate::domain::ports::CalendarProviderClient;
use crate::domain::services::connections::CalendarConnectionManager;
use crate::domain::services::lifecycle::BookingLifecycle;
use crate::domain::services::public_link::PublicLinkResolver;
use crate::domain::services::scheduling::SchedulingService;
use crate::infra::collaborators::{LoggingCrmSync, LoggingNotifier};
use crate::infra::crypto::token_vault::TokenVault;
use crate::infra::providers::{google::GoogleCalendarClient, microsoft::MicrosoftCalendarClient};
use crate::infra::repositories::{
    sqlite_availability_repo::{SqliteExceptionRepo, SqliteWindowRepo},
    sqlite_booking_repo::SqliteBookingRepo,
    sqlite_connection_repo::SqliteConnectionRepo,
    sqlite_link_repo::SqliteLinkRepo,
    sqlite_service_repo::SqliteServiceRepo,
    sqlite_settings_repo::SqliteSettingsRepo,
};
use crate::state::EngineState;

pub async fn bootstrap_state(config: &Config) -> EngineState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    // Key problems are fatal here, not on first encrypt.
    let vault = Arc::new(
        TokenVault::new(&config.token_encryption_key).expect("Invalid token encryption key"),
    );

    let mut providers: HashMap<CalendarProvider, Arc<dyn CalendarProviderClient>> = HashMap::new();
    providers.insert(
        CalendarProvider::Google,
        Arc::new(GoogleCalendarClient::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.google_redirect_uri.clone(),
            config.provider_timeout_secs,
        )),
    );
    providers.insert(
        CalendarProvider::Microsoft,
        Arc::new(MicrosoftCalendarClient::new(
            config.microsoft_client_id.clone(),
            config.microsoft_client_secret.clone(),
            config.microsoft_redirect_uri.clone(),
            config.provider_timeout_secs,
        )),
    );

    let settings_repo = Arc::new(SqliteSettingsRepo::new(pool.clone()));
    let window_repo = Arc::new(SqliteWindowRepo::new(pool.clone()));
    let exception_repo = Arc::new(SqliteExceptionRepo::new(pool.clone()));
    let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
    let connection_repo = Arc::new(SqliteConnectionRepo::new(pool.clone()));
    let link_repo = Arc::new(SqliteLinkRepo::new(pool.clone()));

    let notifier = Arc::new(LoggingNotifier);
    let crm = Arc::new(LoggingCrmSync);

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

    EngineState {
        config: config.clone(),
        settings_repo,
        window_repo,
        exception_repo,
        service_repo,
        booking_repo,
        connection_repo,
        link_repo,
        notifier,
        crm,
        vault,
        connections,
        scheduling,
        lifecycle,
        links,
    }
}

pub async fn run_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
