use crate::config::Config;
use crate::domain::ports::{
    AvailabilityExceptionRepository, AvailabilityWindowRepository, BookingRepository,
    ConnectionRepository, CrmSync, Notifier, PublicLinkRepository, ServiceRepository,
    SettingsRepository,
};
use crate::domain::services::connections::CalendarConnectionManager;
use crate::domain::services::lifecycle::BookingLifecycle;
use crate::domain::services::public_link::PublicLinkResolver;
use crate::domain::services::scheduling::SchedulingService;
use crate::infra::crypto::token_vault::TokenVault;
use std::sync::Arc;

#[derive(Clone)]
pub struct EngineState {
    pub config: Config,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub window_repo: Arc<dyn AvailabilityWindowRepository>,
    pub exception_repo: Arc<dyn AvailabilityExceptionRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub connection_repo: Arc<dyn ConnectionRepository>,
    pub link_repo: Arc<dyn PublicLinkRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub crm: Arc<dyn CrmSync>,
    pub vault: Arc<TokenVault>,
    pub connections: Arc<CalendarConnectionManager>,
    pub scheduling: Arc<SchedulingService>,
    pub lifecycle: Arc<BookingLifecycle>,
    pub links: Arc<PublicLinkResolver>,
}
