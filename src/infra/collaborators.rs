use crate::domain::models::booking::BookingRequest;
use crate::domain::ports::{CrmSync, Notifier};
use crate::error::EngineError;
use async_trait::async_trait;
use tracing::info;

/// Stand-in collaborators for deployments without a mail or CRM integration
/// wired up. They only record the attempt; real dispatchers are injected by
/// the host application.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify_customer(&self, event: &str, booking: &BookingRequest) -> Result<(), EngineError> {
        info!(
            "notify customer {} about {} for booking {}",
            booking.customer_email, event, booking.id
        );
        Ok(())
    }

    async fn notify_business(&self, event: &str, booking: &BookingRequest) -> Result<(), EngineError> {
        info!(
            "notify business {} about {} for booking {}",
            booking.business_id, event, booking.id
        );
        Ok(())
    }
}

pub struct LoggingCrmSync;

#[async_trait]
impl CrmSync for LoggingCrmSync {
    async fn sync_booking(&self, business_id: &str, booking: &BookingRequest) -> Result<(), EngineError> {
        info!("crm sync for business {} booking {}", business_id, booking.id);
        Ok(())
    }
}
