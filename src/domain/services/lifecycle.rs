use crate::domain::models::booking::{BookingRequest, BookingStatus};
use crate::domain::ports::{BookingRepository, CrmSync, Notifier};
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Fields a transition may carry. A counter-proposal must supply both ends of
/// the proposed interval.
#[derive(Debug, Default, Clone)]
pub struct TransitionFields {
    pub proposed_start: Option<DateTime<Utc>>,
    pub proposed_end: Option<DateTime<Utc>>,
    pub internal_notes: Option<String>,
}

/// A successful transition plus any advisory warnings from best-effort
/// collaborators. Warnings never imply a rollback.
#[derive(Debug)]
pub struct TransitionOutcome {
    pub booking: BookingRequest,
    pub warnings: Vec<String>,
}

pub fn transition_allowed(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    match from {
        Requested => matches!(to, Approved | Declined | ProposedTime | Canceled),
        ProposedTime => matches!(to, Approved | Declined | Canceled),
        Approved => matches!(to, Completed | Canceled),
        Declined | Completed | Canceled => false,
    }
}

pub struct BookingLifecycle {
    booking_repo: Arc<dyn BookingRepository>,
    notifier: Arc<dyn Notifier>,
    crm: Arc<dyn CrmSync>,
}

impl BookingLifecycle {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        notifier: Arc<dyn Notifier>,
        crm: Arc<dyn CrmSync>,
    ) -> Self {
        Self { booking_repo, notifier, crm }
    }

    pub async fn transition(
        &self,
        business_id: &str,
        booking_id: &str,
        target: BookingStatus,
        fields: TransitionFields,
    ) -> Result<TransitionOutcome, EngineError> {
        let mut booking = self
            .booking_repo
            .find_by_id(business_id, booking_id)
            .await?
            .ok_or(EngineError::NotFound("Booking not found".into()))?;

        if !transition_allowed(booking.status, target) {
            return Err(EngineError::InvalidTransition {
                from: booking.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        if target == BookingStatus::ProposedTime {
            let (start, end) = match (fields.proposed_start, fields.proposed_end) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    return Err(EngineError::Validation(
                        "Proposing a time requires proposed_start and proposed_end".into(),
                    ));
                }
            };
            if end <= start {
                return Err(EngineError::Validation(
                    "proposed_end must be after proposed_start".into(),
                ));
            }
        }

        if let Some(start) = fields.proposed_start {
            booking.proposed_start = Some(start);
        }
        if let Some(end) = fields.proposed_end {
            booking.proposed_end = Some(end);
        }
        if let (Some(s), Some(e)) = (booking.proposed_start, booking.proposed_end)
            && e <= s
        {
            return Err(EngineError::Validation(
                "proposed_end must be after proposed_start".into(),
            ));
        }
        if let Some(notes) = fields.internal_notes {
            booking.internal_notes = Some(notes);
        }

        booking.status = target;
        booking.updated_at = Utc::now();

        let updated = self.booking_repo.update(&booking).await?;
        info!(
            "Booking {} transitioned to {}",
            updated.id,
            target.as_str()
        );

        let warnings = self.run_side_effects(&updated).await;
        Ok(TransitionOutcome { booking: updated, warnings })
    }

    /// Fire-and-forget collaborators. Each failure is logged and surfaced as
    /// a warning string next to the otherwise-successful result.
    async fn run_side_effects(&self, booking: &BookingRequest) -> Vec<String> {
        let mut warnings = Vec::new();
        let event = booking.status.as_str();

        if let Err(e) = self.notifier.notify_customer(event, booking).await {
            warn!("Customer notification failed for {}: {}", booking.id, e);
            warnings.push(format!("customer notification failed: {e}"));
        }
        if booking.status == BookingStatus::Canceled
            && let Err(e) = self.notifier.notify_business(event, booking).await
        {
            warn!("Business notification failed for {}: {}", booking.id, e);
            warnings.push(format!("business notification failed: {e}"));
        }
        if let Err(e) = self.crm.sync_booking(&booking.business_id, booking).await {
            warn!("CRM sync failed for {}: {}", booking.id, e);
            warnings.push(format!("crm sync failed: {e}"));
        }

        warnings
    }
}
