use crate::domain::models::booking::{BookingRequest, NewBookingParams};
use crate::domain::models::settings::{BookingMode, BookingSettings};
use crate::domain::ports::{
    AvailabilityExceptionRepository, AvailabilityWindowRepository, BookingRepository, CrmSync,
    Notifier, ServiceRepository, SettingsRepository,
};
use crate::domain::services::connections::CalendarConnectionManager;
use crate::domain::services::slots::{SlotQuery, calculate_slots, snap_to_grid};
use crate::error::EngineError;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

pub struct CreateBookingInput {
    pub business_id: String,
    pub service_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub start: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CreateBookingOutcome {
    pub booking: BookingRequest,
    pub warnings: Vec<String>,
}

/// Public-facing slot generation and booking creation. All data loads happen
/// here; the generation itself stays pure.
pub struct SchedulingService {
    settings_repo: Arc<dyn SettingsRepository>,
    window_repo: Arc<dyn AvailabilityWindowRepository>,
    exception_repo: Arc<dyn AvailabilityExceptionRepository>,
    service_repo: Arc<dyn ServiceRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    connections: Arc<CalendarConnectionManager>,
    notifier: Arc<dyn Notifier>,
    crm: Arc<dyn CrmSync>,
}

impl SchedulingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings_repo: Arc<dyn SettingsRepository>,
        window_repo: Arc<dyn AvailabilityWindowRepository>,
        exception_repo: Arc<dyn AvailabilityExceptionRepository>,
        service_repo: Arc<dyn ServiceRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        connections: Arc<CalendarConnectionManager>,
        notifier: Arc<dyn Notifier>,
        crm: Arc<dyn CrmSync>,
    ) -> Self {
        Self {
            settings_repo,
            window_repo,
            exception_repo,
            service_repo,
            booking_repo,
            connections,
            notifier,
            crm,
        }
    }

    async fn settings(&self, business_id: &str) -> Result<BookingSettings, EngineError> {
        self.settings_repo
            .find_by_business(business_id)
            .await?
            .ok_or(EngineError::NotFound("Booking settings not found".into()))
    }

    /// Bookable start times for one date, as ascending RFC 3339 UTC strings.
    pub async fn generate_slots(
        &self,
        business_id: &str,
        service_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<String>, EngineError> {
        let settings = self.settings(business_id).await?;

        let service = self
            .service_repo
            .find_by_id(business_id, service_id)
            .await?
            .ok_or(EngineError::NotFound("Service not found".into()))?;
        if !service.active {
            return Err(EngineError::Validation("Service is not active".into()));
        }

        let tz: Tz = settings.timezone.parse().unwrap_or(chrono_tz::UTC);
        let day_start_utc = tz
            .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
            .earliest()
            .ok_or_else(|| EngineError::Validation("Invalid local day start".into()))?
            .with_timezone(&Utc);
        let day_end_utc = day_start_utc + Duration::days(1);

        // Pad the query range so buffer-expanded neighbors just outside the
        // day still land in the busy set.
        let pad = Duration::minutes(settings.buffer_minutes as i64);

        let windows = self.window_repo.list_by_business(business_id).await?;
        let exceptions = self.exception_repo.list_by_date(business_id, date).await?;
        let existing_bookings = self
            .booking_repo
            .list_by_range(business_id, day_start_utc - pad, day_end_utc + pad)
            .await?;

        // External busy time folds into the same subtraction; a provider that
        // keeps failing is skipped rather than sinking the whole request.
        let (busy_intervals, failed) = self
            .connections
            .fetch_all_busy(business_id, day_start_utc - pad, day_end_utc + pad)
            .await?;
        if !failed.is_empty() {
            warn!(
                "Generating slots for {} without busy data from: {}",
                business_id,
                failed.join(", ")
            );
        }

        calculate_slots(&SlotQuery {
            timezone: &settings.timezone,
            min_notice_hours: settings.min_notice_hours,
            max_days_out: settings.max_days_out,
            buffer_minutes: settings.buffer_minutes,
            windows: &windows,
            exceptions: &exceptions,
            existing_bookings: &existing_bookings,
            busy_intervals: &busy_intervals,
            service_duration_minutes: service.duration_minutes,
            target_date: date,
            now: Utc::now(),
        })
    }

    /// Creates a booking after re-verifying the requested slot against a
    /// freshly generated list. Losing the race to a concurrent booking yields
    /// `SlotUnavailable`; nothing is inserted in that case.
    pub async fn create_booking(
        &self,
        input: CreateBookingInput,
    ) -> Result<CreateBookingOutcome, EngineError> {
        let settings = self.settings(&input.business_id).await?;

        let service = self
            .service_repo
            .find_by_id(&input.business_id, &input.service_id)
            .await?
            .ok_or(EngineError::NotFound("Service not found".into()))?;
        if !service.active {
            return Err(EngineError::Validation("Service is not active".into()));
        }

        let tz: Tz = settings.timezone.parse().unwrap_or(chrono_tz::UTC);
        let start = snap_to_grid(input.start);
        let date = start.with_timezone(&tz).date_naive();

        let valid_slots = self
            .generate_slots(&input.business_id, &input.service_id, date)
            .await?;
        if !valid_slots.contains(&start.to_rfc3339()) {
            warn!(
                "Booking rejected for {}: slot {} not in the current slot list",
                input.business_id,
                start.to_rfc3339()
            );
            return Err(EngineError::SlotUnavailable);
        }

        let instant = settings.booking_mode == BookingMode::InstantAllowed;
        let booking = BookingRequest::new(NewBookingParams {
            business_id: input.business_id.clone(),
            service_id: Some(service.id.clone()),
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            customer_phone: input.customer_phone,
            start,
            duration_min: service.duration_minutes,
            instant,
        });

        let created = self.booking_repo.create(&booking).await?;
        info!(
            "Booking {} created as {} for business {}",
            created.id,
            created.status.as_str(),
            created.business_id
        );

        let mut warnings = Vec::new();
        let event = created.status.as_str();
        if let Err(e) = self.notifier.notify_business(event, &created).await {
            warn!("Business notification failed for {}: {}", created.id, e);
            warnings.push(format!("business notification failed: {e}"));
        }
        if let Err(e) = self.notifier.notify_customer(event, &created).await {
            warn!("Customer notification failed for {}: {}", created.id, e);
            warnings.push(format!("customer notification failed: {e}"));
        }
        if let Err(e) = self.crm.sync_booking(&created.business_id, &created).await {
            warn!("CRM sync failed for {}: {}", created.id, e);
            warnings.push(format!("crm sync failed: {e}"));
        }

        Ok(CreateBookingOutcome { booking: created, warnings })
    }
}
