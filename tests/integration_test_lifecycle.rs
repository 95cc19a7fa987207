mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::TestApp;
use scheduling_engine::domain::models::booking::{BookingRequest, BookingStatus, NewBookingParams};
use scheduling_engine::domain::models::settings::BookingMode;
use scheduling_engine::domain::services::lifecycle::{TransitionFields, transition_allowed};
use scheduling_engine::error::EngineError;
use std::sync::atomic::Ordering;

fn monday_at(h: u32, m: u32) -> DateTime<Utc> {
    let date = common::next_monday();
    Utc.from_utc_datetime(&date.and_hms_opt(h, m, 0).unwrap())
}

async fn seed_booking(app: &TestApp, status: BookingStatus) -> (String, String) {
    let business_id = app.seed_business(0, BookingMode::RequestOnly).await;
    let mut booking = BookingRequest::new(NewBookingParams {
        business_id: business_id.clone(),
        service_id: None,
        customer_name: "Alice Example".into(),
        customer_email: "alice@example.com".into(),
        customer_phone: None,
        start: monday_at(10, 0),
        duration_min: 60,
        instant: false,
    });
    booking.status = status;
    let created = app.state.booking_repo.create(&booking).await.unwrap();
    (business_id, created.id)
}

#[test]
fn transition_table_matches_the_state_machine() {
    use BookingStatus::*;

    let all = [Requested, ProposedTime, Approved, Declined, Completed, Canceled];
    let allowed = [
        (Requested, Approved),
        (Requested, Declined),
        (Requested, ProposedTime),
        (Requested, Canceled),
        (ProposedTime, Approved),
        (ProposedTime, Declined),
        (ProposedTime, Canceled),
        (Approved, Completed),
        (Approved, Canceled),
    ];

    for from in all {
        for to in all {
            assert_eq!(
                transition_allowed(from, to),
                allowed.contains(&(from, to)),
                "{} -> {}",
                from.as_str(),
                to.as_str()
            );
        }
    }
}

#[tokio::test]
async fn approving_a_request_notifies_and_syncs() {
    let app = TestApp::new().await;
    let (bid, booking_id) = seed_booking(&app, BookingStatus::Requested).await;

    let outcome = app
        .state
        .lifecycle
        .transition(&bid, &booking_id, BookingStatus::Approved, TransitionFields::default())
        .await
        .unwrap();

    assert_eq!(outcome.booking.status, BookingStatus::Approved);
    assert!(outcome.warnings.is_empty());

    let events = app.notifier.events.lock().unwrap();
    assert!(events.contains(&("customer:APPROVED".into(), booking_id.clone())));
    // The business acted; only cancellations go back to it.
    assert!(!events.iter().any(|(kind, _)| kind.starts_with("business:")));
    drop(events);
    assert_eq!(app.crm.synced.lock().unwrap().as_slice(), [booking_id]);
}

#[tokio::test]
async fn counter_proposal_requires_a_full_interval() {
    let app = TestApp::new().await;
    let (bid, booking_id) = seed_booking(&app, BookingStatus::Requested).await;

    let missing = app
        .state
        .lifecycle
        .transition(
            &bid,
            &booking_id,
            BookingStatus::ProposedTime,
            TransitionFields {
                proposed_start: Some(monday_at(12, 0)),
                ..TransitionFields::default()
            },
        )
        .await;
    assert!(matches!(missing, Err(EngineError::Validation(_))));

    let inverted = app
        .state
        .lifecycle
        .transition(
            &bid,
            &booking_id,
            BookingStatus::ProposedTime,
            TransitionFields {
                proposed_start: Some(monday_at(13, 0)),
                proposed_end: Some(monday_at(12, 0)),
                ..TransitionFields::default()
            },
        )
        .await;
    assert!(matches!(inverted, Err(EngineError::Validation(_))));

    // A failed transition leaves the booking untouched.
    let stored = app
        .state
        .booking_repo
        .find_by_id(&bid, &booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, BookingStatus::Requested);
    assert_eq!(stored.proposed_start, None);
}

#[tokio::test]
async fn counter_proposal_then_approval_keeps_the_proposed_interval() {
    let app = TestApp::new().await;
    let (bid, booking_id) = seed_booking(&app, BookingStatus::Requested).await;

    let proposed = app
        .state
        .lifecycle
        .transition(
            &bid,
            &booking_id,
            BookingStatus::ProposedTime,
            TransitionFields {
                proposed_start: Some(monday_at(12, 0)),
                proposed_end: Some(monday_at(13, 0)),
                internal_notes: Some("moved past lunch".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(proposed.booking.status, BookingStatus::ProposedTime);
    assert_eq!(proposed.booking.internal_notes.as_deref(), Some("moved past lunch"));

    let approved = app
        .state
        .lifecycle
        .transition(&bid, &booking_id, BookingStatus::Approved, TransitionFields::default())
        .await
        .unwrap();

    assert_eq!(approved.booking.proposed_start, Some(monday_at(12, 0)));
    assert_eq!(approved.booking.proposed_end, Some(monday_at(13, 0)));
    assert_eq!(
        approved.booking.occupied_interval(),
        Some((monday_at(12, 0), monday_at(13, 0)))
    );
}

#[tokio::test]
async fn cancellation_notifies_both_sides() {
    let app = TestApp::new().await;
    let (bid, booking_id) = seed_booking(&app, BookingStatus::Approved).await;

    app.state
        .lifecycle
        .transition(&bid, &booking_id, BookingStatus::Canceled, TransitionFields::default())
        .await
        .unwrap();

    let events = app.notifier.events.lock().unwrap();
    assert!(events.contains(&("customer:CANCELED".into(), booking_id.clone())));
    assert!(events.contains(&("business:CANCELED".into(), booking_id.clone())));
}

#[tokio::test]
async fn disallowed_transitions_are_rejected() {
    let app = TestApp::new().await;
    let (bid, booking_id) = seed_booking(&app, BookingStatus::Requested).await;

    let result = app
        .state
        .lifecycle
        .transition(&bid, &booking_id, BookingStatus::Completed, TransitionFields::default())
        .await;
    match result {
        Err(EngineError::InvalidTransition { from, to }) => {
            assert_eq!(from, "REQUESTED");
            assert_eq!(to, "COMPLETED");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn terminal_bookings_are_immutable() {
    let app = TestApp::new().await;

    for terminal in [BookingStatus::Declined, BookingStatus::Completed, BookingStatus::Canceled] {
        let (bid, booking_id) = seed_booking(&app, terminal).await;
        for target in [BookingStatus::Requested, BookingStatus::Approved, BookingStatus::Canceled] {
            let result = app
                .state
                .lifecycle
                .transition(&bid, &booking_id, target, TransitionFields::default())
                .await;
            assert!(
                matches!(result, Err(EngineError::InvalidTransition { .. })),
                "{} -> {} should be rejected",
                terminal.as_str(),
                target.as_str()
            );
        }
    }
}

#[tokio::test]
async fn side_effect_failures_never_roll_back() {
    let app = TestApp::new().await;
    let (bid, booking_id) = seed_booking(&app, BookingStatus::Requested).await;

    app.notifier.fail.store(true, Ordering::SeqCst);
    app.crm.fail.store(true, Ordering::SeqCst);

    let outcome = app
        .state
        .lifecycle
        .transition(&bid, &booking_id, BookingStatus::Declined, TransitionFields::default())
        .await
        .unwrap();

    assert_eq!(outcome.booking.status, BookingStatus::Declined);
    assert_eq!(outcome.warnings.len(), 2); // customer notify + crm sync

    let stored = app
        .state
        .booking_repo
        .find_by_id(&bid, &booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, BookingStatus::Declined);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let app = TestApp::new().await;
    let bid = app.seed_business(0, BookingMode::RequestOnly).await;

    let result = app
        .state
        .lifecycle
        .transition(&bid, "no-such-booking", BookingStatus::Approved, TransitionFields::default())
        .await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}
