//! Store-driven flows over the in-memory backend
//!
//! Each test runs reducers inside a real `Store`, so effects execute and
//! their results are fed back exactly as in the binary.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, TimeZone, Utc};
use roombook::api::InMemoryBookingApi;
use roombook::bookings::{
    BookingListAction, BookingListEnvironment, BookingListReducer, BookingListState,
};
use roombook::edit::{BookingEdit, EditAction, EditEnvironment, EditFormState, EditPhase, EditReducer};
use roombook::storage::{DraftMailbox, MemoryStore};
use roombook::types::{
    BookedSlot, BookingId, Credentials, EditRequest, Language, ReservationRequest, Room, RoomId,
    SlotOwner, SlotRoom, TimeSlot, UserId,
};
use roombook::wizard::{
    WizardAction, WizardEnvironment, WizardField, WizardReducer, WizardState, WizardStep,
};
use roombook::BookingError;
use roombook_runtime::Store;
use roombook_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Fixtures
// ============================================================================

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn tomorrow() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 16, hour, 0, 0).unwrap()
}

fn slot(hour: u32) -> TimeSlot {
    TimeSlot::new(hour).unwrap()
}

fn alice() -> Credentials {
    Credentials {
        user_id: UserId::new(42),
        user_name: "alice".into(),
        token: "token-42".into(),
    }
}

fn a3() -> Room {
    Room::Regular {
        id: RoomId::new(1),
        letter: "A".into(),
        number: 3,
    }
}

fn booked(id: i64, hour: u32, reserved: bool) -> BookedSlot {
    BookedSlot {
        id: BookingId::new(id),
        start_time: at(hour),
        end_time: at(hour) + ChronoDuration::hours(1),
        duration: 1,
        reserved,
        room: SlotRoom {
            id: RoomId::new(1),
            room_letter: Some("A".into()),
            room_number: Some(3),
            room_name: Some("A3".into()),
            capacity: Some(70),
        },
        owner: SlotOwner {
            id: UserId::new(42),
            user_name: "alice".into(),
            email: None,
        },
    }
}

type WizardStore = Store<WizardState, WizardAction, WizardEnvironment, WizardReducer>;

fn wizard(api: &InMemoryBookingApi) -> WizardStore {
    let env = WizardEnvironment::new(Arc::new(api.clone()), Arc::new(test_clock()), utc())
        .with_send_delay(Duration::from_millis(5));
    Store::new(WizardState::new(), WizardReducer::new(), env)
}

async fn run(store: &WizardStore, actions: Vec<WizardAction>) {
    for action in actions {
        store.send(action).await.unwrap().wait().await;
    }
}

fn pick_a3_tomorrow_9_and_10() -> Vec<WizardAction> {
    vec![
        WizardAction::LoadRooms,
        WizardAction::ChooseLetter("A".into()),
        WizardAction::ChooseNumber(3),
        WizardAction::Next,
        WizardAction::SelectDate(tomorrow()),
        WizardAction::Next,
        WizardAction::ToggleSlot(slot(9)),
        WizardAction::ToggleSlot(slot(10)),
        WizardAction::Submit {
            credentials: alice(),
        },
    ]
}

// ============================================================================
// Wizard
// ============================================================================

#[tokio::test]
async fn wizard_submits_one_request_per_slot() {
    let api = InMemoryBookingApi::new().with_rooms(vec![a3()]);
    let store = wizard(&api);

    run(&store, pick_a3_tomorrow_9_and_10()).await;

    let expected: Vec<ReservationRequest> = [9, 10]
        .into_iter()
        .map(|hour| ReservationRequest {
            start_time: at(hour),
            room_id: RoomId::new(1),
            user_id: UserId::new(42),
        })
        .collect();
    assert_eq!(api.submitted(), vec![expected]);

    let receipt = store.state(|s| s.receipt().cloned()).await.unwrap();
    assert_eq!(receipt.room_name, "A3");
    assert_eq!(
        receipt.booking_ids(),
        vec![BookingId::new(100), BookingId::new(101)]
    );
}

#[tokio::test]
async fn accepting_confirmation_returns_to_a_fresh_wizard() {
    let api = InMemoryBookingApi::new().with_rooms(vec![a3()]);
    let store = wizard(&api);
    run(&store, pick_a3_tomorrow_9_and_10()).await;

    run(&store, vec![WizardAction::AcceptConfirmation]).await;

    let (step, notice, sending) = store
        .state(|s| (s.step.clone(), s.notice.clone(), s.sending_confirmation))
        .await;
    assert_eq!(step, WizardStep::default());
    assert_eq!(notice.as_deref(), Some("Confirmation e-mail sent"));
    assert!(!sending);
    assert_eq!(api.bookings().len(), 2);
}

#[tokio::test]
async fn rejected_batch_keeps_the_draft_and_books_nothing() {
    let api = InMemoryBookingApi::new()
        .with_rooms(vec![a3()])
        .with_bookings(vec![booked(7, 10, true)]);
    let store = wizard(&api);

    run(&store, pick_a3_tomorrow_9_and_10()).await;

    let state = store.state(Clone::clone).await;
    match &state.step {
        WizardStep::Failed { draft, error } => {
            assert_eq!(draft.date, tomorrow());
            assert_eq!(draft.room.id, RoomId::new(1));
            assert_eq!(draft.slots, [slot(9), slot(10)].into_iter().collect());
            assert!(matches!(error, BookingError::Conflict { .. }));
        },
        other => panic!("expected a failed submission, got {other:?}"),
    }
    assert_eq!(
        state.error(WizardField::Form),
        Some("Reservation has not been reserved")
    );
    assert_eq!(api.bookings().len(), 1);

    // Drop the taken hour and retry the same draft.
    run(
        &store,
        vec![
            WizardAction::ToggleSlot(slot(10)),
            WizardAction::Submit {
                credentials: alice(),
            },
        ],
    )
    .await;
    assert!(store.state(|s| s.receipt().is_some()).await);
    assert_eq!(api.bookings().len(), 2);
}

#[tokio::test]
async fn declined_batch_reports_partial_cancellation() {
    let api = InMemoryBookingApi::new().with_rooms(vec![a3()]);
    let store = wizard(&api);
    run(&store, pick_a3_tomorrow_9_and_10()).await;

    api.fail_cancel(BookingId::new(101), BookingError::Network("timeout".into()));
    run(
        &store,
        vec![WizardAction::DeclineBooking {
            credentials: alice(),
        }],
    )
    .await;

    let state = store.state(Clone::clone).await;
    assert!(matches!(state.step, WizardStep::Confirmed { .. }));
    assert_eq!(
        state.receipt().unwrap().booking_ids(),
        vec![BookingId::new(101)]
    );
    assert!(state.error(WizardField::Cancel).unwrap().contains("101"));

    let bookings = api.bookings();
    assert!(!bookings.iter().find(|b| b.id.value() == 100).unwrap().reserved);
    assert!(bookings.iter().find(|b| b.id.value() == 101).unwrap().reserved);

    api.clear_cancel_failure(BookingId::new(101));
    run(
        &store,
        vec![WizardAction::DeclineBooking {
            credentials: alice(),
        }],
    )
    .await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.step, WizardStep::default());
    assert_eq!(state.error(WizardField::Cancel), None);
    assert!(api.bookings().iter().all(|b| !b.reserved));
}

// ============================================================================
// Booking list and edit form
// ============================================================================

type ListStore = Store<BookingListState, BookingListAction, BookingListEnvironment, BookingListReducer>;

fn booking_list(api: &InMemoryBookingApi, mailbox: &DraftMailbox) -> ListStore {
    let env = BookingListEnvironment::new(Arc::new(api.clone()), mailbox.clone(), utc())
        .with_send_delay(Duration::from_millis(5));
    Store::new(BookingListState::new(Language::En), BookingListReducer::new(), env)
}

async fn send_list(store: &ListStore, action: BookingListAction) {
    store.send(action).await.unwrap().wait().await;
}

#[tokio::test]
async fn cancelling_twice_keeps_one_entry_with_same_times() {
    let api = InMemoryBookingApi::new().with_bookings(vec![booked(10, 9, true), booked(11, 14, true)]);
    let mailbox = DraftMailbox::new(Arc::new(MemoryStore::new()));
    let store = booking_list(&api, &mailbox);

    send_list(&store, BookingListAction::Load { credentials: alice() }).await;
    for _ in 0..2 {
        send_list(&store, BookingListAction::RequestCancel(BookingId::new(10))).await;
        send_list(&store, BookingListAction::ConfirmCancel { credentials: alice() }).await;
        // The backend forgets the slot after the first cancellation.
        api.fail_cancel(BookingId::new(10), BookingError::not_found("Slot not found"));
    }

    let state = store.state(Clone::clone).await;
    assert_eq!(state.error, None);
    assert_eq!(state.bookings.len(), 2);
    assert!(!state.is_busy());
    let cancelled = state.get(BookingId::new(10)).unwrap();
    assert!(!cancelled.reserved);
    assert_eq!(cancelled.start_time, at(9));
    assert_eq!(cancelled.end_time, at(10));
    assert_eq!(api.cancel_calls(), vec![BookingId::new(10), BookingId::new(10)]);
}

#[tokio::test]
async fn load_failure_shows_banner_and_empty_list() {
    let api = InMemoryBookingApi::new().with_bookings(vec![booked(10, 9, true)]);
    api.fail_next_bookings(BookingError::Network("connection refused".into()));
    let mailbox = DraftMailbox::new(Arc::new(MemoryStore::new()));
    let store = booking_list(&api, &mailbox);

    send_list(&store, BookingListAction::Load { credentials: alice() }).await;
    let (count, error) = store.state(|s| (s.bookings.len(), s.error.clone())).await;
    assert_eq!(count, 0);
    assert_eq!(error.as_deref(), Some("Failed to load bookings"));

    send_list(&store, BookingListAction::Load { credentials: alice() }).await;
    assert_eq!(store.state(|s| s.bookings.len()).await, 1);
}

#[tokio::test]
async fn hand_off_edit_round_trip() {
    let api = InMemoryBookingApi::new().with_bookings(vec![booked(10, 9, false)]);
    let mailbox = DraftMailbox::new(Arc::new(MemoryStore::new()));
    let list = booking_list(&api, &mailbox);
    send_list(&list, BookingListAction::Load { credentials: alice() }).await;

    send_list(&list, BookingListAction::HandOffEdit(BookingId::new(10))).await;
    let request = list.state(|s| s.handoff.clone()).await.unwrap();
    assert_eq!(mailbox.peek().unwrap(), Some(request.clone()));

    let form = Store::new(
        EditFormState::new(),
        EditReducer::new(),
        EditEnvironment::new(mailbox.clone(), utc()),
    );
    form.send(EditAction::Open {
        route_id: BookingId::new(10),
        request: Some(request),
    })
    .await
    .unwrap();

    let mut input = BookingEdit::from_booking(&booked(10, 9, false), utc());
    input.start = TimeSlot::new(13);
    input.duration_hours = 2;
    form.send(EditAction::UpdateForm(input)).await.unwrap();
    form.send(EditAction::Save).await.unwrap().wait().await;

    let saved = match form.state(|s| s.phase.clone()).await {
        EditPhase::Saved { booking } => booking,
        other => panic!("expected a saved booking, got {other:?}"),
    };
    assert_eq!(mailbox.peek().unwrap(), None);

    send_list(&list, BookingListAction::ApplyEdit(saved)).await;
    let state = list.state(Clone::clone).await;
    let edited = state.get(BookingId::new(10)).unwrap();
    assert_eq!(edited.start_time, at(13));
    assert_eq!(edited.end_time, at(15));
    assert!(!edited.reserved);
    assert_eq!(state.bookings.len(), 1);
    assert_eq!(state.handoff, None);
}

#[tokio::test]
async fn mailbox_for_another_booking_is_refused() {
    let mailbox = DraftMailbox::new(Arc::new(MemoryStore::new()));
    mailbox.post(&EditRequest::new(booked(5, 9, true))).unwrap();

    let form = Store::new(
        EditFormState::new(),
        EditReducer::new(),
        EditEnvironment::new(mailbox, utc()),
    );
    form.send(EditAction::OpenFromMailbox {
        route_id: BookingId::new(7),
    })
    .await
    .unwrap()
    .wait()
    .await;

    let phase = form.state(|s| s.phase.clone()).await;
    assert_eq!(
        phase,
        EditPhase::Error(BookingError::Mismatch {
            expected: BookingId::new(7),
            found: BookingId::new(5),
        })
    );
}
