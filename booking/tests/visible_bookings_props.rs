//! Property tests for the displayed booking list

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use roombook::bookings::{StatusFilter, visible_bookings};
use roombook::types::{BookedSlot, BookingId, RoomId, SlotOwner, SlotRoom, UserId};

fn booking_strategy() -> impl Strategy<Value = BookedSlot> {
    (
        1i64..1000,
        0i64..(14 * 24),
        any::<bool>(),
        prop::sample::select(vec!["A3", "B12", "Amphi Turing", "C1"]),
        prop::sample::select(vec!["alice", "Bob", "carol"]),
    )
        .prop_map(|(id, hours, reserved, room, owner)| {
            let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours);
            BookedSlot {
                id: BookingId::new(id),
                start_time: start,
                end_time: start + Duration::hours(1),
                duration: 1,
                reserved,
                room: SlotRoom {
                    id: RoomId::new(1),
                    room_letter: None,
                    room_number: None,
                    room_name: Some(room.to_string()),
                    capacity: None,
                },
                owner: SlotOwner {
                    id: UserId::new(42),
                    user_name: owner.to_string(),
                    email: None,
                },
            }
        })
}

fn filter_strategy() -> impl Strategy<Value = StatusFilter> {
    prop_oneof![
        Just(StatusFilter::All),
        Just(StatusFilter::Reserved),
        Just(StatusFilter::Cancelled),
    ]
}

fn term_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", "a", "amphi", "b1", "bob", "3", "zzz"]).prop_map(String::from)
}

proptest! {
    #[test]
    fn sorted_by_start_time(
        bookings in prop::collection::vec(booking_strategy(), 0..40),
        filter in filter_strategy(),
        term in term_strategy(),
    ) {
        let visible = visible_bookings(&bookings, filter, &term);
        for pair in visible.windows(2) {
            prop_assert!(pair[0].start_time <= pair[1].start_time);
        }
    }

    #[test]
    fn exactly_the_matching_bookings(
        bookings in prop::collection::vec(booking_strategy(), 0..40),
        filter in filter_strategy(),
        term in term_strategy(),
    ) {
        let visible = visible_bookings(&bookings, filter, &term);
        for booking in &visible {
            prop_assert!(filter.matches(booking));
            prop_assert!(booking.matches_search(&term));
        }
        let expected = bookings
            .iter()
            .filter(|b| filter.matches(b) && b.matches_search(&term))
            .count();
        prop_assert_eq!(visible.len(), expected);
    }

    #[test]
    fn equal_start_times_keep_fetch_order(
        reserved in prop::collection::vec(any::<bool>(), 1..20),
    ) {
        let start = Utc.with_ymd_and_hms(2025, 1, 16, 9, 0, 0).unwrap();
        let bookings: Vec<BookedSlot> = reserved
            .iter()
            .enumerate()
            .map(|(i, reserved)| BookedSlot {
                id: BookingId::new(i64::try_from(i).unwrap()),
                start_time: start,
                end_time: start + Duration::hours(1),
                duration: 1,
                reserved: *reserved,
                room: SlotRoom {
                    id: RoomId::new(1),
                    room_letter: Some("A".into()),
                    room_number: Some(3),
                    room_name: None,
                    capacity: None,
                },
                owner: SlotOwner {
                    id: UserId::new(42),
                    user_name: "alice".into(),
                    email: None,
                },
            })
            .collect();

        let ids: Vec<i64> = visible_bookings(&bookings, StatusFilter::All, "")
            .iter()
            .map(|b| b.id.value())
            .collect();
        let expected: Vec<i64> = (0..bookings.len()).map(|i| i64::try_from(i).unwrap()).collect();
        prop_assert_eq!(ids, expected);
    }
}
