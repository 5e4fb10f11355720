//! Dashboard summary

use crate::types::{BookedSlot, RoomCatalog, RoomCounts, local_date};
use chrono::{DateTime, FixedOffset, Utc};

/// Upcoming bookings shown in the preview
pub const UPCOMING_PREVIEW: usize = 5;

/// Figures shown on the landing screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Earliest upcoming bookings, at most [`UPCOMING_PREVIEW`]
    pub upcoming: Vec<BookedSlot>,
    /// All reserved bookings starting after now
    pub upcoming_total: usize,
    /// Upcoming bookings starting today (local offset)
    pub today_count: usize,
    /// Catalog size by kind
    pub rooms: RoomCounts,
}

impl DashboardSummary {
    /// Summarize `bookings` as of `now`
    #[must_use]
    pub fn compute(
        catalog: &RoomCatalog,
        bookings: &[BookedSlot],
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Self {
        let mut upcoming: Vec<&BookedSlot> = bookings
            .iter()
            .filter(|b| b.reserved && b.start_time > now)
            .collect();
        upcoming.sort_by_key(|b| b.start_time);

        let today = local_date(now, offset);
        let today_count = upcoming
            .iter()
            .filter(|b| local_date(b.start_time, offset) == today)
            .count();

        Self {
            upcoming_total: upcoming.len(),
            today_count,
            upcoming: upcoming.into_iter().take(UPCOMING_PREVIEW).cloned().collect(),
            rooms: catalog.counts(),
        }
    }

    /// More upcoming bookings exist than the preview shows
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.upcoming_total > self.upcoming.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BookingId, Room, RoomId, SlotOwner, SlotRoom, UserId};
    use chrono::{Duration, TimeZone};
    use roombook_core::environment::Clock;
    use roombook_testing::test_clock;

    fn booking(id: i64, reserved: bool, start: DateTime<Utc>) -> BookedSlot {
        BookedSlot {
            id: BookingId::new(id),
            start_time: start,
            end_time: start + Duration::hours(1),
            duration: 1,
            reserved,
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
        }
    }

    #[test]
    fn upcoming_excludes_past_and_cancelled() {
        let now = test_clock().now();
        let at = |d, h| Utc.with_ymd_and_hms(2025, 1, d, h, 0, 0).unwrap();
        let bookings = vec![
            booking(1, true, at(15, 9)),
            booking(2, true, at(15, 14)),
            booking(3, false, at(15, 15)),
            booking(4, true, at(16, 9)),
        ];
        let catalog = RoomCatalog::new(vec![
            Room::Regular {
                id: RoomId::new(1),
                letter: "A".into(),
                number: 3,
            },
            Room::Amphitheater {
                id: RoomId::new(2),
                name: "Amphi 1".into(),
            },
        ]);

        let summary = DashboardSummary::compute(&catalog, &bookings, now, FixedOffset::east_opt(0).unwrap());
        let ids: Vec<i64> = summary.upcoming.iter().map(|b| b.id.value()).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(summary.today_count, 1);
        assert_eq!(summary.rooms.total, 2);
        assert_eq!(summary.rooms.amphitheater, 1);
        assert!(!summary.has_more());
    }

    #[test]
    fn preview_is_capped() {
        let now = test_clock().now();
        let bookings: Vec<BookedSlot> = (0..8)
            .map(|i| booking(i, true, now + Duration::days(i + 1)))
            .collect();
        let summary =
            DashboardSummary::compute(&RoomCatalog::default(), &bookings, now, FixedOffset::east_opt(0).unwrap());
        assert_eq!(summary.upcoming.len(), UPCOMING_PREVIEW);
        assert_eq!(summary.upcoming_total, 8);
        assert!(summary.has_more());
    }
}
