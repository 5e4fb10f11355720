//! # Roombook Testing
//!
//! Test support for roombook reducers:
//! - [`FixedClock`] / [`test_clock`] for deterministic "today"
//! - [`ReducerTest`] for Given-When-Then reducer tests
//! - [`assertions`] for inspecting returned effects
//!
//! ```ignore
//! ReducerTest::new(BookingListReducer::new())
//!     .with_env(env)
//!     .given_state(state_with_bookings())
//!     .when_action(BookingListAction::SetFilter(StatusFilter::Reserved))
//!     .then_state(|state| assert_eq!(state.visible().len(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use roombook_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex};

    /// Clock pinned to one instant
    ///
    /// ```
    /// use roombook_testing::mocks::FixedClock;
    /// use roombook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock to another instant (shared by all clones)
        pub fn set(&self, time: DateTime<Utc>) {
            if let Ok(mut guard) = self.time.lock() {
                *guard = time;
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time.lock().map_or_else(|poisoned| *poisoned.into_inner(), |guard| *guard)
        }
    }

    /// Fixed clock at 2025-01-15 10:30:00 UTC, a Wednesday mid-morning
    ///
    /// # Panics
    ///
    /// Never in practice; the timestamp is a literal.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-15T10:30:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn fixed_clock_can_be_moved() {
        let clock = test_clock();
        let shared = clock.clone();
        let later = clock.now() + Duration::days(1);
        shared.set(later);
        assert_eq!(clock.now(), later);
    }
}
