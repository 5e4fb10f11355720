//! Standalone booking edit form
//!
//! Opened with the [`EditRequest`] handed over by the booking list (or read
//! back from the draft mailbox after a restart). The form only ever shows the
//! booking whose id matches the route; anything else is a
//! [`BookingError::Mismatch`] and the foreign booking is dropped unseen.

use crate::api::BookingError;
use crate::storage::DraftMailbox;
use crate::types::{BookedSlot, BookingId, CLOSING_HOUR, EditRequest, TimeSlot};
use chrono::{Duration, FixedOffset, NaiveDate, Timelike};
use roombook_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::collections::BTreeMap;

/// Longest booking the form accepts
pub const MAX_DURATION_HOURS: u32 = 9;

/// Fields that can carry a validation error
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditField {
    /// Day
    Date,
    /// Start hour
    Start,
    /// Length in hours
    Duration,
}

/// Validation errors by field
pub type FieldErrors = BTreeMap<EditField, String>;

/// Editable projection of a booking
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingEdit {
    /// Booking being edited (never changes)
    pub id: BookingId,
    /// Day
    pub date: Option<NaiveDate>,
    /// Start hour
    pub start: Option<TimeSlot>,
    /// Length in hours
    pub duration_hours: u32,
}

impl BookingEdit {
    /// Form pre-filled from `booking` in the local offset
    #[must_use]
    pub fn from_booking(booking: &BookedSlot, offset: FixedOffset) -> Self {
        let local = booking.start_time.with_timezone(&offset);
        Self {
            id: booking.id,
            date: Some(local.date_naive()),
            start: TimeSlot::new(local.hour()),
            duration_hours: booking.duration,
        }
    }

    /// Check every field
    ///
    /// # Errors
    ///
    /// One message per invalid field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        self.checked().map(|_| ())
    }

    fn checked(&self) -> Result<(NaiveDate, TimeSlot, u32), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.date.is_none() {
            errors.insert(EditField::Date, "Date is required".to_string());
        }
        if self.start.is_none() {
            errors.insert(
                EditField::Start,
                "Start time must be on the hour between 08:00 and 16:00".to_string(),
            );
        }
        if !(1..=MAX_DURATION_HOURS).contains(&self.duration_hours) {
            errors.insert(
                EditField::Duration,
                format!("Duration must be between 1 and {MAX_DURATION_HOURS} hours"),
            );
        } else if let Some(start) = self.start {
            if start.start_hour() + self.duration_hours > CLOSING_HOUR {
                errors.insert(
                    EditField::Duration,
                    format!("Booking must end by {CLOSING_HOUR}:00"),
                );
            }
        }

        match (self.date, self.start) {
            (Some(date), Some(start)) if errors.is_empty() => Ok((date, start, self.duration_hours)),
            _ => Err(errors),
        }
    }

    /// `booking` with this form's schedule
    ///
    /// Id, room, owner and `reserved` are carried over untouched.
    ///
    /// # Errors
    ///
    /// Validation errors by field.
    pub fn apply_to(&self, booking: &BookedSlot, offset: FixedOffset) -> Result<BookedSlot, FieldErrors> {
        let (date, start, duration) = self.checked()?;
        let start_time = start.start_on(date, offset).ok_or_else(|| {
            FieldErrors::from([(EditField::Date, "Date is not representable".to_string())])
        })?;

        Ok(BookedSlot {
            start_time,
            end_time: start_time + Duration::hours(i64::from(duration)),
            duration,
            ..booking.clone()
        })
    }
}

/// Where the form is
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditPhase {
    /// Not opened yet
    #[default]
    Closed,
    /// Showing the form
    Editing {
        /// Booking as handed over
        original: BookedSlot,
        /// Current input
        form: BookingEdit,
        /// Validation errors from the last save attempt
        errors: FieldErrors,
    },
    /// Saved; the shell hands `booking` back to the list
    Saved {
        /// Updated booking
        booking: BookedSlot,
    },
    /// Closed without saving
    Cancelled,
    /// Could not open
    Error(BookingError),
}

/// Edit form state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditFormState {
    /// Id from the route the form was opened for
    pub route_id: Option<BookingId>,
    /// Current phase
    pub phase: EditPhase,
    /// Non-fatal mailbox problem
    pub warning: Option<String>,
}

impl EditFormState {
    /// Closed form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Message to show when the form could not open
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match &self.phase {
            EditPhase::Error(error) => Some(error.user_message("Booking not found")),
            _ => None,
        }
    }
}

/// Edit form actions
#[derive(Clone, Debug)]
pub enum EditAction {
    /// Open for `route_id` with the handed-over request
    Open {
        /// Id the form was navigated to
        route_id: BookingId,
        /// Booking handed over by the list
        request: Option<EditRequest>,
    },
    /// Open for `route_id` from whatever the mailbox holds
    OpenFromMailbox {
        /// Id the form was navigated to
        route_id: BookingId,
    },
    /// Replace the form input
    UpdateForm(BookingEdit),
    /// Validate and save
    Save,
    /// Close without saving
    Cancel,
    /// Mailbox emptied
    MailboxCleared,
    /// Mailbox could not be read or cleared
    MailboxFailed(BookingError),
}

/// Edit form dependencies
#[derive(Clone, Debug)]
pub struct EditEnvironment {
    /// Draft hand-off buffer
    pub mailbox: DraftMailbox,
    /// Local offset for the date and start fields
    pub offset: FixedOffset,
}

impl EditEnvironment {
    /// Environment over a mailbox
    #[must_use]
    pub const fn new(mailbox: DraftMailbox, offset: FixedOffset) -> Self {
        Self { mailbox, offset }
    }
}

/// Edit form reducer
#[derive(Clone, Copy, Debug, Default)]
pub struct EditReducer;

impl EditReducer {
    /// Create the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

type Effects = SmallVec<[Effect<EditAction>; 4]>;

impl Reducer for EditReducer {
    type State = EditFormState;
    type Action = EditAction;
    type Environment = EditEnvironment;

    fn reduce(&self, state: &mut EditFormState, action: EditAction, env: &EditEnvironment) -> Effects {
        match action {
            EditAction::Open { route_id, request } => {
                state.route_id = Some(route_id);
                state.warning = None;
                state.phase = match request {
                    None => EditPhase::Error(BookingError::not_found("Booking not found")),
                    Some(request) if request.booking_id() != route_id => {
                        tracing::warn!(
                            expected = %route_id,
                            found = %request.booking_id(),
                            "Edit hand-off does not match the route"
                        );
                        EditPhase::Error(BookingError::Mismatch {
                            expected: route_id,
                            found: request.booking_id(),
                        })
                    },
                    Some(request) => EditPhase::Editing {
                        form: BookingEdit::from_booking(&request.booking, env.offset),
                        original: request.booking,
                        errors: FieldErrors::new(),
                    },
                };
                SmallVec::new()
            },

            EditAction::OpenFromMailbox { route_id } => {
                state.route_id = Some(route_id);
                let mailbox = env.mailbox.clone();
                smallvec![Effect::future(async move {
                    Some(match mailbox.peek_async().await {
                        Ok(request) => EditAction::Open { route_id, request },
                        Err(error) => EditAction::MailboxFailed(error),
                    })
                })]
            },

            EditAction::UpdateForm(input) => {
                if let EditPhase::Editing { original, form, errors } = &mut state.phase {
                    if input.id == original.id {
                        *form = input;
                        errors.clear();
                    } else {
                        tracing::debug!(id = %input.id, "Form input for another booking ignored");
                    }
                }
                SmallVec::new()
            },

            EditAction::Save => {
                let EditPhase::Editing { original, form, errors } = &mut state.phase else {
                    return SmallVec::new();
                };
                match form.apply_to(original, env.offset) {
                    Ok(booking) => {
                        tracing::info!(booking_id = %booking.id, "Booking edit saved");
                        state.phase = EditPhase::Saved { booking };
                        clear_mailbox(env)
                    },
                    Err(invalid) => {
                        *errors = invalid;
                        SmallVec::new()
                    },
                }
            },

            EditAction::Cancel => {
                if matches!(state.phase, EditPhase::Saved { .. }) {
                    return SmallVec::new();
                }
                state.phase = EditPhase::Cancelled;
                clear_mailbox(env)
            },

            EditAction::MailboxCleared => {
                tracing::debug!("Edit draft cleared");
                SmallVec::new()
            },

            EditAction::MailboxFailed(error) => {
                tracing::warn!(%error, "Edit draft mailbox unavailable");
                if state.phase == EditPhase::Closed {
                    state.phase = EditPhase::Error(error);
                } else {
                    state.warning = Some(error.to_string());
                }
                SmallVec::new()
            },
        }
    }
}

fn clear_mailbox(env: &EditEnvironment) -> Effects {
    let mailbox = env.mailbox.clone();
    smallvec![Effect::future(async move {
        Some(match mailbox.clear_async().await {
            Ok(()) => EditAction::MailboxCleared,
            Err(error) => EditAction::MailboxFailed(error),
        })
    })]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{RoomId, SlotOwner, SlotRoom, UserId};
    use chrono::{TimeZone, Utc};
    use roombook_testing::{ReducerTest, assertions};
    use std::sync::Arc;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn booking(id: i64, reserved: bool) -> BookedSlot {
        let start = Utc.with_ymd_and_hms(2025, 1, 16, 9, 0, 0).unwrap();
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

    fn env() -> EditEnvironment {
        EditEnvironment::new(DraftMailbox::new(Arc::new(MemoryStore::new())), utc())
    }

    fn editing(booking: BookedSlot) -> EditFormState {
        EditFormState {
            route_id: Some(booking.id),
            phase: EditPhase::Editing {
                form: BookingEdit::from_booking(&booking, utc()),
                original: booking,
                errors: FieldErrors::new(),
            },
            warning: None,
        }
    }

    #[test]
    fn form_is_prefilled_from_booking() {
        let form = BookingEdit::from_booking(&booking(5, true), utc());
        assert_eq!(form.id, BookingId::new(5));
        assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 1, 16));
        assert_eq!(form.start, TimeSlot::new(9));
        assert_eq!(form.duration_hours, 1);
    }

    #[test]
    fn validation_reports_each_field() {
        let form = BookingEdit {
            id: BookingId::new(5),
            date: None,
            start: None,
            duration_hours: 0,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 3);

        let late = BookingEdit {
            id: BookingId::new(5),
            date: NaiveDate::from_ymd_opt(2025, 1, 16),
            start: TimeSlot::new(15),
            duration_hours: 3,
        };
        let errors = late.validate().unwrap_err();
        assert_eq!(errors.get(&EditField::Duration).unwrap(), "Booking must end by 17:00");
    }

    #[test]
    fn apply_keeps_identity_and_status() {
        let original = booking(5, false);
        let form = BookingEdit {
            id: BookingId::new(5),
            date: NaiveDate::from_ymd_opt(2025, 1, 17),
            start: TimeSlot::new(14),
            duration_hours: 2,
        };
        let updated = form.apply_to(&original, utc()).unwrap();
        assert_eq!(updated.id, original.id);
        assert!(!updated.reserved);
        assert_eq!(updated.start_time, Utc.with_ymd_and_hms(2025, 1, 17, 14, 0, 0).unwrap());
        assert_eq!(updated.end_time, Utc.with_ymd_and_hms(2025, 1, 17, 16, 0, 0).unwrap());
        assert_eq!(updated.duration, 2);
    }

    #[test]
    fn mismatched_hand_off_is_an_error_without_booking_data() {
        ReducerTest::new(EditReducer::new())
            .with_env(env())
            .given_state(EditFormState::new())
            .when_action(EditAction::Open {
                route_id: BookingId::new(5),
                request: Some(EditRequest::new(booking(7, true))),
            })
            .then_state(|state| {
                assert_eq!(
                    state.phase,
                    EditPhase::Error(BookingError::Mismatch {
                        expected: BookingId::new(5),
                        found: BookingId::new(7),
                    })
                );
                assert_eq!(
                    state.error_message().as_deref(),
                    Some("Error loading correct booking data")
                );
            })
            .run();
    }

    #[test]
    fn missing_hand_off_is_not_found() {
        ReducerTest::new(EditReducer::new())
            .with_env(env())
            .given_state(EditFormState::new())
            .when_action(EditAction::Open {
                route_id: BookingId::new(5),
                request: None,
            })
            .then_state(|state| {
                assert_eq!(state.error_message().as_deref(), Some("Booking not found"));
            })
            .run();
    }

    #[test]
    fn invalid_save_stays_editing_with_errors() {
        let mut form = BookingEdit::from_booking(&booking(5, true), utc());
        form.duration_hours = 12;
        ReducerTest::new(EditReducer::new())
            .with_env(env())
            .given_state(editing(booking(5, true)))
            .when_action(EditAction::UpdateForm(form))
            .when_action(EditAction::Save)
            .then_state(|state| match &state.phase {
                EditPhase::Editing { errors, .. } => {
                    assert!(errors.contains_key(&EditField::Duration));
                },
                other => panic!("unexpected phase {other:?}"),
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn save_produces_updated_booking_and_clears_mailbox() {
        let mut form = BookingEdit::from_booking(&booking(5, true), utc());
        form.start = TimeSlot::new(11);
        ReducerTest::new(EditReducer::new())
            .with_env(env())
            .given_state(editing(booking(5, true)))
            .when_action(EditAction::UpdateForm(form))
            .when_action(EditAction::Save)
            .then_state(|state| match &state.phase {
                EditPhase::Saved { booking } => {
                    assert_eq!(booking.id, BookingId::new(5));
                    assert_eq!(
                        booking.start_time,
                        Utc.with_ymd_and_hms(2025, 1, 16, 11, 0, 0).unwrap()
                    );
                },
                other => panic!("unexpected phase {other:?}"),
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn cancel_empties_the_mailbox() {
        let env = env();
        env.mailbox.post(&EditRequest::new(booking(5, true))).unwrap();

        let mut state = editing(booking(5, true));
        let effects = EditReducer::new().reduce(&mut state, EditAction::Cancel, &env);
        assert_eq!(state.phase, EditPhase::Cancelled);

        let Some(Effect::Future(clear)) = effects.into_iter().next() else {
            panic!("expected a mailbox effect");
        };
        assert!(matches!(clear.await, Some(EditAction::MailboxCleared)));
        assert_eq!(env.mailbox.peek().unwrap(), None);
    }
}
