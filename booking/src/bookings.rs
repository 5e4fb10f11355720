//! Booking list
//!
//! Loads the user's bookings and keeps them in sync locally after each
//! mutation (no refetch). Display order is always filter, then search, then
//! chronological.

use crate::api::{BookingApi, BookingError};
use crate::edit::{BookingEdit, FieldErrors};
use crate::notification::Notification;
use crate::storage::DraftMailbox;
use crate::types::{BookedSlot, BookingId, Credentials, EditRequest, Language, LoadStatus};
use crate::wizard::DEFAULT_SEND_DELAY;
use chrono::FixedOffset;
use roombook_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const LOAD_FAILED: &str = "Failed to load bookings";
const CANCEL_FAILED: &str = "Error cancelling booking";
const NOT_FOUND: &str = "Booking not found";

// ============================================================================
// Filtering
// ============================================================================

/// Status filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// Everything
    #[default]
    All,
    /// `reserved == true`
    Reserved,
    /// `reserved == false`
    Cancelled,
}

impl StatusFilter {
    /// Whether `booking` passes this filter
    #[must_use]
    pub const fn matches(self, booking: &BookedSlot) -> bool {
        match self {
            Self::All => true,
            Self::Reserved => booking.reserved,
            Self::Cancelled => !booking.reserved,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Reserved => "reserved",
            Self::Cancelled => "cancelled",
        })
    }
}

impl FromStr for StatusFilter {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "reserved" => Ok(Self::Reserved),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(BookingError::Validation(format!(
                "Unknown status filter: {other} (expected all, reserved or cancelled)"
            ))),
        }
    }
}

/// Bookings to display: status filter, then search, then stable sort by start
///
/// `term` must already be trimmed and lower-cased; empty matches everything.
#[must_use]
pub fn visible_bookings<'a>(
    bookings: &'a [BookedSlot],
    filter: StatusFilter,
    term: &str,
) -> Vec<&'a BookedSlot> {
    let mut visible: Vec<&BookedSlot> = bookings
        .iter()
        .filter(|booking| filter.matches(booking))
        .filter(|booking| booking.matches_search(term))
        .collect();
    visible.sort_by_key(|booking| booking.start_time);
    visible
}

fn normalize_term(input: &str) -> String {
    input.trim().to_lowercase()
}

// ============================================================================
// State
// ============================================================================

/// Inline edit surface (list-local variant)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineEdit {
    /// Current input; `form.id` is the booking being edited
    pub form: BookingEdit,
    /// Validation errors from the last save attempt
    pub errors: FieldErrors,
}

/// Open confirmation e-mail preview
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationPanel {
    /// Booking the preview is for
    pub booking_id: BookingId,
    /// Preview content
    pub notification: Notification,
    /// Simulated send in progress
    pub sending: bool,
}

/// Booking list state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingListState {
    /// Fetch state
    pub status: LoadStatus,
    /// Bookings in fetch order
    pub bookings: Vec<BookedSlot>,
    /// Status filter
    pub filter: StatusFilter,
    /// Search box content, not yet applied
    pub search_input: String,
    /// Applied search term (trimmed, lower-cased)
    pub search_term: String,
    /// Bookings showing their details
    pub expanded: BTreeSet<BookingId>,
    /// Booking awaiting a yes/no on cancellation
    pub pending_cancel: Option<BookingId>,
    /// Cancellation in flight; the list is disabled meanwhile
    pub in_flight: Option<BookingId>,
    /// Inline edit surface
    pub editing: Option<InlineEdit>,
    /// Request to pass to the standalone edit form
    pub handoff: Option<EditRequest>,
    /// Confirmation preview
    pub notification: Option<NotificationPanel>,
    /// Error banner
    pub error: Option<String>,
    /// Success banner
    pub notice: Option<String>,
    /// Language for previews
    pub language: Language,
}

impl BookingListState {
    /// Empty list
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Bookings as displayed
    #[must_use]
    pub fn visible(&self) -> Vec<&BookedSlot> {
        visible_bookings(&self.bookings, self.filter, &self.search_term)
    }

    /// Booking by id
    #[must_use]
    pub fn get(&self, id: BookingId) -> Option<&BookedSlot> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// A cancellation is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn get_mut(&mut self, id: BookingId) -> Option<&mut BookedSlot> {
        self.bookings.iter_mut().find(|b| b.id == id)
    }

    fn mark_cancelled(&mut self, id: BookingId) {
        if let Some(booking) = self.get_mut(id) {
            booking.reserved = false;
        }
        self.notice = Some("Booking cancelled successfully".to_string());
        self.error = None;
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Booking list actions
#[derive(Clone, Debug)]
pub enum BookingListAction {
    /// Fetch the user's bookings
    Load {
        /// Whose bookings
        credentials: Credentials,
    },
    /// Fetch succeeded
    BookingsLoaded(Vec<BookedSlot>),
    /// Fetch failed
    LoadFailed(BookingError),

    /// Change the status filter
    SetFilter(StatusFilter),
    /// Type into the search box
    SetSearchInput(String),
    /// Apply the search box content
    SubmitSearch,
    /// Set and apply a search term directly
    Search(String),
    /// Show or hide a booking's details
    ToggleExpand(BookingId),

    /// Ask for confirmation before cancelling
    RequestCancel(BookingId),
    /// Keep the booking
    DeclineCancel,
    /// Cancel the booking awaiting confirmation
    ConfirmCancel {
        /// Who is cancelling
        credentials: Credentials,
    },
    /// Backend cancelled the booking
    Cancelled(BookingId),
    /// Backend refused the cancellation
    CancelFailed {
        /// Booking
        id: BookingId,
        /// Why
        error: BookingError,
    },

    /// Open the inline edit surface
    BeginEdit(BookingId),
    /// Save the inline edit
    SaveEdit(BookingEdit),
    /// Close the inline edit surface
    CancelEdit,

    /// Hand a booking to the standalone edit form
    HandOffEdit(BookingId),
    /// Hand-off written to the mailbox
    HandOffPosted(BookingId),
    /// Mailbox write failed (the explicit hand-off still stands)
    HandOffFailed(BookingError),
    /// Merge a booking saved by the standalone edit form
    ApplyEdit(BookedSlot),

    /// Open the confirmation preview for a booking
    ResendConfirmation(BookingId),
    /// Send the previewed e-mail (simulated)
    SendNotification,
    /// Simulated send for a booking's preview finished
    NotificationSent(BookingId),
    /// Close the preview
    DismissNotification,
    /// Switch preview language
    SetLanguage(Language),
    /// Clear error and success banners
    DismissMessages,
}

// ============================================================================
// Environment
// ============================================================================

/// Booking list dependencies
#[derive(Clone)]
pub struct BookingListEnvironment {
    /// Backend
    pub api: Arc<dyn BookingApi>,
    /// Draft hand-off buffer
    pub mailbox: DraftMailbox,
    /// Local offset for edit forms and previews
    pub offset: FixedOffset,
    /// Simulated e-mail send time
    pub send_delay: Duration,
}

impl BookingListEnvironment {
    /// Environment with the default send delay
    #[must_use]
    pub fn new(api: Arc<dyn BookingApi>, mailbox: DraftMailbox, offset: FixedOffset) -> Self {
        Self {
            api,
            mailbox,
            offset,
            send_delay: DEFAULT_SEND_DELAY,
        }
    }

    /// Override the simulated send time
    #[must_use]
    pub const fn with_send_delay(mut self, send_delay: Duration) -> Self {
        self.send_delay = send_delay;
        self
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Booking list reducer
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingListReducer;

impl BookingListReducer {
    /// Create the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

type Effects = SmallVec<[Effect<BookingListAction>; 4]>;

impl Reducer for BookingListReducer {
    type State = BookingListState;
    type Action = BookingListAction;
    type Environment = BookingListEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut BookingListState,
        action: BookingListAction,
        env: &BookingListEnvironment,
    ) -> Effects {
        match action {
            BookingListAction::Load { credentials } => {
                state.status = LoadStatus::Loading;
                state.error = None;
                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    Some(match api.fetch_my_bookings(&credentials).await {
                        Ok(bookings) => BookingListAction::BookingsLoaded(bookings),
                        Err(error) => BookingListAction::LoadFailed(error),
                    })
                })]
            },
            BookingListAction::BookingsLoaded(bookings) => {
                tracing::debug!(count = bookings.len(), "Bookings loaded");
                state.expanded.retain(|id| bookings.iter().any(|b| b.id == *id));
                state.bookings = bookings;
                state.status = LoadStatus::Loaded;
                SmallVec::new()
            },
            BookingListAction::LoadFailed(error) => {
                tracing::warn!(%error, "Bookings unavailable");
                state.bookings.clear();
                state.status = LoadStatus::Failed;
                state.error = Some(error.user_message(LOAD_FAILED));
                SmallVec::new()
            },

            BookingListAction::SetFilter(filter) => {
                state.filter = filter;
                SmallVec::new()
            },
            BookingListAction::SetSearchInput(input) => {
                state.search_input = input;
                SmallVec::new()
            },
            BookingListAction::SubmitSearch => {
                state.search_term = normalize_term(&state.search_input);
                SmallVec::new()
            },
            BookingListAction::Search(term) => {
                state.search_term = normalize_term(&term);
                state.search_input = term;
                SmallVec::new()
            },
            BookingListAction::ToggleExpand(id) => {
                if !state.expanded.remove(&id) {
                    state.expanded.insert(id);
                }
                SmallVec::new()
            },

            BookingListAction::RequestCancel(id) => {
                if state.is_busy() {
                    return SmallVec::new();
                }
                if state.get(id).is_some() {
                    state.pending_cancel = Some(id);
                } else {
                    state.error = Some(NOT_FOUND.to_string());
                }
                SmallVec::new()
            },
            BookingListAction::DeclineCancel => {
                state.pending_cancel = None;
                SmallVec::new()
            },
            BookingListAction::ConfirmCancel { credentials } => {
                if state.is_busy() {
                    tracing::debug!("Cancellation already in flight");
                    return SmallVec::new();
                }
                let Some(id) = state.pending_cancel.take() else {
                    return SmallVec::new();
                };

                tracing::info!(booking_id = %id, "Cancelling booking");
                state.in_flight = Some(id);
                state.error = None;
                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    Some(match api.cancel_reservation(id, &credentials).await {
                        Ok(_) => BookingListAction::Cancelled(id),
                        Err(error) => BookingListAction::CancelFailed { id, error },
                    })
                })]
            },
            BookingListAction::Cancelled(id) => {
                state.in_flight = None;
                state.mark_cancelled(id);
                SmallVec::new()
            },
            BookingListAction::CancelFailed { id, error } => {
                state.in_flight = None;
                let already_cancelled = state.get(id).is_some_and(BookedSlot::is_cancelled);
                if error.is_not_found() && already_cancelled {
                    tracing::debug!(booking_id = %id, "Booking was already cancelled");
                    state.mark_cancelled(id);
                } else {
                    tracing::warn!(booking_id = %id, %error, "Cancellation failed");
                    state.error = Some(error.user_message(CANCEL_FAILED));
                }
                SmallVec::new()
            },

            BookingListAction::BeginEdit(id) => {
                match state.get(id) {
                    Some(booking) => {
                        state.editing = Some(InlineEdit {
                            form: BookingEdit::from_booking(booking, env.offset),
                            errors: FieldErrors::new(),
                        });
                    },
                    None => state.error = Some(NOT_FOUND.to_string()),
                }
                SmallVec::new()
            },
            BookingListAction::SaveEdit(form) => {
                save_inline_edit(state, form, env.offset);
                SmallVec::new()
            },
            BookingListAction::CancelEdit => {
                state.editing = None;
                SmallVec::new()
            },

            BookingListAction::HandOffEdit(id) => {
                let Some(booking) = state.get(id) else {
                    state.error = Some(NOT_FOUND.to_string());
                    return SmallVec::new();
                };
                let request = EditRequest::new(booking.clone());
                state.handoff = Some(request.clone());

                let mailbox = env.mailbox.clone();
                smallvec![Effect::future(async move {
                    Some(match mailbox.post_async(request).await {
                        Ok(()) => BookingListAction::HandOffPosted(id),
                        Err(error) => BookingListAction::HandOffFailed(error),
                    })
                })]
            },
            BookingListAction::HandOffPosted(id) => {
                tracing::debug!(booking_id = %id, "Edit hand-off posted");
                SmallVec::new()
            },
            BookingListAction::HandOffFailed(error) => {
                tracing::warn!(%error, "Edit draft could not be stored");
                state.error = Some(format!("Edit draft could not be saved locally: {error}"));
                SmallVec::new()
            },
            BookingListAction::ApplyEdit(edited) => {
                apply_edit(state, edited);
                SmallVec::new()
            },

            BookingListAction::ResendConfirmation(id) => {
                match state.get(id) {
                    Some(booking) => {
                        state.notification = Some(NotificationPanel {
                            booking_id: id,
                            notification: Notification::from_booking(booking, env.offset, state.language),
                            sending: false,
                        });
                    },
                    None => state.error = Some(NOT_FOUND.to_string()),
                }
                SmallVec::new()
            },
            BookingListAction::SendNotification => match &mut state.notification {
                Some(panel) if !panel.sending => {
                    panel.sending = true;
                    smallvec![Effect::Delay {
                        duration: env.send_delay,
                        action: Box::new(BookingListAction::NotificationSent(panel.booking_id)),
                    }]
                },
                _ => SmallVec::new(),
            },
            BookingListAction::NotificationSent(id) => {
                let sent = state
                    .notification
                    .as_ref()
                    .is_some_and(|panel| panel.booking_id == id && panel.sending);
                if sent {
                    state.notification = None;
                    state.notice = Some("Email sent successfully!".to_string());
                } else {
                    tracing::debug!(booking_id = %id, "Stale notification send ignored");
                }
                SmallVec::new()
            },
            BookingListAction::DismissNotification => {
                state.notification = None;
                SmallVec::new()
            },
            BookingListAction::SetLanguage(language) => {
                state.language = language;
                if let Some(panel) = &mut state.notification {
                    panel.notification.language = language;
                }
                SmallVec::new()
            },
            BookingListAction::DismissMessages => {
                state.error = None;
                state.notice = None;
                SmallVec::new()
            },
        }
    }
}

fn save_inline_edit(state: &mut BookingListState, form: BookingEdit, offset: FixedOffset) {
    let Some(editing) = &state.editing else {
        return;
    };
    if editing.form.id != form.id {
        tracing::debug!(id = %form.id, "Inline save for another booking ignored");
        return;
    }

    let Some(original) = state.get(form.id) else {
        state.editing = None;
        state.error = Some(NOT_FOUND.to_string());
        return;
    };

    match form.apply_to(original, offset) {
        Ok(updated) => {
            if let Some(slot) = state.get_mut(updated.id) {
                *slot = updated;
            }
            state.editing = None;
            state.notice = Some("Booking updated successfully".to_string());
        },
        Err(errors) => state.editing = Some(InlineEdit { form, errors }),
    }
}

fn apply_edit(state: &mut BookingListState, mut edited: BookedSlot) {
    let Some(slot) = state.get_mut(edited.id) else {
        state.error = Some(NOT_FOUND.to_string());
        return;
    };
    let id = edited.id;
    edited.reserved = slot.reserved;
    *slot = edited;

    if state.handoff.as_ref().is_some_and(|request| request.booking_id() == id) {
        state.handoff = None;
    }
    state.notice = Some("Booking updated successfully".to_string());
}
