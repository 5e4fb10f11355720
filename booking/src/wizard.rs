//! Reservation wizard
//!
//! Room → date → time → submit, as a tagged union where each step carries
//! exactly the data valid at that point. A confirmed batch can be declined,
//! which cancels every created reservation concurrently.
//!
//! ```text
//! SelectingRoom ─Next→ SelectingDate ─Next→ SelectingTime ─Submit→ Submitting
//!                                                                 ├→ Confirmed ─Decline→ CancellingBatch
//!                                                                 └→ Failed ─Submit→ Submitting
//! ```

use crate::api::{BookingApi, BookingError};
use crate::types::{
    BookingId, CreatedReservation, Credentials, LoadStatus, ReservationRequest, ReserveResponse,
    Room, RoomCatalog, RoomId, RoomKind, TimeSlot, UserId, local_date,
};
use chrono::{FixedOffset, NaiveDate};
use futures::future::join_all;
use roombook_core::environment::Clock;
use roombook_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

const PAST_DATE: &str = "Please select today or a future date";
const NO_ROOM: &str = "Please select a valid room";
const NO_SLOTS: &str = "Please select at least one time slot";
const SUBMIT_FAILED: &str = "Failed to reserve the selected slots. Please try again.";
const NOTHING_TO_CANCEL: &str = "No reservation details found to cancel";

/// Default simulated e-mail send time
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// State
// ============================================================================

/// Fields that can carry an inline error
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardField {
    /// Room catalog banner
    Catalog,
    /// Room picker
    Room,
    /// Date picker
    Date,
    /// Time slot grid
    TimeSlots,
    /// Whole form (submission failures)
    Form,
    /// Batch cancellation
    Cancel,
}

/// Partial room selection on the first step
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomPick {
    /// Regular room or amphitheater
    pub kind: RoomKind,
    /// Building letter (regular rooms)
    pub letter: Option<String>,
    /// Room number (regular rooms)
    pub number: Option<u32>,
    /// Amphitheater name
    pub amphitheater: Option<String>,
}

impl RoomPick {
    /// Room id the pick designates in `catalog`, if any
    #[must_use]
    pub fn resolve(&self, catalog: &RoomCatalog) -> Option<RoomId> {
        match self.kind {
            RoomKind::Regular => catalog.resolve(self.letter.as_deref()?, self.number?),
            RoomKind::Amphitheater => catalog.amphitheater(self.amphitheater.as_deref()?),
        }
    }
}

/// Resolved room plus the pick that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChosenRoom {
    /// Room id
    pub id: RoomId,
    /// Display name
    pub name: String,
    /// Selection to restore when going back
    pub pick: RoomPick,
}

/// Everything needed to submit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservationDraft {
    /// Room
    pub room: ChosenRoom,
    /// Day
    pub date: NaiveDate,
    /// Selected hours
    pub slots: BTreeSet<TimeSlot>,
}

impl ReservationDraft {
    /// One request per slot, in ascending slot order
    ///
    /// Each `start_time` is the draft date at the slot's start hour in
    /// `offset`, expressed in UTC.
    #[must_use]
    pub fn requests(&self, user_id: UserId, offset: FixedOffset) -> Vec<ReservationRequest> {
        self.slots
            .iter()
            .filter_map(|slot| slot.start_on(self.date, offset))
            .map(|start_time| ReservationRequest {
                start_time,
                room_id: self.room.id,
                user_id,
            })
            .collect()
    }

    fn into_time_step(self) -> WizardStep {
        WizardStep::SelectingTime {
            room: self.room,
            date: self.date,
            slots: self.slots,
        }
    }
}

/// Outcome of a successful submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Room id
    pub room: RoomId,
    /// Room display name
    pub room_name: String,
    /// Day
    pub date: NaiveDate,
    /// Hours that were submitted
    pub slots: Vec<TimeSlot>,
    /// Reservations the backend reported as created (still booked)
    pub created: Vec<CreatedReservation>,
    /// Backend message
    pub message: Option<String>,
}

impl Receipt {
    /// Ids of the created reservations
    #[must_use]
    pub fn booking_ids(&self) -> Vec<BookingId> {
        self.created.iter().map(|c| c.id).collect()
    }
}

/// Wizard step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardStep {
    /// Choosing a room
    SelectingRoom {
        /// Current partial selection
        pick: RoomPick,
    },
    /// Choosing a day
    SelectingDate {
        /// Resolved room
        room: ChosenRoom,
        /// Selected day (defaults to today)
        date: NaiveDate,
    },
    /// Toggling hours
    SelectingTime {
        /// Resolved room
        room: ChosenRoom,
        /// Selected day
        date: NaiveDate,
        /// Selected hours
        slots: BTreeSet<TimeSlot>,
    },
    /// Waiting for the backend
    Submitting {
        /// What was submitted
        draft: ReservationDraft,
    },
    /// Backend accepted the batch
    Confirmed {
        /// What was booked
        receipt: Receipt,
    },
    /// Declined; cancellations in flight
    CancellingBatch {
        /// What is being cancelled
        receipt: Receipt,
    },
    /// Backend rejected the batch; the draft is kept for a retry
    Failed {
        /// The exact draft that was submitted
        draft: ReservationDraft,
        /// Why it failed
        error: BookingError,
    },
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::SelectingRoom {
            pick: RoomPick::default(),
        }
    }
}

impl WizardStep {
    /// Step name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectingRoom { .. } => "selecting_room",
            Self::SelectingDate { .. } => "selecting_date",
            Self::SelectingTime { .. } => "selecting_time",
            Self::Submitting { .. } => "submitting",
            Self::Confirmed { .. } => "confirmed",
            Self::CancellingBatch { .. } => "cancelling_batch",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Wizard state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WizardState {
    /// Current step
    pub step: WizardStep,
    /// Rooms fetched for this wizard
    pub catalog: RoomCatalog,
    /// Catalog fetch state
    pub catalog_status: LoadStatus,
    /// Inline errors by field
    pub errors: BTreeMap<WizardField, String>,
    /// Informational message (batch cancelled, confirmation sent)
    pub notice: Option<String>,
    /// Simulated confirmation e-mail in progress
    pub sending_confirmation: bool,
}

impl WizardState {
    /// Fresh wizard on the room step
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wizard on the room step over an already-fetched catalog
    #[must_use]
    pub fn with_catalog(rooms: Vec<Room>) -> Self {
        Self {
            catalog: RoomCatalog::new(rooms),
            catalog_status: LoadStatus::Loaded,
            ..Self::default()
        }
    }

    /// Error shown next to `field`
    #[must_use]
    pub fn error(&self, field: WizardField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Hours selected on the time step (or kept in a failed draft)
    #[must_use]
    pub const fn selected_slots(&self) -> Option<&BTreeSet<TimeSlot>> {
        match &self.step {
            WizardStep::SelectingTime { slots, .. } => Some(slots),
            WizardStep::Submitting { draft } | WizardStep::Failed { draft, .. } => Some(&draft.slots),
            _ => None,
        }
    }

    /// A submission is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.step, WizardStep::Submitting { .. })
    }

    /// Receipt of the confirmed (or being cancelled) batch
    #[must_use]
    pub const fn receipt(&self) -> Option<&Receipt> {
        match &self.step {
            WizardStep::Confirmed { receipt } | WizardStep::CancellingBatch { receipt } => Some(receipt),
            _ => None,
        }
    }

    fn restart(&mut self) {
        self.step = WizardStep::default();
        self.sending_confirmation = false;
        self.errors.retain(|field, _| *field == WizardField::Catalog);
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Everything that can happen to the wizard
#[derive(Clone, Debug)]
pub enum WizardAction {
    /// Fetch the room catalog
    LoadRooms,
    /// Catalog fetched
    RoomsLoaded(Vec<Room>),
    /// Catalog fetch failed
    RoomsFailed(BookingError),

    /// Switch between regular rooms and amphitheaters
    ChooseRoomKind(RoomKind),
    /// Pick a building letter (clears the number)
    ChooseLetter(String),
    /// Pick a room number
    ChooseNumber(u32),
    /// Pick an amphitheater by name
    ChooseAmphitheater(String),

    /// Advance to the next step if the current one is valid
    Next,
    /// Go back one step
    Back,
    /// Pick a day
    SelectDate(NaiveDate),
    /// Add or remove an hour
    ToggleSlot(TimeSlot),

    /// Submit the draft (also retries a failed one)
    Submit {
        /// Who is booking
        credentials: Credentials,
    },
    /// Backend accepted the batch
    ReservationsCreated(ReserveResponse),
    /// Backend rejected the batch
    SubmissionFailed(BookingError),

    /// Send the confirmation e-mail (simulated)
    AcceptConfirmation,
    /// Simulated send finished
    ConfirmationSent,
    /// Close the confirmation without sending
    DismissConfirmation,
    /// Undo the confirmed batch
    DeclineBooking {
        /// Who is cancelling
        credentials: Credentials,
    },
    /// Every cancellation of a declined batch has settled
    BatchCancelled {
        /// Ids now cancelled
        cancelled: Vec<BookingId>,
        /// Ids still booked and why
        failed: Vec<(BookingId, BookingError)>,
    },

    /// Start over on the room step, keeping the catalog
    Restart,
}

// ============================================================================
// Environment
// ============================================================================

/// Wizard dependencies
#[derive(Clone)]
pub struct WizardEnvironment {
    /// Backend
    pub api: Arc<dyn BookingApi>,
    /// Source of "today"
    pub clock: Arc<dyn Clock>,
    /// Local offset for dates and slot start times
    pub offset: FixedOffset,
    /// Simulated e-mail send time
    pub send_delay: Duration,
}

impl WizardEnvironment {
    /// Environment with the default send delay
    #[must_use]
    pub fn new(api: Arc<dyn BookingApi>, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self {
            api,
            clock,
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

    /// Today in the local offset
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        local_date(self.clock.now(), self.offset)
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reservation wizard reducer
#[derive(Clone, Copy, Debug, Default)]
pub struct WizardReducer;

impl WizardReducer {
    /// Create the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

type Effects = SmallVec<[Effect<WizardAction>; 4]>;

impl Reducer for WizardReducer {
    type State = WizardState;
    type Action = WizardAction;
    type Environment = WizardEnvironment;

    fn reduce(
        &self,
        state: &mut WizardState,
        action: WizardAction,
        env: &WizardEnvironment,
    ) -> Effects {
        match action {
            WizardAction::LoadRooms => load_rooms(state, env),
            WizardAction::RoomsLoaded(rooms) => {
                tracing::debug!(count = rooms.len(), "Room catalog loaded");
                state.catalog = RoomCatalog::new(rooms);
                state.catalog_status = LoadStatus::Loaded;
                SmallVec::new()
            },
            WizardAction::RoomsFailed(error) => {
                tracing::warn!(%error, "Room catalog unavailable");
                state.catalog = RoomCatalog::default();
                state.catalog_status = LoadStatus::Failed;
                state.errors.insert(
                    WizardField::Catalog,
                    error.user_message("Failed to load rooms. Please try again later."),
                );
                SmallVec::new()
            },

            WizardAction::ChooseRoomKind(kind) => {
                edit_pick(state, |pick| {
                    if pick.kind != kind {
                        *pick = RoomPick {
                            kind,
                            ..RoomPick::default()
                        };
                    }
                });
                SmallVec::new()
            },
            WizardAction::ChooseLetter(letter) => {
                edit_pick(state, |pick| {
                    pick.kind = RoomKind::Regular;
                    pick.letter = Some(letter.trim().to_uppercase());
                    pick.number = None;
                });
                SmallVec::new()
            },
            WizardAction::ChooseNumber(number) => {
                edit_pick(state, |pick| pick.number = Some(number));
                SmallVec::new()
            },
            WizardAction::ChooseAmphitheater(name) => {
                edit_pick(state, |pick| {
                    pick.kind = RoomKind::Amphitheater;
                    pick.amphitheater = Some(name);
                });
                SmallVec::new()
            },

            WizardAction::Next => {
                next(state, env.today());
                SmallVec::new()
            },
            WizardAction::Back => {
                back(state);
                SmallVec::new()
            },
            WizardAction::SelectDate(date) => {
                select_date(state, date, env.today());
                SmallVec::new()
            },
            WizardAction::ToggleSlot(slot) => {
                toggle_slot(state, slot);
                SmallVec::new()
            },

            WizardAction::Submit { credentials } => submit(state, credentials, env),
            WizardAction::ReservationsCreated(response) => {
                reservations_created(state, response);
                SmallVec::new()
            },
            WizardAction::SubmissionFailed(error) => {
                submission_failed(state, error);
                SmallVec::new()
            },

            WizardAction::AcceptConfirmation => {
                if !matches!(state.step, WizardStep::Confirmed { .. }) || state.sending_confirmation {
                    return SmallVec::new();
                }
                state.sending_confirmation = true;
                smallvec![Effect::Delay {
                    duration: env.send_delay,
                    action: Box::new(WizardAction::ConfirmationSent),
                }]
            },
            WizardAction::ConfirmationSent => {
                let confirmed = matches!(state.step, WizardStep::Confirmed { .. });
                if confirmed && state.sending_confirmation {
                    state.restart();
                    state.notice = Some("Confirmation e-mail sent".to_string());
                }
                SmallVec::new()
            },
            WizardAction::DismissConfirmation => {
                if matches!(state.step, WizardStep::Confirmed { .. }) {
                    state.restart();
                }
                SmallVec::new()
            },
            WizardAction::DeclineBooking { credentials } => decline(state, credentials, env),
            WizardAction::BatchCancelled { cancelled, failed } => {
                batch_cancelled(state, &cancelled, &failed);
                SmallVec::new()
            },

            WizardAction::Restart => {
                state.restart();
                state.notice = None;
                SmallVec::new()
            },
        }
    }
}

fn load_rooms(state: &mut WizardState, env: &WizardEnvironment) -> Effects {
    state.catalog_status = LoadStatus::Loading;
    state.errors.remove(&WizardField::Catalog);

    let api = Arc::clone(&env.api);
    smallvec![Effect::future(async move {
        Some(match api.fetch_rooms().await {
            Ok(rooms) => WizardAction::RoomsLoaded(rooms),
            Err(error) => WizardAction::RoomsFailed(error),
        })
    })]
}

fn edit_pick(state: &mut WizardState, edit: impl FnOnce(&mut RoomPick)) {
    if let WizardStep::SelectingRoom { pick } = &mut state.step {
        edit(pick);
        state.errors.remove(&WizardField::Room);
    } else {
        tracing::debug!(step = state.step.name(), "Room pick ignored outside the room step");
    }
}

fn next(state: &mut WizardState, today: NaiveDate) {
    state.step = match std::mem::take(&mut state.step) {
        WizardStep::SelectingRoom { pick } => match pick.resolve(&state.catalog) {
            Some(id) => {
                state.errors.remove(&WizardField::Room);
                let name = state
                    .catalog
                    .display_name(id)
                    .unwrap_or_else(|| id.to_string());
                WizardStep::SelectingDate {
                    room: ChosenRoom { id, name, pick },
                    date: today,
                }
            },
            None => {
                state.errors.insert(WizardField::Room, NO_ROOM.to_string());
                WizardStep::SelectingRoom { pick }
            },
        },
        WizardStep::SelectingDate { room, date } => {
            if date < today {
                state.errors.insert(WizardField::Date, PAST_DATE.to_string());
                WizardStep::SelectingDate { room, date }
            } else {
                state.errors.remove(&WizardField::Date);
                WizardStep::SelectingTime {
                    room,
                    date,
                    slots: BTreeSet::new(),
                }
            }
        },
        other => other,
    };
}

fn back(state: &mut WizardState) {
    state.step = match std::mem::take(&mut state.step) {
        WizardStep::SelectingDate { room, .. } => WizardStep::SelectingRoom { pick: room.pick },
        WizardStep::SelectingTime { room, date, .. } => WizardStep::SelectingDate { room, date },
        WizardStep::Failed { draft, .. } => {
            state.errors.remove(&WizardField::Form);
            draft.into_time_step()
        },
        other => other,
    };
    state.errors.remove(&WizardField::Date);
    state.errors.remove(&WizardField::TimeSlots);
}

fn select_date(state: &mut WizardState, date: NaiveDate, today: NaiveDate) {
    let accepts_date = matches!(
        state.step,
        WizardStep::SelectingDate { .. } | WizardStep::SelectingTime { .. } | WizardStep::Failed { .. }
    );
    if !accepts_date {
        tracing::debug!(step = state.step.name(), "Date ignored outside the date/time steps");
        return;
    }
    if date < today {
        state.errors.insert(WizardField::Date, PAST_DATE.to_string());
        return;
    }
    state.errors.remove(&WizardField::Date);

    state.step = match std::mem::take(&mut state.step) {
        WizardStep::SelectingDate { room, .. } => WizardStep::SelectingDate { room, date },
        WizardStep::SelectingTime {
            room,
            date: previous,
            slots,
        } => WizardStep::SelectingTime {
            room,
            date,
            slots: if previous == date { slots } else { BTreeSet::new() },
        },
        WizardStep::Failed { draft, .. } => {
            state.errors.remove(&WizardField::Form);
            WizardStep::SelectingTime {
                slots: if draft.date == date {
                    draft.slots
                } else {
                    BTreeSet::new()
                },
                room: draft.room,
                date,
            }
        },
        other => other,
    };
}

fn toggle_slot(state: &mut WizardState, slot: TimeSlot) {
    let toggle = |slots: &mut BTreeSet<TimeSlot>| {
        if !slots.remove(&slot) {
            slots.insert(slot);
        }
    };

    state.step = match std::mem::take(&mut state.step) {
        WizardStep::SelectingTime {
            room,
            date,
            mut slots,
        } => {
            toggle(&mut slots);
            WizardStep::SelectingTime { room, date, slots }
        },
        WizardStep::Failed { mut draft, .. } => {
            state.errors.remove(&WizardField::Form);
            toggle(&mut draft.slots);
            draft.into_time_step()
        },
        other => {
            tracing::debug!(step = other.name(), "Slot toggle ignored outside the time step");
            other
        },
    };
    state.errors.remove(&WizardField::TimeSlots);
}

fn submit(state: &mut WizardState, credentials: Credentials, env: &WizardEnvironment) -> Effects {
    let draft = match std::mem::take(&mut state.step) {
        WizardStep::SelectingTime { room, date, slots } => ReservationDraft { room, date, slots },
        WizardStep::Failed { draft, .. } => draft,
        other => {
            tracing::debug!(step = other.name(), "Submit ignored");
            state.step = other;
            return SmallVec::new();
        },
    };

    if draft.slots.is_empty() {
        state.errors.insert(WizardField::TimeSlots, NO_SLOTS.to_string());
        state.step = draft.into_time_step();
        return SmallVec::new();
    }
    if draft.date < env.today() {
        state.errors.insert(WizardField::Date, PAST_DATE.to_string());
        state.step = draft.into_time_step();
        return SmallVec::new();
    }

    let requests = draft.requests(credentials.user_id, env.offset);
    tracing::info!(
        room = %draft.room.id,
        date = %draft.date,
        slots = requests.len(),
        "Submitting reservations"
    );

    state.errors.remove(&WizardField::Form);
    state.errors.remove(&WizardField::TimeSlots);
    state.errors.remove(&WizardField::Date);
    state.notice = None;
    state.step = WizardStep::Submitting { draft };

    let api = Arc::clone(&env.api);
    smallvec![Effect::future(async move {
        Some(match api.submit_reservations(requests, &credentials).await {
            Ok(response) => WizardAction::ReservationsCreated(response),
            Err(error) => WizardAction::SubmissionFailed(error),
        })
    })]
}

fn reservations_created(state: &mut WizardState, response: ReserveResponse) {
    state.step = match std::mem::take(&mut state.step) {
        WizardStep::Submitting { draft } => {
            tracing::info!(
                created = response.created_reservations.len(),
                "Reservations confirmed"
            );
            state.errors.retain(|field, _| *field == WizardField::Catalog);
            WizardStep::Confirmed {
                receipt: Receipt {
                    room: draft.room.id,
                    room_name: draft.room.name,
                    date: draft.date,
                    slots: draft.slots.into_iter().collect(),
                    created: response.created_reservations,
                    message: response.message,
                },
            }
        },
        other => other,
    };
}

fn submission_failed(state: &mut WizardState, error: BookingError) {
    state.step = match std::mem::take(&mut state.step) {
        WizardStep::Submitting { draft } => {
            tracing::warn!(%error, "Reservation rejected");
            state
                .errors
                .insert(WizardField::Form, error.user_message(SUBMIT_FAILED));
            WizardStep::Failed { draft, error }
        },
        other => other,
    };
}

fn decline(state: &mut WizardState, credentials: Credentials, env: &WizardEnvironment) -> Effects {
    let receipt = match std::mem::take(&mut state.step) {
        WizardStep::Confirmed { receipt } => receipt,
        other => {
            state.step = other;
            return SmallVec::new();
        },
    };

    let ids = receipt.booking_ids();
    if ids.is_empty() {
        state.restart();
        state
            .errors
            .insert(WizardField::Cancel, NOTHING_TO_CANCEL.to_string());
        return SmallVec::new();
    }

    tracing::info!(count = ids.len(), "Cancelling declined batch");
    if state.sending_confirmation {
        tracing::debug!("Confirmation send abandoned by decline");
        state.sending_confirmation = false;
    }
    state.errors.remove(&WizardField::Cancel);
    state.step = WizardStep::CancellingBatch { receipt };

    let api = Arc::clone(&env.api);
    smallvec![Effect::future(async move {
        let results = join_all(ids.iter().map(|id| api.cancel_reservation(*id, &credentials))).await;

        let mut cancelled = Vec::new();
        let mut failed = Vec::new();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(_) => cancelled.push(id),
                Err(error) if error.is_not_found() => cancelled.push(id),
                Err(error) => failed.push((id, error)),
            }
        }
        Some(WizardAction::BatchCancelled { cancelled, failed })
    })]
}

fn batch_cancelled(
    state: &mut WizardState,
    cancelled: &[BookingId],
    failed: &[(BookingId, BookingError)],
) {
    state.step = match std::mem::take(&mut state.step) {
        WizardStep::CancellingBatch { mut receipt } => {
            if failed.is_empty() {
                tracing::info!(count = cancelled.len(), "Declined batch cancelled");
                state.restart();
                state.notice = Some("Reservation cancelled".to_string());
                return;
            }

            let still_booked: BTreeSet<BookingId> = failed.iter().map(|(id, _)| *id).collect();
            receipt.created.retain(|c| still_booked.contains(&c.id));

            let ids = still_booked
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(still_booked = %ids, "Declined batch only partially cancelled");
            state.errors.insert(
                WizardField::Cancel,
                format!("Could not cancel reservation(s) {ids}; they are still booked"),
            );
            WizardStep::Confirmed { receipt }
        },
        other => other,
    };
}
