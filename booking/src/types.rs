//! Domain types for the room reservation client.
//!
//! Identifiers, rooms and the room catalog, the fixed hourly time slots,
//! reservation requests and booked slots as the backend returns them, plus
//! the session-level values (credentials, identity, language) passed
//! explicitly to every accessor call.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Backend identifier of a room
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(i64);

impl RoomId {
    /// Wrap a raw backend id
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw backend id
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend identifier of a booked slot (one hour of one room)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(i64);

impl BookingId {
    /// Wrap a raw backend id
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw backend id
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend identifier of a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw backend id
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw backend id
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Rooms
// ============================================================================

/// The two kinds of bookable room
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// Classroom addressed by building letter and number ("A3")
    #[default]
    Regular,
    /// Named lecture hall ("Amphi 1")
    Amphitheater,
}

/// A bookable room
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Room {
    /// Classroom addressed by letter and number
    Regular {
        /// Room id
        id: RoomId,
        /// Building letter
        letter: String,
        /// Room number within the building
        number: u32,
    },
    /// Named amphitheater
    Amphitheater {
        /// Room id
        id: RoomId,
        /// Display name
        name: String,
    },
}

impl Room {
    /// Room id
    #[must_use]
    pub const fn id(&self) -> RoomId {
        match self {
            Self::Regular { id, .. } | Self::Amphitheater { id, .. } => *id,
        }
    }

    /// Regular room or amphitheater
    #[must_use]
    pub const fn kind(&self) -> RoomKind {
        match self {
            Self::Regular { .. } => RoomKind::Regular,
            Self::Amphitheater { .. } => RoomKind::Amphitheater,
        }
    }

    /// Display key: letter followed by number, or the amphitheater name
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Regular { letter, number, .. } => format!("{letter}{number}"),
            Self::Amphitheater { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Room as it appears on the wire
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    /// Room id
    pub id: RoomId,
    /// Building letter
    #[serde(default)]
    pub room_letter: Option<String>,
    /// Room number (the backend sends an integer, older fixtures a string)
    #[serde(default, deserialize_with = "number_or_text")]
    pub room_number: Option<u32>,
    /// Display name, present on amphitheaters and newer payloads
    #[serde(default)]
    pub room_name: Option<String>,
}

impl From<RoomDto> for Room {
    fn from(dto: RoomDto) -> Self {
        let name = dto.room_name.filter(|n| !n.trim().is_empty());
        let is_amphi = name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains("amphi"));
        let letter = dto.room_letter.filter(|l| !l.trim().is_empty());

        match (is_amphi, letter, dto.room_number) {
            (false, Some(letter), Some(number)) => Self::Regular {
                id: dto.id,
                letter: letter.trim().to_uppercase(),
                number,
            },
            (_, letter, number) => Self::Amphitheater {
                id: dto.id,
                name: name.unwrap_or_else(|| {
                    format!(
                        "{}{}",
                        letter.unwrap_or_default(),
                        number.map(|n| n.to_string()).unwrap_or_default()
                    )
                }),
            },
        }
    }
}

/// `GET /rooms` response body
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoomsResponse {
    /// Rooms
    #[serde(default)]
    pub rooms: Vec<RoomDto>,
    /// Optional backend message
    #[serde(default)]
    pub message: Option<String>,
}

/// Room counts by kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoomCounts {
    /// All rooms
    pub total: usize,
    /// Letter + number rooms
    pub regular: usize,
    /// Amphitheaters
    pub amphitheater: usize,
}

/// The fetched room list with client-side lookups
///
/// All filtering happens here; the backend only ever returns the full list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    /// Catalog over the given rooms
    #[must_use]
    pub const fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    /// All rooms in fetch order
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Number of rooms
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// No rooms loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Room by id
    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id() == id)
    }

    /// Display name of a room, if it is in the catalog
    #[must_use]
    pub fn display_name(&self, id: RoomId) -> Option<String> {
        self.get(id).map(Room::display_name)
    }

    /// Building letters, unique and sorted
    #[must_use]
    pub fn letters(&self) -> Vec<String> {
        self.rooms
            .iter()
            .filter_map(|room| match room {
                Room::Regular { letter, .. } => Some(letter.clone()),
                Room::Amphitheater { .. } => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Room numbers available under a letter, unique and in numeric order
    #[must_use]
    pub fn numbers_for(&self, letter: &str) -> Vec<u32> {
        self.rooms
            .iter()
            .filter_map(|room| match room {
                Room::Regular {
                    letter: l, number, ..
                } if l.eq_ignore_ascii_case(letter) => Some(*number),
                _ => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Join a letter and number against the catalog
    #[must_use]
    pub fn resolve(&self, letter: &str, number: u32) -> Option<RoomId> {
        self.rooms.iter().find_map(|room| match room {
            Room::Regular {
                id,
                letter: l,
                number: n,
            } if l.eq_ignore_ascii_case(letter) && *n == number => Some(*id),
            _ => None,
        })
    }

    /// Amphitheaters in fetch order
    pub fn amphitheaters(&self) -> impl Iterator<Item = &Room> {
        self.rooms
            .iter()
            .filter(|room| room.kind() == RoomKind::Amphitheater)
    }

    /// Amphitheater by name (case-insensitive)
    #[must_use]
    pub fn amphitheater(&self, name: &str) -> Option<RoomId> {
        let wanted = name.trim().to_lowercase();
        self.rooms.iter().find_map(|room| match room {
            Room::Amphitheater { id, name } if name.to_lowercase() == wanted => Some(*id),
            _ => None,
        })
    }

    /// Room counts by kind
    #[must_use]
    pub fn counts(&self) -> RoomCounts {
        let amphitheater = self.amphitheaters().count();
        RoomCounts {
            total: self.rooms.len(),
            regular: self.rooms.len() - amphitheater,
            amphitheater,
        }
    }
}

// ============================================================================
// Time slots
// ============================================================================

/// First bookable hour
pub const OPENING_HOUR: u32 = 8;

/// Rooms close at this hour; the last slot ends here
pub const CLOSING_HOUR: u32 = 17;

/// One of the fixed hour-long slots, 08:00 to 16:00 start
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(u32);

/// Rejected time slot label
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Not a bookable time slot: {0}")]
pub struct ParseTimeSlotError(pub String);

impl TimeSlot {
    /// Slot starting at `hour`, if that hour is bookable
    #[must_use]
    pub const fn new(hour: u32) -> Option<Self> {
        if hour >= OPENING_HOUR && hour < CLOSING_HOUR {
            Some(Self(hour))
        } else {
            None
        }
    }

    /// Every slot of the day in order
    pub fn all() -> impl Iterator<Item = Self> {
        (OPENING_HOUR..CLOSING_HOUR).map(Self)
    }

    /// Start hour
    #[must_use]
    pub const fn start_hour(self) -> u32 {
        self.0
    }

    /// End hour
    #[must_use]
    pub const fn end_hour(self) -> u32 {
        self.0 + 1
    }

    /// "09:00"
    #[must_use]
    pub fn label(self) -> String {
        format!("{:02}:00", self.0)
    }

    /// "09:00 - 10:00"
    #[must_use]
    pub fn range_label(self) -> String {
        format!("{:02}:00 - {:02}:00", self.0, self.end_hour())
    }

    /// Start instant of this slot on `date`, in the given local offset
    #[must_use]
    pub fn start_on(self, date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
        let local = date.and_hms_opt(self.0, 0, 0)?;
        offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = ParseTimeSlotError;

    /// Accepts "09:00", "9:00" and ranges such as "09:00 - 10:00"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let start = s.split('-').next().unwrap_or_default().trim();
        let (hour, minute) = start
            .split_once(':')
            .ok_or_else(|| ParseTimeSlotError(s.to_string()))?;
        let hour: u32 = hour
            .trim()
            .parse()
            .map_err(|_| ParseTimeSlotError(s.to_string()))?;
        if minute.trim() != "00" {
            return Err(ParseTimeSlotError(s.to_string()));
        }
        Self::new(hour).ok_or_else(|| ParseTimeSlotError(s.to_string()))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ParseTimeSlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.label()
    }
}

/// Calendar day of an instant in the given local offset
#[must_use]
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

// ============================================================================
// Reservations and booked slots
// ============================================================================

/// One hour of one room requested for a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Slot start
    #[serde(with = "timestamp")]
    pub start_time: DateTime<Utc>,
    /// Room
    pub room_id: RoomId,
    /// User the slot is reserved for
    pub user_id: UserId,
}

/// Reservation created by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReservation {
    /// Assigned booking id
    pub id: BookingId,
    /// Room
    pub room_id: RoomId,
    /// Slot start
    #[serde(with = "timestamp")]
    pub start_time: DateTime<Utc>,
}

/// `POST /slots/reserve` response body
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveResponse {
    /// Reservations created for this batch (absent on some backends)
    #[serde(default)]
    pub created_reservations: Vec<CreatedReservation>,
    /// Backend message
    #[serde(default)]
    pub message: Option<String>,
}

/// Plain acknowledgement `{ message }`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Backend message
    #[serde(default)]
    pub message: Option<String>,
}

/// Room summary embedded in a booked slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRoom {
    /// Room id
    pub id: RoomId,
    /// Building letter
    #[serde(default)]
    pub room_letter: Option<String>,
    /// Room number
    #[serde(default, deserialize_with = "number_or_text")]
    pub room_number: Option<u32>,
    /// Display name
    #[serde(default)]
    pub room_name: Option<String>,
    /// Seats
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl SlotRoom {
    /// Room name, else letter and number, else the id
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.room_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        match (&self.room_letter, self.room_number) {
            (Some(letter), Some(number)) => format!("{letter}{number}"),
            _ => format!("Room {}", self.id),
        }
    }
}

/// Owner of a booked slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOwner {
    /// User id
    pub id: UserId,
    /// Login name
    pub user_name: String,
    /// Contact address
    #[serde(default)]
    pub email: Option<String>,
}

/// A server-confirmed booking
///
/// `reserved == false` marks a cancelled booking that stays visible in the
/// history; cancellation never changes `id`, `start_time` or `end_time`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    /// Booking id
    pub id: BookingId,
    /// Start
    #[serde(with = "timestamp")]
    pub start_time: DateTime<Utc>,
    /// End
    #[serde(with = "timestamp")]
    pub end_time: DateTime<Utc>,
    /// Length in hours
    #[serde(default = "one_hour")]
    pub duration: u32,
    /// Still reserved (false once cancelled)
    #[serde(default, deserialize_with = "null_as_false")]
    pub reserved: bool,
    /// Room
    pub room: SlotRoom,
    /// Owner
    pub owner: SlotOwner,
}

impl BookedSlot {
    /// Room display name
    #[must_use]
    pub fn room_name(&self) -> String {
        self.room.display_name()
    }

    /// Cancelled bookings stay listed with `reserved == false`
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        !self.reserved
    }

    /// Case-insensitive substring match on room name or owner name
    ///
    /// `term` must already be lower-cased; an empty term matches everything.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        term.is_empty()
            || self.room_name().to_lowercase().contains(term)
            || self.owner.user_name.to_lowercase().contains(term)
    }
}

/// `GET /slots/my` response body
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SlotsResponse {
    /// Booked slots
    #[serde(default)]
    pub slots: Vec<BookedSlot>,
}

/// Booking handed from the list to the standalone edit form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditRequest {
    /// The booking to edit
    pub booking: BookedSlot,
}

impl EditRequest {
    /// Request editing `booking`
    #[must_use]
    pub const fn new(booking: BookedSlot) -> Self {
        Self { booking }
    }

    /// Id of the booking being edited
    #[must_use]
    pub const fn booking_id(&self) -> BookingId {
        self.booking.id
    }
}

/// Fetch state of a remote list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Never requested
    #[default]
    Idle,
    /// Request in flight
    Loading,
    /// Last request succeeded
    Loaded,
    /// Last request failed
    Failed,
}

// ============================================================================
// Session values
// ============================================================================

/// Credentials attached to each authenticated accessor call
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User id (sent in reservation requests)
    pub user_id: UserId,
    /// Login name (sent as the `userName` query parameter)
    pub user_name: String,
    /// Bearer token
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Logged-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User id
    pub id: UserId,
    /// Login name
    pub user_name: String,
    /// Contact address
    pub email: String,
}

/// `POST /auth/login` request body
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name
    pub user_name: String,
    /// Password
    pub password: String,
}

/// `POST /auth/login` response body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Backend message
    #[serde(default)]
    pub message: Option<String>,
    /// User id
    pub user_id: UserId,
    /// Contact address
    pub email: String,
    /// Login name
    pub user_name: String,
    /// Bearer token
    pub token: String,
}

/// `POST /users` request body
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Login name
    pub user_name: String,
    /// Contact address
    pub email: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Interface language of the notification surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// French
    Fr,
}

impl Language {
    /// Two-letter code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }
}

/// Language code other than `en` or `fr`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported language: {0} (expected en or fr)")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            other => Err(ParseLanguageError(other.to_string())),
        }
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

const fn one_hour() -> u32 {
    1
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Backend timestamps
///
/// Written as RFC 3339 with millisecond precision. Read from RFC 3339,
/// offset-less ISO 8601 (taken as UTC) or epoch milliseconds.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as RFC 3339
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Deserialize from any accepted representation
    ///
    /// # Errors
    ///
    /// Fails on unparseable text or out-of-range epoch values.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Millis(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {ms}"))),
            Raw::Text(text) => parse(&text).map_err(serde::de::Error::custom),
        }
    }

    /// Parse a textual timestamp
    ///
    /// # Errors
    ///
    /// Returns a description of the rejected input.
    pub fn parse(text: &str) -> Result<DateTime<Utc>, String> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(naive.and_utc());
            }
        }
        Err(format!("unrecognised timestamp: {text}"))
    }
}
