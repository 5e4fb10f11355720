//! In-memory backend for tests and offline runs
//!
//! Behaves like the REST backend closely enough for the reducers: rooms are
//! fixed, reservations are checked against existing reserved slots, and
//! cancelling flips `reserved`. Failures can be injected per operation.

use super::{ApiFuture, ApiResult, AuthApi, BookingApi, BookingError};
use crate::types::{
    Ack, BookedSlot, BookingId, Credentials, CreatedReservation, Identity, LoginResponse,
    ReservationRequest, ReserveResponse, Room, SignupRequest, SlotOwner, SlotRoom, UserId,
};
use chrono::Duration;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MockState {
    rooms: Vec<Room>,
    bookings: Vec<BookedSlot>,
    users: Vec<(Identity, String)>,
    next_booking_id: i64,
    rooms_failures: VecDeque<BookingError>,
    bookings_failures: VecDeque<BookingError>,
    submit_failures: VecDeque<BookingError>,
    cancel_failures: HashMap<BookingId, BookingError>,
    submitted: Vec<Vec<ReservationRequest>>,
    cancel_calls: Vec<BookingId>,
}

/// Shared in-memory backend
///
/// Clones share the same data, so a test can keep one clone for
/// inspection while the reducer environment owns another.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBookingApi {
    state: Arc<Mutex<MockState>>,
}

impl InMemoryBookingApi {
    /// Empty backend; booking ids start at 100
    #[must_use]
    pub fn new() -> Self {
        let api = Self::default();
        api.lock().next_booking_id = 100;
        api
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the room catalog
    #[must_use]
    pub fn with_rooms(self, rooms: Vec<Room>) -> Self {
        self.lock().rooms = rooms;
        self
    }

    /// Seed existing bookings
    #[must_use]
    pub fn with_bookings(self, bookings: Vec<BookedSlot>) -> Self {
        self.lock().bookings = bookings;
        self
    }

    /// Register a user that can log in
    #[must_use]
    pub fn with_user(self, identity: Identity, password: impl Into<String>) -> Self {
        self.lock().users.push((identity, password.into()));
        self
    }

    /// Fail the next `fetch_rooms` call
    pub fn fail_next_rooms(&self, error: BookingError) {
        self.lock().rooms_failures.push_back(error);
    }

    /// Fail the next `fetch_my_bookings` call
    pub fn fail_next_bookings(&self, error: BookingError) {
        self.lock().bookings_failures.push_back(error);
    }

    /// Fail the next `submit_reservations` call
    pub fn fail_next_submit(&self, error: BookingError) {
        self.lock().submit_failures.push_back(error);
    }

    /// Fail every cancellation of `id` until cleared
    pub fn fail_cancel(&self, id: BookingId, error: BookingError) {
        self.lock().cancel_failures.insert(id, error);
    }

    /// Stop failing cancellations of `id`
    pub fn clear_cancel_failure(&self, id: BookingId) {
        self.lock().cancel_failures.remove(&id);
    }

    /// Every batch received by `submit_reservations`, in order
    #[must_use]
    pub fn submitted(&self) -> Vec<Vec<ReservationRequest>> {
        self.lock().submitted.clone()
    }

    /// Every id passed to `cancel_reservation`, in order
    #[must_use]
    pub fn cancel_calls(&self) -> Vec<BookingId> {
        self.lock().cancel_calls.clone()
    }

    /// Current bookings
    #[must_use]
    pub fn bookings(&self) -> Vec<BookedSlot> {
        self.lock().bookings.clone()
    }

    fn reserve(&self, requests: &[ReservationRequest], credentials: &Credentials) -> ApiResult<ReserveResponse> {
        let mut state = self.lock();
        state.submitted.push(requests.to_vec());

        if let Some(error) = state.submit_failures.pop_front() {
            return Err(error);
        }

        // All-or-nothing: validate the whole batch before creating anything.
        for request in requests {
            if !state.rooms.iter().any(|room| room.id() == request.room_id) {
                return Err(BookingError::Conflict {
                    message: Some(format!("Room {} does not exist", request.room_id)),
                });
            }
            let taken = state.bookings.iter().any(|b| {
                b.reserved && b.room.id == request.room_id && b.start_time == request.start_time
            });
            if taken {
                return Err(BookingError::Conflict {
                    message: Some("Reservation has not been reserved".to_string()),
                });
            }
        }

        let email = state
            .users
            .iter()
            .find(|(identity, _)| identity.id == credentials.user_id)
            .map(|(identity, _)| identity.email.clone());

        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            let id = BookingId::new(state.next_booking_id);
            state.next_booking_id += 1;

            let room = state
                .rooms
                .iter()
                .find(|room| room.id() == request.room_id)
                .map(slot_room);

            if let Some(room) = room {
                state.bookings.push(BookedSlot {
                    id,
                    start_time: request.start_time,
                    end_time: request.start_time + Duration::hours(1),
                    duration: 1,
                    reserved: true,
                    room,
                    owner: SlotOwner {
                        id: request.user_id,
                        user_name: credentials.user_name.clone(),
                        email: email.clone(),
                    },
                });
            }
            created.push(CreatedReservation {
                id,
                room_id: request.room_id,
                start_time: request.start_time,
            });
        }

        Ok(ReserveResponse {
            created_reservations: created,
            message: Some("Reservation has been reserved".to_string()),
        })
    }

    fn cancel(&self, id: BookingId) -> ApiResult<Ack> {
        let mut state = self.lock();
        state.cancel_calls.push(id);

        if let Some(error) = state.cancel_failures.get(&id) {
            return Err(error.clone());
        }

        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BookingError::not_found("Slot not found"))?;
        booking.reserved = false;

        Ok(Ack {
            message: Some("slots freed successfully".to_string()),
        })
    }
}

fn slot_room(room: &Room) -> SlotRoom {
    match room {
        Room::Regular { id, letter, number } => SlotRoom {
            id: *id,
            room_letter: Some(letter.clone()),
            room_number: Some(*number),
            room_name: Some(room.display_name()),
            capacity: Some(70),
        },
        Room::Amphitheater { id, name } => SlotRoom {
            id: *id,
            room_letter: None,
            room_number: None,
            room_name: Some(name.clone()),
            capacity: None,
        },
    }
}

impl BookingApi for InMemoryBookingApi {
    fn fetch_rooms(&self) -> ApiFuture<Vec<Room>> {
        let result = {
            let mut state = self.lock();
            state
                .rooms_failures
                .pop_front()
                .map_or_else(|| Ok(state.rooms.clone()), Err)
        };
        Box::pin(async move { result })
    }

    fn fetch_my_bookings(&self, credentials: &Credentials) -> ApiFuture<Vec<BookedSlot>> {
        let result = {
            let mut state = self.lock();
            match state.bookings_failures.pop_front() {
                Some(error) => Err(error),
                None => Ok(state
                    .bookings
                    .iter()
                    .filter(|b| b.owner.id == credentials.user_id)
                    .cloned()
                    .collect()),
            }
        };
        Box::pin(async move { result })
    }

    fn submit_reservations(
        &self,
        requests: Vec<ReservationRequest>,
        credentials: &Credentials,
    ) -> ApiFuture<ReserveResponse> {
        let result = self.reserve(&requests, credentials);
        Box::pin(async move { result })
    }

    fn cancel_reservation(&self, id: BookingId, _credentials: &Credentials) -> ApiFuture<Ack> {
        let result = self.cancel(id);
        Box::pin(async move { result })
    }
}

impl AuthApi for InMemoryBookingApi {
    fn login(&self, user_name: &str, password: &str) -> ApiFuture<LoginResponse> {
        let result = self
            .lock()
            .users
            .iter()
            .find(|(identity, secret)| identity.user_name == user_name && secret == password)
            .map(|(identity, _)| LoginResponse {
                message: Some("Logged in successfully".to_string()),
                user_id: identity.id,
                email: identity.email.clone(),
                user_name: identity.user_name.clone(),
                token: format!("token-{}", identity.id),
            })
            .ok_or_else(|| BookingError::Unauthorized {
                message: Some("Failed to log in".to_string()),
            });
        Box::pin(async move { result })
    }

    fn signup(&self, request: SignupRequest) -> ApiFuture<Ack> {
        let result = {
            let mut state = self.lock();
            if state
                .users
                .iter()
                .any(|(identity, _)| identity.user_name == request.user_name)
            {
                Err(BookingError::Conflict {
                    message: Some("User already exists".to_string()),
                })
            } else {
                let next = state
                    .users
                    .iter()
                    .map(|(identity, _)| identity.id.value())
                    .max()
                    .unwrap_or(0)
                    + 1;
                state.users.push((
                    Identity {
                        id: UserId::new(next),
                        user_name: request.user_name,
                        email: request.email,
                    },
                    request.password,
                ));
                Ok(Ack {
                    message: Some("User signed successfully".to_string()),
                })
            }
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RoomId;
    use chrono::{TimeZone, Utc};

    fn credentials() -> Credentials {
        Credentials {
            user_id: UserId::new(42),
            user_name: "alice".into(),
            token: "token-42".into(),
        }
    }

    fn api() -> InMemoryBookingApi {
        InMemoryBookingApi::new().with_rooms(vec![Room::Regular {
            id: RoomId::new(1),
            letter: "A".into(),
            number: 3,
        }])
    }

    fn request(hour: u32) -> ReservationRequest {
        ReservationRequest {
            start_time: Utc.with_ymd_and_hms(2025, 1, 16, hour, 0, 0).unwrap(),
            room_id: RoomId::new(1),
            user_id: UserId::new(42),
        }
    }

    #[tokio::test]
    async fn batch_is_rejected_as_a_whole() {
        let api = api();
        api.submit_reservations(vec![request(9)], &credentials())
            .await
            .unwrap();

        let result = api
            .submit_reservations(vec![request(10), request(9)], &credentials())
            .await;
        assert!(matches!(result, Err(BookingError::Conflict { .. })));
        assert_eq!(api.bookings().len(), 1);
    }

    #[tokio::test]
    async fn cancel_flips_reserved_and_unknown_id_is_not_found() {
        let api = api();
        let created = api
            .submit_reservations(vec![request(9)], &credentials())
            .await
            .unwrap();
        let id = created.created_reservations[0].id;

        api.cancel_reservation(id, &credentials()).await.unwrap();
        assert!(!api.bookings()[0].reserved);

        let missing = api
            .cancel_reservation(BookingId::new(999), &credentials())
            .await;
        assert!(missing.unwrap_err().is_not_found());
        assert_eq!(api.cancel_calls(), vec![id, BookingId::new(999)]);
    }

    #[test]
    fn injected_room_failure_is_consumed_once() {
        let api = api();
        api.fail_next_rooms(BookingError::Network("offline".into()));

        tokio_test::assert_err!(tokio_test::block_on(api.fetch_rooms()));
        let rooms = tokio_test::assert_ok!(tokio_test::block_on(api.fetch_rooms()));
        assert_eq!(rooms.len(), 1);
    }

    #[tokio::test]
    async fn signup_then_login() {
        let api = api();
        api.signup(SignupRequest {
            user_name: "bob".into(),
            email: "bob@example.com".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();

        let duplicate = api
            .signup(SignupRequest {
                user_name: "bob".into(),
                email: "other@example.com".into(),
                password: "pw".into(),
            })
            .await;
        assert!(matches!(duplicate, Err(BookingError::Conflict { .. })));

        let login = api.login("bob", "pw").await.unwrap();
        assert_eq!(login.user_name, "bob");
        assert!(api.login("bob", "wrong").await.is_err());
    }
}
