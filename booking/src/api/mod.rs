//! Backend accessors
//!
//! Reducers reach the REST backend only through these traits, held in their
//! environment as `Arc<dyn ...>`. [`HttpBookingApi`] talks to the real
//! backend; [`InMemoryBookingApi`] backs tests and offline runs.

pub mod error;
pub mod http;
pub mod mock;

pub use error::BookingError;
pub use http::HttpBookingApi;
pub use mock::InMemoryBookingApi;

use crate::types::{
    Ack, BookedSlot, BookingId, Credentials, LoginResponse, ReservationRequest, ReserveResponse,
    Room, SignupRequest,
};
use std::future::Future;
use std::pin::Pin;

/// Accessor result
pub type ApiResult<T> = Result<T, BookingError>;

/// Boxed accessor future, owned so it can move into an effect
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send>>;

/// Rooms and booked slots
///
/// Authenticated calls take the credentials explicitly; implementations keep
/// no ambient auth state.
pub trait BookingApi: Send + Sync {
    /// Full room catalog (an empty backend catalog is `Ok(vec![])`)
    ///
    /// # Errors
    ///
    /// [`BookingError::Network`], [`BookingError::Server`] or
    /// [`BookingError::Decode`].
    fn fetch_rooms(&self) -> ApiFuture<Vec<Room>>;

    /// Every slot owned by the user, cancelled ones included
    ///
    /// # Errors
    ///
    /// Network, authorization or decoding failures.
    fn fetch_my_bookings(&self, credentials: &Credentials) -> ApiFuture<Vec<BookedSlot>>;

    /// Reserve one slot per request as a single batch
    ///
    /// Never compensates: if the backend fails part-way, entries it already
    /// created stay created.
    ///
    /// # Errors
    ///
    /// [`BookingError::Conflict`] when the backend refuses the batch.
    fn submit_reservations(
        &self,
        requests: Vec<ReservationRequest>,
        credentials: &Credentials,
    ) -> ApiFuture<ReserveResponse>;

    /// Cancel one booked slot
    ///
    /// # Errors
    ///
    /// [`BookingError::NotFound`] when the backend does not know the id.
    fn cancel_reservation(&self, id: BookingId, credentials: &Credentials) -> ApiFuture<Ack>;
}

/// Login and account creation
pub trait AuthApi: Send + Sync {
    /// Exchange a user name and password for a token
    ///
    /// # Errors
    ///
    /// [`BookingError::Unauthorized`] on bad credentials.
    fn login(&self, user_name: &str, password: &str) -> ApiFuture<LoginResponse>;

    /// Create an account
    ///
    /// # Errors
    ///
    /// [`BookingError::Conflict`] when the user name is taken.
    fn signup(&self, request: SignupRequest) -> ApiFuture<Ack>;
}
