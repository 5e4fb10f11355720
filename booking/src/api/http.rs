//! REST accessor over reqwest

use super::{ApiFuture, ApiResult, AuthApi, BookingApi, BookingError};
use crate::config::Config;
use crate::types::{
    Ack, BookedSlot, BookingId, Credentials, LoginRequest, LoginResponse, ReservationRequest,
    ReserveResponse, Room, RoomsResponse, SignupRequest, SlotsResponse,
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend client
///
/// Cloning shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpBookingApi {
    client: Client,
    base_url: String,
}

impl HttpBookingApi {
    /// Client for `base_url` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Network`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Client from loaded configuration
    ///
    /// # Errors
    ///
    /// See [`HttpBookingApi::new`].
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(config.api.base_url.clone(), config.request_timeout())
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /rooms`
    ///
    /// # Errors
    ///
    /// Network, status or decoding failures.
    #[tracing::instrument(skip(self))]
    pub async fn rooms(&self) -> ApiResult<Vec<Room>> {
        let response = self
            .client
            .get(self.url("/rooms"))
            .send()
            .await
            .map_err(network)?;

        match response.status() {
            StatusCode::OK => {
                let body: RoomsResponse = decode_or_default(response).await?;
                tracing::debug!(count = body.rooms.len(), "Rooms fetched");
                Ok(body.rooms.into_iter().map(Room::from).collect())
            },
            StatusCode::NOT_FOUND => {
                tracing::debug!("Backend has no rooms");
                Ok(Vec::new())
            },
            _ => Err(error_from(response).await),
        }
    }

    /// `GET /slots/my?userName=`
    ///
    /// # Errors
    ///
    /// Network, status or decoding failures.
    #[tracing::instrument(skip(self, credentials), fields(user = %credentials.user_name))]
    pub async fn my_bookings(&self, credentials: &Credentials) -> ApiResult<Vec<BookedSlot>> {
        let response = self
            .client
            .get(self.url("/slots/my"))
            .bearer_auth(&credentials.token)
            .query(&[("userName", credentials.user_name.as_str())])
            .send()
            .await
            .map_err(network)?;

        match response.status() {
            StatusCode::OK => {
                let body: SlotsResponse = decode_or_default(response).await?;
                Ok(body.slots)
            },
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            _ => Err(error_from(response).await),
        }
    }

    /// `POST /slots/reserve?userName=`
    ///
    /// # Errors
    ///
    /// [`BookingError::Conflict`] on 400/409, otherwise network, status or
    /// decoding failures.
    #[tracing::instrument(skip(self, requests, credentials), fields(user = %credentials.user_name, slots = requests.len()))]
    pub async fn reserve(
        &self,
        requests: &[ReservationRequest],
        credentials: &Credentials,
    ) -> ApiResult<ReserveResponse> {
        let response = self
            .client
            .post(self.url("/slots/reserve"))
            .bearer_auth(&credentials.token)
            .query(&[("userName", credentials.user_name.as_str())])
            .json(requests)
            .send()
            .await
            .map_err(network)?;

        match response.status() {
            status if status.is_success() => decode_or_default(response).await,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                let body = response.text().await.unwrap_or_default();
                Err(BookingError::Conflict {
                    message: backend_message(&body),
                })
            },
            _ => Err(error_from(response).await),
        }
    }

    /// `POST /slots/cancel` with the raw id as body
    ///
    /// # Errors
    ///
    /// [`BookingError::NotFound`] on 404, otherwise network or status
    /// failures.
    #[tracing::instrument(skip(self, credentials), fields(user = %credentials.user_name))]
    pub async fn cancel(&self, id: BookingId, credentials: &Credentials) -> ApiResult<Ack> {
        let response = self
            .client
            .post(self.url("/slots/cancel"))
            .bearer_auth(&credentials.token)
            .json(&id.value())
            .send()
            .await
            .map_err(network)?;

        if response.status().is_success() {
            decode_or_default(response).await
        } else {
            Err(error_from(response).await)
        }
    }

    /// `POST /auth/login`
    ///
    /// # Errors
    ///
    /// [`BookingError::Unauthorized`] on rejected credentials.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, user_name: &str, password: &str) -> ApiResult<LoginResponse> {
        let request = LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&request)
            .send()
            .await
            .map_err(network)?;

        if response.status().is_success() {
            decode(response).await
        } else {
            Err(error_from(response).await)
        }
    }

    /// `POST /users`
    ///
    /// # Errors
    ///
    /// [`BookingError::Conflict`] when the user already exists.
    #[tracing::instrument(skip(self, request), fields(user = %request.user_name))]
    pub async fn register(&self, request: &SignupRequest) -> ApiResult<Ack> {
        let response = self
            .client
            .post(self.url("/users"))
            .json(request)
            .send()
            .await
            .map_err(network)?;

        if response.status().is_success() {
            decode_or_default(response).await
        } else {
            Err(error_from(response).await)
        }
    }
}

impl BookingApi for HttpBookingApi {
    fn fetch_rooms(&self) -> ApiFuture<Vec<Room>> {
        let api = self.clone();
        Box::pin(async move { api.rooms().await })
    }

    fn fetch_my_bookings(&self, credentials: &Credentials) -> ApiFuture<Vec<BookedSlot>> {
        let api = self.clone();
        let credentials = credentials.clone();
        Box::pin(async move { api.my_bookings(&credentials).await })
    }

    fn submit_reservations(
        &self,
        requests: Vec<ReservationRequest>,
        credentials: &Credentials,
    ) -> ApiFuture<ReserveResponse> {
        let api = self.clone();
        let credentials = credentials.clone();
        Box::pin(async move { api.reserve(&requests, &credentials).await })
    }

    fn cancel_reservation(&self, id: BookingId, credentials: &Credentials) -> ApiFuture<Ack> {
        let api = self.clone();
        let credentials = credentials.clone();
        Box::pin(async move { api.cancel(id, &credentials).await })
    }
}

impl AuthApi for HttpBookingApi {
    fn login(&self, user_name: &str, password: &str) -> ApiFuture<LoginResponse> {
        let api = self.clone();
        let user_name = user_name.to_string();
        let password = password.to_string();
        Box::pin(async move { api.authenticate(&user_name, &password).await })
    }

    fn signup(&self, request: SignupRequest) -> ApiFuture<Ack> {
        let api = self.clone();
        Box::pin(async move { api.register(&request).await })
    }
}

fn network(error: reqwest::Error) -> BookingError {
    if error.is_timeout() {
        BookingError::Network(format!("request timed out: {error}"))
    } else {
        BookingError::Network(error.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await.map_err(network)?;
    serde_json::from_slice(&bytes).map_err(|e| BookingError::Decode(e.to_string()))
}

/// Like [`decode`], but an empty body yields `T::default()`
async fn decode_or_default<T: DeserializeOwned + Default>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await.map_err(network)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| BookingError::Decode(e.to_string()))
}

async fn error_from(response: Response) -> BookingError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = backend_message(&body);
    tracing::debug!(status = status.as_u16(), ?message, "Backend returned an error");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BookingError::Unauthorized { message },
        StatusCode::NOT_FOUND => BookingError::NotFound { message },
        StatusCode::CONFLICT => BookingError::Conflict { message },
        _ => BookingError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

/// Message text from `{ message }`, `{ error }`, a JSON string or plain text
fn backend_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message.or(parsed.error);
    }
    if let Ok(text) = serde_json::from_str::<String>(body) {
        return Some(text);
    }
    Some(body.to_string())
}
