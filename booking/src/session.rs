//! Explicit user session
//!
//! The session is a value owned by the shell and passed where needed; the
//! accessor never holds auth state. [`SessionManager`] restores it from the
//! key-value store at start-up and persists login, logout and language.

use crate::api::{AuthApi, BookingError};
use crate::storage::{KeyValueStore, keys};
use crate::types::{Ack, Credentials, Identity, Language, SignupRequest};
use std::fmt;
use std::sync::Arc;

/// Logged-in user, token and interface language
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Who is logged in
    pub identity: Identity,
    token: String,
    /// Interface language
    pub language: Language,
}

impl Session {
    /// Session for an identity and bearer token
    #[must_use]
    pub const fn new(identity: Identity, token: String, language: Language) -> Self {
        Self {
            identity,
            token,
            language,
        }
    }

    /// Credentials for accessor calls
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            user_id: self.identity.id,
            user_name: self.identity.user_name.clone(),
            token: self.token.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("token", &"<redacted>")
            .field("language", &self.language)
            .finish()
    }
}

/// Restores, creates and tears down sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
}

impl SessionManager {
    /// Manager over a key-value store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored language preference, English when unset or unknown
    #[must_use]
    pub fn language(&self) -> Language {
        self.store
            .get(keys::LANGUAGE)
            .ok()
            .flatten()
            .and_then(|code| code.parse().ok())
            .unwrap_or_default()
    }

    /// Session persisted by a previous run
    ///
    /// Returns `Ok(None)` when nobody is logged in. An unreadable stored
    /// identity is discarded together with its token.
    ///
    /// # Errors
    ///
    /// Storage failures.
    pub fn restore(&self) -> Result<Option<Session>, BookingError> {
        let user = self.store.get(keys::USER)?;
        let token = self.store.get(keys::AUTH_TOKEN)?;

        let (Some(user), Some(token)) = (user, token) else {
            return Ok(None);
        };

        match serde_json::from_str::<Identity>(&user) {
            Ok(identity) => {
                tracing::info!(user = %identity.user_name, "Session restored");
                Ok(Some(Session::new(identity, token, self.language())))
            },
            Err(error) => {
                tracing::warn!(%error, "Discarding unreadable stored session");
                self.clear()?;
                Ok(None)
            },
        }
    }

    /// Log in and persist the new session
    ///
    /// # Errors
    ///
    /// Accessor failures ([`BookingError::Unauthorized`] on bad credentials)
    /// or storage failures.
    pub async fn login(
        &self,
        api: &dyn AuthApi,
        user_name: &str,
        password: &str,
    ) -> Result<Session, BookingError> {
        let response = api.login(user_name, password).await?;
        let identity = Identity {
            id: response.user_id,
            user_name: response.user_name,
            email: response.email,
        };

        let json =
            serde_json::to_string(&identity).map_err(|e| BookingError::Storage(e.to_string()))?;
        self.store.set(keys::USER, &json)?;
        self.store.set(keys::AUTH_TOKEN, &response.token)?;

        tracing::info!(user = %identity.user_name, "Logged in");
        Ok(Session::new(identity, response.token, self.language()))
    }

    /// Create an account; does not log in
    ///
    /// # Errors
    ///
    /// Accessor failures ([`BookingError::Conflict`] for a taken name).
    pub async fn signup(&self, api: &dyn AuthApi, request: SignupRequest) -> Result<Ack, BookingError> {
        api.signup(request).await
    }

    /// Forget the persisted session
    ///
    /// # Errors
    ///
    /// Storage failures.
    pub fn logout(&self) -> Result<(), BookingError> {
        self.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Change and persist the interface language
    ///
    /// # Errors
    ///
    /// Storage failures.
    pub fn set_language(&self, session: &mut Session, language: Language) -> Result<(), BookingError> {
        self.store.set(keys::LANGUAGE, language.code())?;
        session.language = language;
        Ok(())
    }

    fn clear(&self) -> Result<(), BookingError> {
        self.store.remove(keys::USER)?;
        self.store.remove(keys::AUTH_TOKEN)
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}
