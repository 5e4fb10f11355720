//! Error type for every backend, storage and validation failure

use crate::types::BookingId;
use thiserror::Error;

/// Errors surfaced by the accessor, the session store and the edit guard
///
/// Backend failures are normalized into this type at the accessor boundary.
/// Variants that come from an HTTP response keep the backend's message text
/// when it sent one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Request never reached the backend or no response came back
    #[error("Network error: {0}")]
    Network(String),

    /// Input rejected before it reached the network
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Backend refused the slot(s) as unavailable
    #[error("Conflict{}", detail(.message))]
    Conflict {
        /// Backend message
        message: Option<String>,
    },

    /// Target booking or resource does not exist
    #[error("Not found{}", detail(.message))]
    NotFound {
        /// Backend message
        message: Option<String>,
    },

    /// Edit hand-off holds a different booking than the one requested
    #[error("Wrong booking loaded: expected {expected}, found {found}")]
    Mismatch {
        /// Booking id of the edit route
        expected: BookingId,
        /// Booking id found in the hand-off
        found: BookingId,
    },

    /// Missing or rejected credentials
    #[error("Unauthorized{}", detail(.message))]
    Unauthorized {
        /// Backend message
        message: Option<String>,
    },

    /// Any other non-success status
    #[error("Server error (status {status}){}", detail(.message))]
    Server {
        /// HTTP status code
        status: u16,
        /// Backend message
        message: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("Response decoding failed: {0}")]
    Decode(String),

    /// Local key-value store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl BookingError {
    /// Not-found shorthand with a message
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: Some(message.into()),
        }
    }

    /// Message text sent by the backend, if any
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Conflict { message }
            | Self::NotFound { message }
            | Self::Unauthorized { message }
            | Self::Server { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    /// Text to show the user: backend message first, else `fallback`
    ///
    /// Client-side failures carry their own wording.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Mismatch { .. } => "Error loading correct booking data".to_string(),
            _ => self
                .backend_message()
                .map_or_else(|| fallback.to_string(), ToString::to_string),
        }
    }

    /// True for [`BookingError::NotFound`]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_text() {
        let error = BookingError::Conflict {
            message: Some("Reservation has not been reserved".into()),
        };
        assert_eq!(
            error.user_message("Failed to reserve"),
            "Reservation has not been reserved"
        );

        let silent = BookingError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(silent.user_message("Failed to reserve"), "Failed to reserve");
        assert_eq!(silent.to_string(), "Server error (status 500)");
    }

    #[test]
    fn display_includes_message() {
        assert_eq!(
            BookingError::not_found("Slot not found").to_string(),
            "Not found: Slot not found"
        );
        let mismatch = BookingError::Mismatch {
            expected: BookingId::new(7),
            found: BookingId::new(5),
        };
        assert_eq!(
            mismatch.to_string(),
            "Wrong booking loaded: expected 7, found 5"
        );
    }
}
