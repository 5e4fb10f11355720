//! # Roombook
//!
//! Room reservation client built on the roombook reducer runtime.
//!
//! - [`wizard`]: room → date → time → submit, with batch cancel on decline
//! - [`bookings`]: the user's bookings with filter, search, cancel and edit
//! - [`edit`]: standalone edit form fed by an explicit hand-off
//! - [`notification`]: confirmation e-mail preview (English / French)
//! - [`dashboard`]: upcoming bookings and room counts
//! - [`api`]: backend accessor trait, REST client and in-memory backend
//! - [`session`] and [`storage`]: explicit session, persisted key-value state
//!
//! ## Example
//!
//! ```ignore
//! let env = WizardEnvironment::new(api, Arc::new(SystemClock), config.utc_offset());
//! let store = Store::new(WizardState::new(), WizardReducer::new(), env);
//!
//! store.send(WizardAction::LoadRooms).await?.wait().await;
//! store.send(WizardAction::ChooseLetter("A".into())).await?;
//! store.send(WizardAction::ChooseNumber(3)).await?;
//! store.send(WizardAction::Next).await?;
//! ```

pub mod api;
pub mod bookings;
pub mod config;
pub mod dashboard;
pub mod edit;
pub mod notification;
pub mod session;
pub mod storage;
pub mod types;
pub mod wizard;

pub use api::{AuthApi, BookingApi, BookingError, HttpBookingApi, InMemoryBookingApi};
pub use config::{Config, ConfigError};
pub use session::{Session, SessionManager};
