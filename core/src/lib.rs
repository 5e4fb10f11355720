//! # Roombook Core
//!
//! The functional core shared by every roombook feature.
//!
//! A feature is described by four things:
//!
//! - **State**: what the screen or workflow currently holds (a wizard step,
//!   the loaded booking list)
//! - **Action**: everything that can happen to it (user intents and results
//!   coming back from the backend)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`, the only
//!   place state changes
//! - **Effect**: a description of I/O to run later (call the backend, wait,
//!   fan out cancellations); the runtime executes it and feeds the resulting
//!   action back into the reducer
//!
//! Dependencies such as the clock or the backend accessor arrive through the
//! reducer's `Environment`, so every reducer can be driven in tests with
//! fixed time and an in-memory backend.
//!
//! ## Example
//!
//! ```ignore
//! impl Reducer for WizardReducer {
//!     type State = WizardState;
//!     type Action = WizardAction;
//!     type Environment = WizardEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut WizardState,
//!         action: WizardAction,
//!         env: &WizardEnvironment,
//!     ) -> SmallVec<[Effect<WizardAction>; 4]> {
//!         match action {
//!             WizardAction::ToggleSlot(slot) => {
//!                 state.toggle(slot);
//!                 SmallVec::new()
//!             }
//!             _ => SmallVec::new(),
//!         }
//!     }
//! }
//! ```

pub use smallvec::{SmallVec, smallvec};

/// Reducer module - where every state transition happens
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// Pure state transition function for one feature
    ///
    /// Implementations validate the action, mutate `state` in place and
    /// return descriptions of the I/O that should follow. They never perform
    /// I/O themselves and never panic.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime (usually zero or one)
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - descriptions of side effects
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Boxed future an effect resolves; `Some(action)` is fed back to the store
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Side effect description returned by reducers
    ///
    /// Effects are values: the reducer returns them and the runtime decides
    /// when and where they execute.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another, each waiting for the previous one
        Sequential(Vec<Effect<Action>>),

        /// Dispatch an action after a delay (simulated sends, notices)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation, typically a backend call
        ///
        /// Resolves to `Option<Action>`; `Some` is fed back into the reducer.
        Future(EffectFuture<Action>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an effect
        ///
        /// ```ignore
        /// Effect::future(async move {
        ///     let rooms = api.fetch_rooms().await;
        ///     Some(WizardAction::RoomsFetched(rooms))
        /// })
        /// ```
        #[must_use]
        pub fn future<F>(fut: F) -> Self
        where
            F: std::future::Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// True for `Effect::None`
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - injected dependencies
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of the current time
    ///
    /// "Today" in the wizard and "upcoming" on the dashboard both derive from
    /// this, so tests pin it with a fixed clock.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn effect_debug_hides_future() {
        let effect: Effect<u8> = Effect::future(async { Some(1) });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn merge_and_chain_wrap_children() {
        let merged: Effect<u8> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(merged, Effect::Parallel(ref v) if v.len() == 2));

        let chained: Effect<u8> = Effect::chain(vec![Effect::None]);
        assert!(matches!(chained, Effect::Sequential(ref v) if v.len() == 1));
        assert!(Effect::<u8>::None.is_none());
    }

    #[tokio::test]
    async fn future_effect_resolves_to_action() {
        let effect: Effect<&'static str> = Effect::future(async { Some("done") });
        let Effect::Future(fut) = effect else {
            unreachable!("constructed as a future");
        };
        assert_eq!(fut.await, Some("done"));
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
