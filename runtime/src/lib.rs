//! # Roombook Runtime
//!
//! The [`Store`] owns a feature's state, runs its reducer and executes the
//! effects the reducer returns, feeding resulting actions back in.
//!
//! ```ignore
//! use roombook_runtime::Store;
//!
//! let store = Store::new(WizardState::default(), WizardReducer::new(), env);
//!
//! let mut handle = store.send(WizardAction::LoadRooms).await?;
//! handle.wait().await;
//!
//! let rooms = store.state(|s| s.catalog().len()).await;
//! ```

use futures::future::join_all;
use roombook_core::{effect::Effect, reducer::Reducer};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// No matching action arrived before the deadline
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for awaiting the effects started by one `send`
///
/// Completes once every effect spawned for the action has finished and any
/// action it produced has been reduced.
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };
        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the effects are still running when
    /// the timeout expires.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Completion counter shared between a handle and its running effects
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Decrements both the per-handle and the store-wide counters on drop,
/// including when the effect task panics.
struct EffectGuard {
    tracking: EffectTracking,
    pending: Arc<AtomicUsize>,
}

impl Drop for EffectGuard {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        self.tracking.decrement();
    }
}

type BoxedRun = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Inner<S, A, E, R> {
    state: RwLock<S>,
    reducer: R,
    environment: E,
    shutdown: AtomicBool,
    pending_effects: Arc<AtomicUsize>,
    action_broadcast: broadcast::Sender<A>,
}

/// The Store - runtime coordinator for a reducer
///
/// Cloning is cheap; clones share state, reducer and environment.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    inner: Arc<Inner<S, A, E, R>>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + std::fmt::Debug + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new Store with custom action broadcast capacity
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                shutdown: AtomicBool::new(false),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }),
        }
    }

    /// Send an action to the store
    ///
    /// The reducer runs under the state write lock; effects are spawned onto
    /// the tokio runtime and `send` returns before they finish.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        tracing::debug!(?action, "Processing action");
        metrics::counter!("store.actions.total").increment(1);

        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.inner.state.write().await;

            let start = std::time::Instant::now();
            let effects =
                self.inner
                    .reducer
                    .reduce(&mut state, action, &self.inner.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            effects
        };

        for effect in effects {
            self.spawn_effect(effect, tracking.clone());
        }

        Ok(handle)
    }

    /// Send an action and wait for a matching action produced by its effects
    ///
    /// Subscribes before sending so the result cannot be missed.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action before `timeout`
    /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut rx = self.inner.action_broadcast.subscribe();

        self.send(action).await?;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to every action produced by effects
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.inner.action_broadcast.subscribe()
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let visible = store.state(|s| s.visible().len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.inner.state.read().await;
        f(&state)
    }

    /// Stop accepting actions and wait for running effects to finish
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
    /// when `timeout` expires.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        self.inner.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(20);

        loop {
            let pending = self.inner.pending_effects.load(Ordering::Acquire);
            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                return Ok(());
            }
            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "Shutdown timeout");
                return Err(StoreError::ShutdownTimeout(pending));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    fn spawn_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        if effect.is_none() {
            metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            return;
        }

        tracking.increment();
        self.inner.pending_effects.fetch_add(1, Ordering::SeqCst);
        let guard = EffectGuard {
            tracking,
            pending: Arc::clone(&self.inner.pending_effects),
        };

        let store = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            store.run_effect(effect).await;
        });
    }

    fn run_effect(&self, effect: Effect<A>) -> BoxedRun {
        let store = self.clone();
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    if let Some(action) = fut.await {
                        store.feedback(action).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tokio::time::sleep(duration).await;
                    store.feedback(*action).await;
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    join_all(effects.into_iter().map(|e| store.run_effect(e))).await;
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    for effect in effects {
                        store.run_effect(effect).await;
                    }
                },
            }
        })
    }

    /// Reduce an effect's action, then publish it to observers
    ///
    /// Observers woken by the broadcast always see the reduced state.
    async fn feedback(&self, action: A) {
        let observed = action.clone();
        if let Err(error) = self.send(action).await {
            tracing::warn!(%error, "Dropped action produced by effect");
            return;
        }
        let _ = self.inner.action_broadcast.send(observed);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use roombook_core::{SmallVec, smallvec};

    #[derive(Debug, Default)]
    struct CounterState {
        count: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum CounterAction {
        Increment,
        IncrementLater,
        IncrementTwiceInParallel,
        IncrementInSequence,
        Done,
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut CounterState,
            action: CounterAction,
            _env: &(),
        ) -> SmallVec<[Effect<CounterAction>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    SmallVec::new()
                },
                CounterAction::IncrementLater => {
                    smallvec![Effect::future(async { Some(CounterAction::Increment) })]
                },
                CounterAction::IncrementTwiceInParallel => smallvec![Effect::merge(vec![
                    Effect::future(async { Some(CounterAction::Increment) }),
                    Effect::future(async { Some(CounterAction::Increment) }),
                ])],
                CounterAction::IncrementInSequence => smallvec![Effect::chain(vec![
                    Effect::Delay {
                        duration: Duration::from_millis(5),
                        action: Box::new(CounterAction::Increment),
                    },
                    Effect::future(async { Some(CounterAction::Done) }),
                ])],
                CounterAction::Done => {
                    state.count *= 10;
                    SmallVec::new()
                },
            }
        }
    }

    fn store() -> Store<CounterState, CounterAction, (), CounterReducer> {
        Store::new(CounterState::default(), CounterReducer, ())
    }

    #[tokio::test]
    async fn send_runs_reducer() {
        let store = store();
        store.send(CounterAction::Increment).await.unwrap();
        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn handle_waits_for_feedback_action() {
        let store = store();
        let mut handle = store.send(CounterAction::IncrementLater).await.unwrap();
        handle.wait().await;
        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn parallel_effects_all_feed_back() {
        let store = store();
        let mut handle = store
            .send(CounterAction::IncrementTwiceInParallel)
            .await
            .unwrap();
        handle
            .wait_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(store.state(|s| s.count).await, 2);
    }

    #[tokio::test]
    async fn sequential_effects_keep_order() {
        let store = store();
        let mut handle = store.send(CounterAction::IncrementInSequence).await.unwrap();
        handle.wait().await;
        // Increment (1) must land before Done multiplies by ten.
        assert_eq!(store.state(|s| s.count).await, 10);
    }

    #[tokio::test]
    async fn send_and_wait_for_returns_matching_action() {
        let store = store();
        let action = store
            .send_and_wait_for(
                CounterAction::IncrementLater,
                |a| matches!(a, CounterAction::Increment),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(action, CounterAction::Increment);
    }

    #[tokio::test]
    async fn send_and_wait_for_times_out() {
        let store = store();
        let result = store
            .send_and_wait_for(
                CounterAction::Increment,
                |a| matches!(a, CounterAction::Done),
                Duration::from_millis(20),
            )
            .await;
        assert_eq!(result.unwrap_err(), StoreError::Timeout);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = store();
        store.shutdown(Duration::from_secs(1)).await.unwrap();
        let result = store.send(CounterAction::Increment).await;
        assert_eq!(result.unwrap_err(), StoreError::ShutdownInProgress);
    }

    #[test]
    fn completed_handle_has_nothing_pending() {
        let handle = EffectHandle::completed();
        assert_eq!(handle.pending(), 0);
    }
}
