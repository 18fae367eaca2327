//! Async driver for [`TimerEngine`].
//!
//! `FocusTimer` owns the engine behind one async mutex. Three sources of
//! change serialize through it: caller commands, the polling tick task and
//! the lifecycle listener. At most one tick task exists at a time.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::clock::{Clock, SystemClock};
use super::engine::{TimerEngine, TimerPhase};
use crate::error::TimerError;
use crate::events::Event;
use crate::lifecycle::{AppLifecycle, LifecycleSubscription};
use crate::session::SessionRecord;
use crate::storage::SessionStore;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

const EVENT_CAPACITY: usize = 64;

struct Shared<C: Clock> {
    engine: Mutex<TimerEngine<C>>,
    store: Arc<SessionStore>,
    events: broadcast::Sender<Event>,
    ticker: StdMutex<Option<JoinHandle<()>>>,
    tick_interval: Duration,
}

/// A running focus timer bound to a session store and a lifecycle signal.
///
/// Must be created inside a tokio runtime. Dropping it stops the tick task
/// and releases the lifecycle subscription.
pub struct FocusTimer<C: Clock + 'static = SystemClock> {
    shared: Arc<Shared<C>>,
    lifecycle_listener: JoinHandle<()>,
}

impl<C: Clock + 'static> FocusTimer<C> {
    pub fn new(
        engine: TimerEngine<C>,
        store: Arc<SessionStore>,
        lifecycle: LifecycleSubscription,
    ) -> Self {
        Self::with_tick_interval(engine, store, lifecycle, DEFAULT_TICK_INTERVAL)
    }

    pub fn with_tick_interval(
        engine: TimerEngine<C>,
        store: Arc<SessionStore>,
        lifecycle: LifecycleSubscription,
        tick_interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            engine: Mutex::new(engine),
            store,
            events,
            ticker: StdMutex::new(None),
            tick_interval,
        });
        let lifecycle_listener = spawn_lifecycle_listener(Arc::clone(&shared), lifecycle);
        Self {
            shared,
            lifecycle_listener,
        }
    }

    /// Receive every event this timer produces from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.shared.store
    }

    /// Run a read-only query against the engine.
    pub async fn inspect<R>(&self, f: impl FnOnce(&TimerEngine<C>) -> R) -> R {
        let engine = self.shared.engine.lock().await;
        f(&engine)
    }

    pub async fn phase(&self) -> TimerPhase {
        self.inspect(|e| e.phase()).await
    }

    pub async fn remaining_secs(&self) -> u64 {
        self.inspect(|e| e.remaining_secs()).await
    }

    pub async fn distraction_count(&self) -> u32 {
        self.inspect(|e| e.distraction_count()).await
    }

    pub async fn snapshot(&self) -> Event {
        self.inspect(|e| e.snapshot()).await
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn configure_target(&self, minutes_input: &str) -> Event {
        let mut engine = self.shared.engine.lock().await;
        let event = engine.configure_target(minutes_input);
        self.shared.emit(event.clone());
        event
    }

    pub async fn set_category(&self, category: impl Into<String>) -> Event {
        let mut engine = self.shared.engine.lock().await;
        let event = engine.set_category(category);
        self.shared.emit(event.clone());
        event
    }

    /// Start or resume, spawning a fresh tick task.
    ///
    /// Starting over a pending summary emits `SummaryAcknowledged` first.
    pub async fn start(&self) -> Result<Option<Event>, TimerError> {
        let mut engine = self.shared.engine.lock().await;
        let had_summary = engine.phase() == TimerPhase::Completed;
        let event = engine.start()?;
        if let Some(started) = &event {
            if had_summary {
                self.shared.emit(Event::SummaryAcknowledged {
                    at: engine.clock().now(),
                });
            }
            self.shared.spawn_ticker();
            self.shared.emit(started.clone());
        }
        Ok(event)
    }

    pub async fn pause(&self) -> Option<Event> {
        let mut engine = self.shared.engine.lock().await;
        let event = engine.pause(false);
        if let Some(paused) = &event {
            self.shared.cancel_ticker();
            self.shared.emit(paused.clone());
        }
        event
    }

    pub async fn reset(&self) -> Event {
        let mut engine = self.shared.engine.lock().await;
        let event = engine.reset();
        self.shared.cancel_ticker();
        self.shared.emit(event.clone());
        event
    }

    /// Dismiss a completion summary.
    pub async fn acknowledge(&self) -> Option<SessionRecord> {
        let mut engine = self.shared.engine.lock().await;
        let summary = engine.acknowledge();
        if summary.is_some() {
            self.shared.emit(Event::SummaryAcknowledged {
                at: engine.clock().now(),
            });
        }
        summary
    }

    /// Feed a lifecycle transition directly, bypassing the subscription.
    pub async fn observe_lifecycle(&self, next: AppLifecycle) -> Option<Event> {
        self.shared.apply_lifecycle(next).await
    }

    /// Stop all background work.
    ///
    /// Teardown happens when `self` is dropped here: the tick task and the
    /// lifecycle listener are aborted.
    pub fn shutdown(self) {}
}

impl<C: Clock + 'static> Drop for FocusTimer<C> {
    fn drop(&mut self) {
        self.lifecycle_listener.abort();
        self.shared.cancel_ticker();
    }
}

impl<C: Clock + 'static> Shared<C> {
    fn emit(&self, event: Event) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    /// Replace any existing tick task with a new one.
    ///
    /// Callers hold the engine lock, so the new task cannot observe a
    /// half-applied transition.
    fn spawn_ticker(self: &Arc<Self>) {
        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let shared = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            let mut interval = time::interval(shared.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let mut engine = shared.engine.lock().await;
                if !engine.is_running() {
                    break;
                }

                // Persist and emit under the lock with no further await, so
                // cancellation cannot drop the record and no command event
                // can overtake the completion.
                if let Some(event) = engine.tick() {
                    if let Some(record) = event.completed_record() {
                        shared.store.append_and_persist(record.clone());
                    }
                    shared.emit(event);
                    break;
                }
            }
        }));
    }

    fn cancel_ticker(&self) {
        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    async fn apply_lifecycle(&self, next: AppLifecycle) -> Option<Event> {
        let mut engine = self.engine.lock().await;
        let previous = engine.lifecycle();
        if previous != next {
            self.emit(Event::LifecycleChanged {
                from: previous,
                to: next,
                at: engine.clock().now(),
            });
        }
        let paused = engine.observe_lifecycle(next)?;
        self.cancel_ticker();
        self.emit(paused.clone());
        Some(paused)
    }
}

fn spawn_lifecycle_listener<C: Clock + 'static>(
    shared: Arc<Shared<C>>,
    mut lifecycle: LifecycleSubscription,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(next) = lifecycle.recv().await {
            shared.apply_lifecycle(next).await;
        }
        tracing::debug!("lifecycle signal closed");
    })
}
