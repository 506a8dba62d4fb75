//! Countdown session: a tracker plus the periodic timer that drives it.
//!
//! The session is owned by whatever shows the countdowns (a view, the CLI
//! `watch` loop). Creating it acquires nothing; the ticker task is spawned
//! lazily by `initialize()` and released by `stop()` or `Drop`, whichever
//! comes first.
//!
//! Snapshots go out on a `watch` channel after every initialize and tick.
//! Events raised by the ticker itself (`CountdownExpired`, and
//! `TickerStopped` once every window has closed) go out on a `broadcast`
//! channel; events caused by a command are returned from that command.
//!
//! ## Ticker lifecycle
//!
//! ```text
//! Idle --initialize(any active)--> Ticking --tick(none active)--> Idle
//!                                  Ticking --stop()/drop---------> Idle
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::tracker::{CountdownTracker, Snapshot};
use crate::error::{CoreError, Result};
use crate::events::{Event, StopReason};
use crate::orders::TrackableItem;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 64;

/// State shared with the ticker task. `ticking` is only flipped while the
/// lock is held, so `initialize()` and a finishing ticker never both miss
/// (or both start) a timer.
#[derive(Debug, Default)]
struct Shared {
    tracker: CountdownTracker,
    ticking: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct CountdownSession {
    shared: Arc<Mutex<Shared>>,
    updates: Arc<watch::Sender<Snapshot>>,
    events: broadcast::Sender<Event>,
    ticker: Option<JoinHandle<()>>,
    runtime: Handle,
    period: Duration,
}

impl CountdownSession {
    /// Create an idle session on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`CoreError::NoRuntime`] when called outside a runtime.
    pub fn new(period: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        let (updates, _) = watch::channel(Snapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            updates: Arc::new(updates),
            events,
            ticker: None,
            runtime,
            period: period.max(Duration::from_millis(1)),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn initialize(&mut self, items: &[TrackableItem]) -> Vec<Event> {
        self.initialize_at(items, Utc::now())
    }

    /// Replace the tracked set and make sure a ticker runs if anything is
    /// active. A running ticker is reused.
    pub fn initialize_at(&mut self, items: &[TrackableItem], now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::with_capacity(2);
        let (active, start) = {
            let mut shared = lock(&self.shared);
            events.push(shared.tracker.initialize_at(items, now));
            let start = !shared.ticking && shared.tracker.has_active();
            if start {
                shared.ticking = true;
            }
            // Published under the lock so a finishing tick cannot overwrite it.
            let snapshot = shared.tracker.snapshot_at(now);
            let active = snapshot.active;
            self.updates.send_replace(snapshot);
            (active, start)
        };

        if start {
            self.spawn_ticker();
            tracing::info!("countdown ticker started for {} active item(s)", active);
            events.push(Event::TickerStarted {
                active,
                at: Utc::now(),
            });
        }
        events
    }

    /// Cancel the ticker. Safe to call repeatedly.
    pub fn stop(&mut self) -> Option<Event> {
        let was_ticking = std::mem::replace(&mut lock(&self.shared).ticking, false);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        if !was_ticking {
            return None;
        }
        tracing::info!("countdown ticker stopped by owner");
        Some(Event::TickerStopped {
            reason: StopReason::Stopped,
            at: Utc::now(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn remaining(&self, id: &str) -> u64 {
        lock(&self.shared).tracker.remaining(id)
    }

    pub fn is_action_allowed(&self, id: &str, action_already_resolved: bool) -> bool {
        lock(&self.shared)
            .tracker
            .is_action_allowed(id, action_already_resolved)
    }

    pub fn is_ticking(&self) -> bool {
        lock(&self.shared).ticking
    }

    pub fn snapshot(&self) -> Snapshot {
        lock(&self.shared).tracker.snapshot()
    }

    /// Run `f` against the current tracker state.
    pub fn with_tracker<R>(&self, f: impl FnOnce(&CountdownTracker) -> R) -> R {
        f(&lock(&self.shared).tracker)
    }

    /// Receive a fresh snapshot after every initialize and tick.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Receive the events the ticker raises on its own: one
    /// `CountdownExpired` per closed window and `TickerStopped` with
    /// [`StopReason::AllExpired`] when it stops itself.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_ticker(&mut self) {
        let shared = Arc::clone(&self.shared);
        let updates = Arc::clone(&self.updates);
        let events = self.events.clone();
        // A previous handle, if any, belongs to a ticker that already
        // cleared `ticking` and is on its way out.
        self.ticker = Some(self.runtime.spawn(run_ticker(shared, updates, events, self.period)));
    }
}

impl Drop for CountdownSession {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

async fn run_ticker(
    shared: Arc<Mutex<Shared>>,
    updates: Arc<watch::Sender<Snapshot>>,
    events: broadcast::Sender<Event>,
    period: Duration,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let at = Utc::now();
        let (expired, done) = {
            let mut shared = lock(&shared);
            let expired = shared.tracker.tick_at(at);
            let done = !shared.tracker.has_active();
            if done {
                shared.ticking = false;
            }
            updates.send_replace(shared.tracker.snapshot_at(at));
            (expired, done)
        };

        // Sending fails only when nobody subscribed.
        for event in expired {
            if let Event::CountdownExpired { id, .. } = &event {
                tracing::debug!("cancel window closed for {}", id);
            }
            let _ = events.send(event);
        }
        if done {
            tracing::info!("all cancel windows closed; countdown ticker stopped");
            let _ = events.send(Event::TickerStopped {
                reason: StopReason::AllExpired,
                at,
            });
            break;
        }
    }
}
