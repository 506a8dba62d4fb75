use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why the periodic ticker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A tick left no countdown above zero.
    AllExpired,
    /// The owner stopped the session (view closed).
    Stopped,
}

/// Every countdown state change produces an Event.
/// The CLI prints them; the session logs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Tracker state was replaced from a fresh item set.
    CountdownsInitialized {
        tracked: usize,
        active: usize,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero on a tick.
    CountdownExpired {
        id: String,
        at: DateTime<Utc>,
    },
    TickerStarted {
        active: usize,
        at: DateTime<Utc>,
    },
    TickerStopped {
        reason: StopReason,
        at: DateTime<Utc>,
    },
}
