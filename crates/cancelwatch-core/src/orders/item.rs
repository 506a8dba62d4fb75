//! Trackable items: anything with a creation time and a cancellation window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order status as reported by the order service.
///
/// Only `Cancelled` resolves the cancel action; every other value leaves it
/// to the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(s) => s,
        }
    }

    /// True when the external system already settled the cancel action.
    pub fn action_already_resolved(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" | "Pending" => OrderStatus::Pending,
            "Delivered" => OrderStatus::Delivered,
            "Cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Input to the countdown tracker.
///
/// `created_at` and `window_secs` are `None` when the source value was
/// missing or unusable; such items are never time-boxed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackableItem {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub window_secs: Option<f64>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl TrackableItem {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, window_secs: f64) -> Self {
        Self {
            id: id.into(),
            created_at: Some(created_at),
            window_secs: Some(window_secs),
            status: OrderStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn action_already_resolved(&self) -> bool {
        self.status.action_already_resolved()
    }
}

/// Parse a server timestamp leniently.
///
/// Accepts RFC 3339 (what the order service emits) and a bare
/// `YYYY-MM-DDTHH:MM:SS[.fff]` treated as UTC. Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Interpret a window value from JSON.
///
/// Numbers and numeric strings are accepted; the tracker decides whether the
/// value is usable (positive, finite).
pub fn parse_window(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
