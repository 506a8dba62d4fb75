//! Countdown tracker.
//!
//! Keeps, per item id, the whole seconds left in the item's action window.
//! The tracker is pure state: the caller (usually a [`CountdownSession`])
//! decides when to call `tick()`.
//!
//! ## Per-item states
//!
//! ```text
//! Active (remaining > 0) -> Expired (remaining == 0)
//! ```
//!
//! There is no way back to Active except a fresh `initialize()`, which
//! replaces the whole mapping.
//!
//! [`CountdownSession`]: super::CountdownSession

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::orders::TrackableItem;

/// Read-only view of the tracker handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub remaining: BTreeMap<String, u64>,
    /// Number of ids with remaining > 0.
    pub active: usize,
    pub at: DateTime<Utc>,
}

impl Snapshot {
    pub fn remaining(&self, id: &str) -> u64 {
        self.remaining.get(id).copied().unwrap_or(0)
    }

    pub fn is_action_allowed(&self, id: &str, action_already_resolved: bool) -> bool {
        !action_already_resolved && self.remaining(id) > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountdownTracker {
    remaining: BTreeMap<String, u64>,
}

/// Seconds left for `item` at `now`, or `None` when the item is not
/// time-boxed (missing or unusable timestamp/window).
///
/// A creation time in the future counts as zero elapsed time.
pub fn remaining_for(item: &TrackableItem, now: DateTime<Utc>) -> Option<u64> {
    let created_at = item.created_at?;
    let window = item.window_secs.filter(|w| w.is_finite() && *w > 0.0)?;
    let elapsed_ms = now
        .signed_duration_since(created_at)
        .num_milliseconds()
        .max(0);
    let left = window - elapsed_ms as f64 / 1000.0;
    Some(if left > 0.0 { left.floor() as u64 } else { 0 })
}

impl CountdownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace all state from `items`, measured against the wall clock.
    pub fn initialize(&mut self, items: &[TrackableItem]) -> Event {
        self.initialize_at(items, Utc::now())
    }

    /// Replace all state from `items`, measured against `now`.
    ///
    /// Items sharing an id (rows of one purchase) collapse to one entry;
    /// the last one wins.
    pub fn initialize_at(&mut self, items: &[TrackableItem], now: DateTime<Utc>) -> Event {
        let mut next = BTreeMap::new();
        for item in items {
            match remaining_for(item, now) {
                Some(secs) => {
                    next.insert(item.id.clone(), secs);
                }
                None => {
                    tracing::debug!("item {} has no usable cancel window; not tracked", item.id);
                }
            }
        }
        self.remaining = next;

        Event::CountdownsInitialized {
            tracked: self.remaining.len(),
            active: self.active_count(),
            at: now,
        }
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(Utc::now())
    }

    /// Decrement every positive countdown by one second, stamping events
    /// with `at`.
    ///
    /// Returns one `CountdownExpired` event per id that reached zero on this
    /// call. Ids already at zero are untouched.
    pub fn tick_at(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        let mut expired = Vec::new();
        for (id, secs) in self.remaining.iter_mut() {
            if *secs == 0 {
                continue;
            }
            *secs -= 1;
            if *secs == 0 {
                expired.push(Event::CountdownExpired { id: id.clone(), at });
            }
        }
        expired
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Seconds left for `id`; untracked ids report 0.
    pub fn remaining(&self, id: &str) -> u64 {
        self.remaining.get(id).copied().unwrap_or(0)
    }

    /// Gate for the cancel action. Evaluate on every render, never cache.
    pub fn is_action_allowed(&self, id: &str, action_already_resolved: bool) -> bool {
        !action_already_resolved && self.remaining(id) > 0
    }

    pub fn has_active(&self) -> bool {
        self.remaining.values().any(|&secs| secs > 0)
    }

    pub fn active_count(&self) -> usize {
        self.remaining.values().filter(|&&secs| secs > 0).count()
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, at: DateTime<Utc>) -> Snapshot {
        Snapshot {
            remaining: self.remaining.clone(),
            active: self.active_count(),
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::OrderStatus;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn item(id: &str, window: f64) -> TrackableItem {
        TrackableItem::new(id, created(), window)
    }

    #[test]
    fn fresh_item_counts_down_to_zero_and_stays() {
        let mut tracker = CountdownTracker::new();
        tracker.initialize_at(&[item("o1", 3.0)], created());
        assert_eq!(tracker.remaining("o1"), 3);
        assert!(tracker.is_action_allowed("o1", false));

        for _ in 0..3 {
            tracker.tick();
        }
        assert_eq!(tracker.remaining("o1"), 0);
        assert!(!tracker.is_action_allowed("o1", false));

        tracker.tick();
        assert_eq!(tracker.remaining("o1"), 0);
    }

    #[test]
    fn tick_reports_expiry_once() {
        let mut tracker = CountdownTracker::new();
        tracker.initialize_at(&[item("o1", 1.0), item("o2", 5.0)], created());

        let events = tracker.tick();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::CountdownExpired { id, .. } if id == "o1"));
        assert!(tracker.tick().is_empty());
    }

    #[test]
    fn elapsed_window_is_expired_immediately() {
        let mut tracker = CountdownTracker::new();
        let now = created() + Duration::seconds(600);
        let event = tracker.initialize_at(&[item("o1", 300.0)], now);
        assert_eq!(tracker.remaining("o1"), 0);
        assert!(!tracker.has_active());
        assert!(matches!(
            event,
            Event::CountdownsInitialized { tracked: 1, active: 0, .. }
        ));
    }

    #[test]
    fn fractional_elapsed_is_floored() {
        let mut tracker = CountdownTracker::new();
        let now = created() + Duration::milliseconds(2_500);
        tracker.initialize_at(&[item("o1", 10.0)], now);
        assert_eq!(tracker.remaining("o1"), 7);
    }

    #[test]
    fn future_creation_never_exceeds_window() {
        let mut tracker = CountdownTracker::new();
        let now = created() - Duration::seconds(30);
        tracker.initialize_at(&[item("o1", 10.0)], now);
        assert_eq!(tracker.remaining("o1"), 10);
    }

    #[test]
    fn unusable_items_are_excluded() {
        let mut missing_created = item("a", 10.0);
        missing_created.created_at = None;
        let mut missing_window = item("b", 10.0);
        missing_window.window_secs = None;
        let items = vec![
            missing_created,
            missing_window,
            item("c", 0.0),
            item("d", -5.0),
            item("e", f64::NAN),
        ];

        let mut tracker = CountdownTracker::new();
        tracker.initialize_at(&items, created());
        assert!(tracker.is_empty());
        for id in ["a", "b", "c", "d", "e"] {
            assert_eq!(tracker.remaining(id), 0);
            assert!(!tracker.is_action_allowed(id, false));
        }
    }

    #[test]
    fn resolved_action_is_never_allowed() {
        let mut tracker = CountdownTracker::new();
        let cancelled = item("o1", 60.0).with_status(OrderStatus::Cancelled);
        tracker.initialize_at(&[cancelled.clone()], created());
        assert_eq!(tracker.remaining("o1"), 60);
        assert!(!tracker.is_action_allowed("o1", cancelled.action_already_resolved()));
    }

    #[test]
    fn initialize_replaces_instead_of_merging() {
        let mut tracker = CountdownTracker::new();
        tracker.initialize_at(&[item("o1", 60.0), item("o2", 60.0)], created());
        tracker.initialize_at(&[item("o2", 30.0)], created());
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.remaining("o1"), 0);
        assert_eq!(tracker.remaining("o2"), 30);
    }

    #[test]
    fn duplicate_ids_keep_last_entry() {
        let mut tracker = CountdownTracker::new();
        tracker.initialize_at(&[item("p1", 60.0), item("p1", 20.0)], created());
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.remaining("p1"), 20);
    }

    #[test]
    fn empty_set_has_no_active_countdowns() {
        let mut tracker = CountdownTracker::new();
        let event = tracker.initialize_at(&[], created());
        assert!(!tracker.has_active());
        assert!(matches!(
            event,
            Event::CountdownsInitialized { tracked: 0, active: 0, .. }
        ));
    }

    #[test]
    fn snapshot_mirrors_tracker() {
        let mut tracker = CountdownTracker::new();
        tracker.initialize_at(&[item("o1", 5.0), item("o2", 0.5)], created());
        let snap = tracker.snapshot();
        assert_eq!(snap.active, 1);
        assert_eq!(snap.remaining("o1"), 5);
        assert_eq!(snap.remaining("o2"), 0);
        assert!(snap.is_action_allowed("o1", false));
        assert!(!snap.is_action_allowed("o1", true));
    }

    #[test]
    fn tick_and_snapshot_use_the_given_instant() {
        let mut tracker = CountdownTracker::new();
        tracker.initialize_at(&[item("o1", 1.0)], created());
        let at = created() + Duration::seconds(1);
        let events = tracker.tick_at(at);
        assert!(matches!(&events[0], Event::CountdownExpired { at: stamp, .. } if *stamp == at));
        assert_eq!(tracker.snapshot_at(at).at, at);
    }

    proptest! {
        #[test]
        fn initialize_yields_window_minus_elapsed(window in 1u32..100_000, elapsed in 0u32..200_000) {
            let mut tracker = CountdownTracker::new();
            let now = created() + Duration::seconds(elapsed as i64);
            tracker.initialize_at(&[item("x", window as f64)], now);
            let expected = (window as i64 - elapsed as i64).max(0) as u64;
            prop_assert_eq!(tracker.remaining("x"), expected);
        }

        #[test]
        fn ticks_decrease_by_exactly_one_until_zero(window in 1u32..200, ticks in 0usize..300) {
            let mut tracker = CountdownTracker::new();
            tracker.initialize_at(&[item("x", window as f64)], created());
            let mut previous = tracker.remaining("x");
            for _ in 0..ticks {
                tracker.tick();
                let current = tracker.remaining("x");
                prop_assert_eq!(current, previous.saturating_sub(1));
                previous = current;
            }
        }

        #[test]
        fn allowed_iff_positive_and_unresolved(window in 0u32..50, ticks in 0usize..60, resolved in any::<bool>()) {
            let mut tracker = CountdownTracker::new();
            tracker.initialize_at(&[item("x", window as f64)], created());
            for _ in 0..ticks {
                tracker.tick();
            }
            let expected = !resolved && tracker.remaining("x") > 0;
            prop_assert_eq!(tracker.is_action_allowed("x", resolved), expected);
        }
    }
}
