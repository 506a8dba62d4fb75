//! Per-row presentation state for the order list.
//!
//! Rows are rebuilt from current tracker state on every render; nothing
//! here is cached between ticks.

use serde::Serialize;

use super::feed::OrderLine;
use super::item::OrderStatus;
use crate::countdown::{format_remaining, CountdownTracker};

pub const CANCEL_LABEL: &str = "Cancel Order";
pub const CANT_CANCEL_LABEL: &str = "Can't Cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBadge {
    Cancelled,
    Delivered,
    InTransit,
}

impl StatusBadge {
    pub fn for_status(status: &OrderStatus) -> Self {
        match status {
            OrderStatus::Cancelled => StatusBadge::Cancelled,
            OrderStatus::Delivered => StatusBadge::Delivered,
            _ => StatusBadge::InTransit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub order_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub status: OrderStatus,
    pub is_custom: bool,
    pub badge: StatusBadge,
    pub remaining_secs: u64,
    pub can_cancel: bool,
    /// `m:ss` left to cancel; only present while cancelling is allowed.
    pub countdown: Option<String>,
    pub cancel_label: &'static str,
}

impl OrderRow {
    pub fn build(line: &OrderLine, tracker: &CountdownTracker) -> Self {
        let remaining_secs = tracker.remaining(&line.order_id);
        let can_cancel =
            tracker.is_action_allowed(&line.order_id, line.status.action_already_resolved());
        Self {
            order_id: line.order_id.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            status: line.status.clone(),
            is_custom: line.is_custom,
            badge: StatusBadge::for_status(&line.status),
            remaining_secs,
            can_cancel,
            countdown: can_cancel.then(|| format_remaining(remaining_secs)),
            cancel_label: if can_cancel { CANCEL_LABEL } else { CANT_CANCEL_LABEL },
        }
    }
}

/// Rows for every line, in feed order.
pub fn build_rows(lines: &[OrderLine], tracker: &CountdownTracker) -> Vec<OrderRow> {
    lines.iter().map(|line| OrderRow::build(line, tracker)).collect()
}
