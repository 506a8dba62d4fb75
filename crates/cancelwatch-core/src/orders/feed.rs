//! Order feed normalization.
//!
//! The order service returns two listings per user: regular purchases (one
//! record with many products) and custom t-shirt orders. Both are flattened
//! into [`OrderLine`]s, one per displayed row, purchases first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::{parse_timestamp, parse_window, OrderStatus, TrackableItem};

/// A purchase record as returned by `GET /purchase/user/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cancel_time_left: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub products: Vec<PurchasedProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedProduct {
    #[serde(default, rename = "productId")]
    pub product: Option<ProductRef>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub status: Option<String>,
}

/// The product reference is populated by the server most of the time, but a
/// bare id is valid too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(ProductInfo),
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
}

/// A custom order as returned by `GET /orderc/custom-orders/user/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrderRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cancel_time_left: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tshirt_color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Both listings for one user.
///
/// This is also the on-disk shape accepted by the CLI's `--orders` flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFeed {
    #[serde(default)]
    pub purchases: Vec<PurchaseRecord>,
    #[serde(default)]
    pub custom_orders: Vec<CustomOrderRecord>,
}

/// One displayable order row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub order_id: String,
    pub product_name: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub quantity: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub window_secs: Option<f64>,
    pub status: OrderStatus,
    pub is_custom: bool,
}

const UNNAMED_PRODUCT: &str = "Unnamed Product";

fn default_quantity() -> u32 {
    1
}

/// First non-empty status wins; an absent status means the order is pending.
fn pick_status(candidates: &[Option<&String>]) -> OrderStatus {
    candidates
        .iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .map(|s| OrderStatus::from((*s).clone()))
        .unwrap_or_default()
}

fn timing(
    order_id: &str,
    created_at: Option<&str>,
    window: Option<&serde_json::Value>,
) -> (Option<DateTime<Utc>>, Option<f64>) {
    let created = created_at.and_then(|raw| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            tracing::warn!("order {}: unparseable createdAt {:?}", order_id, raw);
        }
        parsed
    });
    let window = window.filter(|v| !v.is_null()).and_then(|raw| {
        let parsed = parse_window(raw);
        if parsed.is_none() {
            tracing::warn!("order {}: non-numeric cancelTimeLeft {}", order_id, raw);
        }
        parsed
    });
    (created, window)
}

impl OrderFeed {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Flatten both listings into display rows.
    pub fn lines(&self) -> Vec<OrderLine> {
        let mut lines = Vec::new();

        for purchase in &self.purchases {
            let (created_at, window_secs) = timing(
                &purchase.id,
                purchase.created_at.as_deref(),
                purchase.cancel_time_left.as_ref(),
            );
            for product in &purchase.products {
                let info = match &product.product {
                    Some(ProductRef::Populated(info)) => info.clone(),
                    _ => ProductInfo::default(),
                };
                lines.push(OrderLine {
                    order_id: purchase.id.clone(),
                    product_name: info
                        .name
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
                    image_url: info.url,
                    description: info.desc,
                    quantity: product.quantity,
                    created_at,
                    window_secs,
                    status: pick_status(&[product.status.as_ref(), purchase.status.as_ref()]),
                    is_custom: false,
                });
            }
        }

        for order in &self.custom_orders {
            let (created_at, window_secs) = timing(
                &order.id,
                order.created_at.as_deref(),
                order.cancel_time_left.as_ref(),
            );
            let color = order.tshirt_color.clone().unwrap_or_default();
            lines.push(OrderLine {
                order_id: order.id.clone(),
                product_name: format!("Custom T-Shirt ({color})"),
                image_url: order.image_url.clone(),
                description: Some(format!(
                    "Color: {}, Location: {}",
                    color,
                    order.location.as_deref().unwrap_or_default()
                )),
                quantity: 1,
                created_at,
                window_secs,
                status: pick_status(&[order.status.as_ref()]),
                is_custom: true,
            });
        }

        lines
    }
}

impl OrderLine {
    /// The tracker input for this row. Rows of the same purchase share an id.
    pub fn trackable(&self) -> TrackableItem {
        TrackableItem {
            id: self.order_id.clone(),
            created_at: self.created_at,
            window_secs: self.window_secs,
            status: self.status.clone(),
        }
    }
}

/// Tracker inputs for a set of rows, in row order.
pub fn trackables(lines: &[OrderLine]) -> Vec<TrackableItem> {
    lines.iter().map(OrderLine::trackable).collect()
}
