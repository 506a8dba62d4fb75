//! HTTP client for the order service.
//!
//! Two read endpoints feed the order list; two write endpoints cancel an
//! order. The countdown never calls this module; callers gate `cancel` on
//! the tracker via [`OrderClient::cancel_within_window`].

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::countdown::CountdownTracker;
use crate::error::ClientError;
use crate::orders::{CustomOrderRecord, OrderFeed, OrderLine, PurchaseRecord};

#[derive(Debug, Clone)]
pub struct OrderClient {
    http: reqwest::Client,
    base: Url,
}

impl OrderClient {
    /// Build a client for `base_url` (a path prefix such as `/api` is kept).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch and normalize both order listings for `user_id`.
    pub async fn fetch_orders(&self, user_id: &str) -> Result<OrderFeed, ClientError> {
        let purchases_url = self.endpoint(&["purchase", "user", user_id])?;
        let custom_url = self.endpoint(&["orderc", "custom-orders", "user", user_id])?;

        let (purchases, custom_orders) = tokio::try_join!(
            self.get_json::<Vec<PurchaseRecord>>(purchases_url),
            self.get_json::<Vec<CustomOrderRecord>>(custom_url),
        )?;
        tracing::debug!(
            "fetched {} purchase(s) and {} custom order(s) for user {}",
            purchases.len(),
            custom_orders.len(),
            user_id
        );
        Ok(OrderFeed {
            purchases,
            custom_orders,
        })
    }

    /// Issue the cancel command. Only HTTP 200 counts as success.
    pub async fn cancel(&self, order_id: &str, is_custom: bool) -> Result<(), ClientError> {
        let url = if is_custom {
            self.endpoint(&["orderc", order_id, "cancel"])?
        } else {
            self.endpoint(&["purchase", order_id, "cancel"])?
        };
        tracing::debug!("PUT {}", url);

        let resp = self.http.put(url).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(rejected(resp).await);
        }
        tracing::info!("order {} cancelled", order_id);
        Ok(())
    }

    /// Cancel `line` only while the tracker still allows it.
    pub async fn cancel_within_window(
        &self,
        line: &OrderLine,
        tracker: &CountdownTracker,
    ) -> Result<(), ClientError> {
        if !tracker.is_action_allowed(&line.order_id, line.status.action_already_resolved()) {
            return Err(ClientError::WindowClosed {
                order_id: line.order_id.clone(),
            });
        }
        self.cancel(&line.order_id, line.is_custom).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        tracing::debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(rejected(resp).await);
        }
        Ok(resp.json().await?)
    }
}

/// Turn a non-success response into `Rejected`, preferring the server's
/// `message` field over the raw body.
async fn rejected(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
    ClientError::Rejected {
        status: status.as_u16(),
        message,
    }
}
