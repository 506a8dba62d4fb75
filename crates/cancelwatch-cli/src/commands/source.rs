//! Where the CLI gets its order rows from.

use std::error::Error;
use std::path::PathBuf;

use cancelwatch_core::{ClientError, Config, OrderClient, OrderFeed, OrderLine};
use clap::Args;
use tokio::runtime::{Builder, Runtime};

#[derive(Args, Debug)]
pub struct OrderSource {
    /// Read orders from a JSON file shaped like {"purchases": [...], "customOrders": [...]}
    #[arg(long, value_name = "FILE", conflicts_with = "user")]
    pub orders: Option<PathBuf>,
    /// Fetch orders for this user from the order service (defaults to config user_id)
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,
}

impl OrderSource {
    pub async fn load(&self, config: &Config) -> Result<Vec<OrderLine>, Box<dyn Error>> {
        if let Some(path) = &self.orders {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            let feed = OrderFeed::from_json(&json)?;
            return Ok(feed.lines());
        }

        let user = self
            .user
            .clone()
            .or_else(|| config.user_id.clone())
            .ok_or("no order source: pass --orders <FILE> or --user <ID>, or set user_id")?;
        let feed = client(config)?.fetch_orders(&user).await?;
        Ok(feed.lines())
    }
}

pub fn client(config: &Config) -> Result<OrderClient, ClientError> {
    OrderClient::new(&config.api.base_url, config.request_timeout())
}

/// Countdowns run on a single-threaded runtime, like the views they replace.
pub fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}
