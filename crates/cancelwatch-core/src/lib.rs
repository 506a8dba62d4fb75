//! # Cancelwatch Core Library
//!
//! Client-side cancellation windows for storefront orders. The order service
//! stamps every order with `createdAt` and a `cancelTimeLeft` window; this
//! library turns those into per-order countdowns that gate the cancel
//! action without asking the server again.
//!
//! ## Architecture
//!
//! - **Countdown Tracker**: pure `id -> remaining seconds` state with
//!   `initialize`/`tick` commands, independent of any UI framework
//! - **Countdown Session**: owns the tracker and the one periodic ticker
//!   that drives it; the ticker stops itself once every window has closed
//!   and is released when the session is stopped or dropped
//! - **Orders**: wire shapes of the order listings, normalization into rows,
//!   and per-row presentation state
//! - **Client**: HTTP access to the order listing and cancel endpoints
//! - **Storage**: TOML configuration
//!
//! ## Key Components
//!
//! - [`CountdownTracker`]: countdown state machine
//! - [`CountdownSession`]: timer lifecycle and observers
//! - [`OrderFeed`]: order listing normalization
//! - [`OrderClient`]: order service client
//! - [`Config`]: application configuration

pub mod client;
pub mod countdown;
pub mod error;
pub mod events;
pub mod orders;
pub mod storage;

pub use client::OrderClient;
pub use countdown::{
    format_remaining, remaining_for, CountdownSession, CountdownTracker, Snapshot,
    DEFAULT_TICK_PERIOD,
};
pub use error::{ClientError, ConfigError, CoreError};
pub use events::{Event, StopReason};
pub use orders::{build_rows, OrderFeed, OrderLine, OrderRow, OrderStatus, TrackableItem};
pub use storage::Config;
