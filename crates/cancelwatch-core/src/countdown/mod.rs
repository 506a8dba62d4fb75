mod format;
mod session;
mod tracker;

pub use format::format_remaining;
pub use session::{CountdownSession, DEFAULT_TICK_PERIOD};
pub use tracker::{remaining_for, CountdownTracker, Snapshot};
