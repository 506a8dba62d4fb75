pub mod cancel;
pub mod config;
pub mod render;
pub mod source;
pub mod status;
pub mod watch;
