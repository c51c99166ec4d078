//! WebSocket fan-out for the shared raid boss.
//!
//! Clients subscribe to raid events and may submit attacks; every health
//! change and the defeat are pushed, so a kill registers on all screens
//! at once.
//!
//! ## Usage
//!
//! Build with web feature:
//! ```sh
//! cargo build --features web
//! ```

#[cfg(feature = "web")]
mod server;

#[cfg(feature = "web")]
pub use server::{start_raid_server, RaidChannel};
