//! Domain layer for scan-web-bridge.
//!
//! Contains pure business-logic types with no dependencies on I/O,
//! networking, or external frameworks.
//!
//! The message and state types live in `scan-core` (they are shared with
//! any other shell hosting the same pipeline); only the bridge's own
//! configuration lives here.

pub mod config;

pub use config::BridgeConfig;
