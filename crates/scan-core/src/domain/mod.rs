//! Domain layer for scan-core.
//!
//! Pure value types and functions with no dependencies on I/O, async
//! runtimes, or external frameworks. Everything in this module can be used
//! and tested synchronously.
//!
//! # What belongs in the domain layer?
//!
//! - The broadcast message shape (the "language" between the scanner driver
//!   layer and the bridge)
//! - The well-known action / extra-key / callback-name constants
//! - The script escaping and construction functions
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, socket, or WebSocket types
//! - The scan state holder (it depends on a notification primitive and
//!   therefore lives in its own [`crate::state`] module)

pub mod broadcast;
pub mod script;

// Re-export at the domain boundary so callers can write
// `domain::ScanBroadcast` instead of the longer path.
pub use broadcast::ScanBroadcast;
pub use script::{callback_invocation, escape_single_quoted};
