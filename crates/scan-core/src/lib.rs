//! # scan-core
//!
//! Shared library for Scan-To-Web containing the broadcast message type, the
//! observable scan state holder, and the outbound script construction.
//!
//! This crate is used by the bridge application and by any future shell that
//! hosts the same pipeline. It has zero dependencies on OS APIs, UI
//! frameworks, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! Scan-To-Web turns hardware barcode scans into JavaScript callback calls
//! inside a hosted web page, with no server round trip. A scan travels
//! through three stages:
//!
//! 1. **Broadcast ingress** – the scanner's driver layer publishes each scan
//!    as a broadcast message: an *action* string identifying the message kind
//!    plus string-keyed *extras* carrying the decoded payload. Decoding and
//!    filtering live in the bridge application; the message *type* lives here.
//!
//! 2. **Scan state** – a process-wide, observable, single-slot store of the
//!    most recent scan payload. One writer (the broadcast listener), any
//!    number of subscribers. New subscribers immediately receive the current
//!    value, then every change. See [`state`].
//!
//! 3. **Script building** – each observed payload is turned into a guarded
//!    JavaScript statement (`if (window.onBarcodeScanned) ...`) that is safe
//!    to submit to the page regardless of payload contents. See
//!    [`domain::script`].
//!
//! This crate defines:
//!
//! - **`domain`** – Pure value types and functions: the [`ScanBroadcast`]
//!   message shape and the script escaping/building functions.
//! - **`state`** – The [`ScanState`] holder and its subscription type.

// Declare the top-level modules. Rust will look for each in a subdirectory
// with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod state;

// Re-export the most-used items at the crate root so callers can write
// `scan_core::ScanState` instead of `scan_core::state::ScanState`.
pub use domain::broadcast::{ScanBroadcast, DEFAULT_PAYLOAD_KEY, DEFAULT_SCAN_ACTION};
pub use domain::script::{callback_invocation, escape_single_quoted, DEFAULT_CALLBACK};
pub use state::{ScanSlot, ScanState, ScanSubscription, StateClosed};
