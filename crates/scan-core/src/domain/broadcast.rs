//! The broadcast message type shared with the scanner driver layer.
//!
//! # What is a broadcast message? (for beginners)
//!
//! Barcode scanner vendors deliver decoded scans through an OS-level
//! publish/subscribe mechanism: every message carries an *action* string
//! identifying the message kind and a map of string-keyed *extras* carrying
//! the actual data. Any process can register interest in an action and
//! receive matching messages; everything else on the shared channel is noise
//! to be ignored.
//!
//! The bridge receives these messages as JSON datagrams on a loopback
//! socket (see the `scan-web-bridge` infrastructure layer):
//!
//! ```json
//! {"action":"com.scanbridge.SCAN","extras":{"com.symbol.datawedge.data_string":"012345678905"}}
//! ```
//!
//! # Trust model
//!
//! The payload is an opaque string: no business meaning is parsed or
//! validated here. The driver layer is trusted to supply the payload extra
//! under normal operation; a missing extra degrades to an empty string at
//! the listener (best-effort policy), never to an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The broadcast action that carries scan results.
///
/// This identifier is shared with the scanner driver layer's output
/// configuration; only broadcasts with exactly this action are treated as
/// scans. It can be overridden via bridge configuration.
pub const DEFAULT_SCAN_ACTION: &str = "com.scanbridge.SCAN";

/// The extra key under which the driver layer places the decoded payload.
///
/// Follows the DataWedge convention of namespacing extras with the vendor's
/// reverse-DNS prefix.
pub const DEFAULT_PAYLOAD_KEY: &str = "com.symbol.datawedge.data_string";

/// A single broadcast message as delivered by the scanner driver layer.
///
/// # Serde representation
///
/// ```json
/// {"action":"com.scanbridge.SCAN","extras":{"com.symbol.datawedge.data_string":"4006381333931"}}
/// ```
///
/// `extras` defaults to an empty map when absent so a minimal
/// `{"action":"..."}` datagram still deserializes; the listener then applies
/// its missing-payload degradation (empty-string scan).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBroadcast {
    /// The message kind. Compared for exact equality against the configured
    /// scan action; a mismatch means "not for us", not an error.
    pub action: String,

    /// String-keyed payload map. The decoded barcode content is expected
    /// under the configured payload key (see [`DEFAULT_PAYLOAD_KEY`]).
    #[serde(default)]
    pub extras: HashMap<String, String>,
}

impl ScanBroadcast {
    /// Convenience constructor for a broadcast carrying a single extra.
    ///
    /// Mostly used by tests and by driver-shim tooling.
    pub fn with_extra(
        action: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut extras = HashMap::new();
        extras.insert(key.into(), value.into());
        Self {
            action: action.into(),
            extras,
        }
    }

    /// Returns the extra stored under `key`, if present.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
