//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or
//! from sensible defaults (useful for local development and tests).
//!
//! # Design rationale
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the domain) makes the bridge easy to embed in tests
//! and future shells. The binary entry point is responsible for populating
//! the struct from CLI args or environment variables.

use std::net::SocketAddr;

use scan_core::{DEFAULT_CALLBACK, DEFAULT_PAYLOAD_KEY, DEFAULT_SCAN_ACTION};

/// All runtime configuration for the scan bridge.
///
/// Build this struct once at startup (via CLI args or defaults); the
/// coordinator reads it when wiring the pipeline.
///
/// # Example
///
/// ```rust
/// use scan_web_bridge::domain::BridgeConfig;
///
/// // Defaults are suitable for local development:
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.broadcast_bind_addr.port(), 24810);
/// assert_eq!(cfg.callback, "window.onBarcodeScanned");
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// The address the broadcast ingress socket binds to.
    ///
    /// The scanner driver shim publishes scan broadcasts as JSON datagrams
    /// to this address. Loopback by default — the broadcast channel is a
    /// same-machine concern.
    pub broadcast_bind_addr: SocketAddr,

    /// The address the content-surface WebSocket listener binds to.
    ///
    /// The hosted page opens a WebSocket back to this address and evaluates
    /// each received text frame.
    pub surface_bind_addr: SocketAddr,

    /// The remote address the content surface is pointed at on startup.
    ///
    /// The bridge does not fetch this URL itself; it is handed to the shell
    /// that embeds the surface, and logged so operators can see which page
    /// is expected to attach.
    pub page_url: String,

    /// The broadcast action that identifies scan messages.
    ///
    /// Broadcasts with any other action are silently ignored — expected
    /// noise on a shared broadcast namespace, not an error.
    pub scan_action: String,

    /// The extra key under which the driver layer places the decoded
    /// payload. A matching broadcast without this extra degrades to an
    /// empty-string scan.
    pub payload_key: String,

    /// The page-global callback invoked with each scan payload.
    ///
    /// Kept `window.`-qualified so the emitted guard cannot raise a
    /// ReferenceError when the page has not defined it yet.
    pub callback: String,
}

impl Default for BridgeConfig {
    /// Returns a `BridgeConfig` suitable for local development without any
    /// external configuration.
    ///
    /// | Field               | Default                              |
    /// |---------------------|--------------------------------------|
    /// | broadcast_bind_addr | `127.0.0.1:24810`                    |
    /// | surface_bind_addr   | `127.0.0.1:24813`                    |
    /// | page_url            | `https://scan.example.com/`          |
    /// | scan_action         | `com.scanbridge.SCAN`                |
    /// | payload_key         | `com.symbol.datawedge.data_string`   |
    /// | callback            | `window.onBarcodeScanned`            |
    fn default() -> Self {
        Self {
            // The `.parse().unwrap()` calls here are safe because these are
            // compile-time-known valid socket address strings.
            broadcast_bind_addr: "127.0.0.1:24810".parse().unwrap(),
            surface_bind_addr: "127.0.0.1:24813".parse().unwrap(),
            page_url: "https://scan.example.com/".to_string(),
            scan_action: DEFAULT_SCAN_ACTION.to_string(),
            payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
            callback: DEFAULT_CALLBACK.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_broadcast_port_is_24810() {
        // Arrange / Act
        let cfg = BridgeConfig::default();
        // Assert
        assert_eq!(cfg.broadcast_bind_addr.port(), 24810);
    }

    #[test]
    fn test_default_surface_port_is_24813() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.surface_bind_addr.port(), 24813);
    }

    #[test]
    fn test_default_sockets_are_loopback_only() {
        // Neither edge should be reachable from the LAN out of the box.
        let cfg = BridgeConfig::default();
        assert!(cfg.broadcast_bind_addr.ip().is_loopback());
        assert!(cfg.surface_bind_addr.ip().is_loopback());
    }

    #[test]
    fn test_default_identifiers_match_well_known_constants() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.scan_action, DEFAULT_SCAN_ACTION);
        assert_eq!(cfg.payload_key, DEFAULT_PAYLOAD_KEY);
        assert_eq!(cfg.callback, DEFAULT_CALLBACK);
    }

    #[test]
    fn test_default_callback_is_window_qualified() {
        // The guard in the emitted script relies on property-lookup
        // semantics; a bare identifier would defeat it.
        let cfg = BridgeConfig::default();
        assert!(cfg.callback.starts_with("window."));
    }

    #[test]
    fn test_config_can_be_cloned() {
        // Cloneability is required so the coordinator can hand copies of the
        // relevant fields to each pipeline task.
        let cfg = BridgeConfig::default();
        let cloned = cfg.clone();
        assert_eq!(cfg.broadcast_bind_addr, cloned.broadcast_bind_addr);
        assert_eq!(cfg.scan_action, cloned.scan_action);
    }
}
