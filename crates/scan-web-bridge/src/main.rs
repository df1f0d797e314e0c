//! Scan-To-Web bridge — entry point.
//!
//! This binary receives hardware barcode-scan broadcasts (JSON datagrams on
//! a loopback UDP socket, published by the scanner's driver shim) and pushes
//! each decoded payload into a hosted web page as a guarded JavaScript
//! callback invocation — no server round trip involved.
//!
//! # Why a bridge process?
//!
//! The web page cannot subscribe to OS broadcast messages, and the scanner
//! driver cannot execute JavaScript. This bridge sits between the two: it
//! filters the broadcast channel for scan messages, keeps the latest scan in
//! an observable slot, and submits
//! `if (window.onBarcodeScanned) window.onBarcodeScanned('<payload>');` into
//! the page for every scan.
//!
//! # Usage
//!
//! ```text
//! scan-web-bridge [OPTIONS]
//!
//! Options:
//!   --broadcast-port <PORT>  Broadcast ingress UDP port [default: 24810]
//!   --surface-port   <PORT>  Content surface WebSocket port [default: 24813]
//!   --page-url       <URL>   Remote page the surface hosts
//!   --scan-action    <ID>    Broadcast action treated as a scan
//!   --payload-key    <KEY>   Extra key holding the decoded payload
//!   --callback       <NAME>  Page-global callback to invoke
//! ```
//!
//! # Environment variable overrides
//!
//! The CLI defaults can also be overridden with environment variables.
//! CLI args take precedence when both are present.
//!
//! | Variable                     | Default                              |
//! |------------------------------|--------------------------------------|
//! | `SCANBRIDGE_BROADCAST_PORT`  | `24810`                              |
//! | `SCANBRIDGE_BROADCAST_BIND`  | `127.0.0.1`                          |
//! | `SCANBRIDGE_SURFACE_PORT`    | `24813`                              |
//! | `SCANBRIDGE_SURFACE_BIND`    | `127.0.0.1`                          |
//! | `SCANBRIDGE_PAGE_URL`        | `https://scan.example.com/`          |
//! | `SCANBRIDGE_SCAN_ACTION`     | `com.scanbridge.SCAN`                |
//! | `SCANBRIDGE_PAYLOAD_KEY`     | `com.symbol.datawedge.data_string`   |
//! | `SCANBRIDGE_CALLBACK`        | `window.onBarcodeScanned`            |
//!
//! # Architecture overview
//!
//! ```text
//! Scanner driver shim  (JSON datagrams over loopback UDP)
//!       ↓
//! scan-web-bridge  ← this process
//!   domain/         BridgeConfig
//!   application/    scan listener → scan state → script sink
//!   infrastructure/
//!     broadcast_source/  UDP ingress
//!     surface/           WebSocket content surface
//!       ↓
//! Hosted web page  (evaluates each received script frame)
//! ```

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scan_web_bridge::domain::BridgeConfig;
use scan_web_bridge::infrastructure::run_bridge;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Scan-To-Web bridge.
///
/// Receives barcode-scan broadcasts and pushes them into a hosted web page
/// as JavaScript callback invocations.
///
/// The `#[derive(Parser)]` macro from `clap` generates the argument parser
/// automatically from the struct fields and their `#[arg(...)]` attributes.
#[derive(Debug, Parser)]
#[command(
    name = "scan-web-bridge",
    about = "Broadcast-to-WebView bridge for hardware barcode scanners",
    version
)]
struct Cli {
    /// UDP port for the broadcast ingress to listen on.
    ///
    /// The scanner driver shim sends scan broadcasts to this port.
    #[arg(long, default_value_t = 24810, env = "SCANBRIDGE_BROADCAST_PORT")]
    broadcast_port: u16,

    /// IP address to bind the broadcast ingress to.
    ///
    /// Broadcasts are a same-machine concern; keep this on loopback unless
    /// the driver shim runs on another host.
    #[arg(long, default_value = "127.0.0.1", env = "SCANBRIDGE_BROADCAST_BIND")]
    broadcast_bind: String,

    /// TCP port for the content-surface WebSocket listener.
    ///
    /// The hosted page connects to this port (ws://host:PORT) and evaluates
    /// each received frame.
    #[arg(long, default_value_t = 24813, env = "SCANBRIDGE_SURFACE_PORT")]
    surface_port: u16,

    /// IP address to bind the content-surface listener to.
    #[arg(long, default_value = "127.0.0.1", env = "SCANBRIDGE_SURFACE_BIND")]
    surface_bind: String,

    /// Remote address the content surface is pointed at on startup.
    #[arg(
        long,
        default_value = "https://scan.example.com/",
        env = "SCANBRIDGE_PAGE_URL"
    )]
    page_url: String,

    /// Broadcast action treated as a scan; everything else is ignored.
    #[arg(
        long,
        default_value = "com.scanbridge.SCAN",
        env = "SCANBRIDGE_SCAN_ACTION"
    )]
    scan_action: String,

    /// Extra key under which the driver places the decoded payload.
    #[arg(
        long,
        default_value = "com.symbol.datawedge.data_string",
        env = "SCANBRIDGE_PAYLOAD_KEY"
    )]
    payload_key: String,

    /// Page-global callback invoked with each scan payload.
    #[arg(
        long,
        default_value = "window.onBarcodeScanned",
        env = "SCANBRIDGE_CALLBACK"
    )]
    callback: String,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`BridgeConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--broadcast-bind` or `--surface-bind` is not a
    /// valid IP address, or if the resulting socket address string cannot be
    /// parsed.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        let broadcast_bind_addr: SocketAddr =
            format!("{}:{}", self.broadcast_bind, self.broadcast_port)
                .parse()
                .with_context(|| {
                    format!(
                        "invalid broadcast bind address: '{}:{}'",
                        self.broadcast_bind, self.broadcast_port
                    )
                })?;

        let surface_bind_addr: SocketAddr = format!("{}:{}", self.surface_bind, self.surface_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid surface bind address: '{}:{}'",
                    self.surface_bind, self.surface_port
                )
            })?;

        Ok(BridgeConfig {
            broadcast_bind_addr,
            surface_bind_addr,
            page_url: self.page_url,
            scan_action: self.scan_action,
            payload_key: self.payload_key,
            callback: self.callback,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// The `#[tokio::main]` attribute sets up the Tokio multi-threaded async
/// runtime. All async tasks (broadcast ingress, page sessions, the pipeline
/// tasks) run on this runtime's thread pool.
///
/// # What happens at startup
///
/// 1. `tracing_subscriber` is initialised; the log level is controlled by
///    the `RUST_LOG` environment variable (e.g., `RUST_LOG=debug`).
/// 2. CLI arguments are parsed with `clap` into a [`Cli`] struct.
/// 3. A [`BridgeConfig`] is constructed from the CLI arguments.
/// 4. A Ctrl+C handler is spawned; it clears a shared `AtomicBool` when the
///    user presses Ctrl+C.
/// 5. [`run_bridge`] wires the pipeline and runs until the flag clears.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `EnvFilter::try_from_default_env()` reads the `RUST_LOG` environment
    // variable. If it is absent or invalid, fall back to `info` level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_bridge_config()?;

    info!(
        "Scan-To-Web bridge starting — broadcast={}, surface={}",
        config.broadcast_bind_addr, config.surface_bind_addr
    );

    // Graceful shutdown flag, checked by the coordinator every 200 ms.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_bridge(config, running).await?;

    info!("Scan-To-Web bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_produce_correct_broadcast_port() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["scan-web-bridge"]);

        // Assert
        assert_eq!(cli.broadcast_port, 24810);
    }

    #[test]
    fn test_cli_defaults_produce_correct_surface_port() {
        let cli = Cli::parse_from(["scan-web-bridge"]);
        assert_eq!(cli.surface_port, 24813);
    }

    #[test]
    fn test_cli_defaults_produce_correct_scan_action() {
        let cli = Cli::parse_from(["scan-web-bridge"]);
        assert_eq!(cli.scan_action, "com.scanbridge.SCAN");
    }

    #[test]
    fn test_cli_defaults_produce_correct_callback() {
        let cli = Cli::parse_from(["scan-web-bridge"]);
        assert_eq!(cli.callback, "window.onBarcodeScanned");
    }

    #[test]
    fn test_cli_broadcast_port_override() {
        let cli = Cli::parse_from(["scan-web-bridge", "--broadcast-port", "9999"]);
        assert_eq!(cli.broadcast_port, 9999);
    }

    #[test]
    fn test_cli_surface_port_override() {
        let cli = Cli::parse_from(["scan-web-bridge", "--surface-port", "8080"]);
        assert_eq!(cli.surface_port, 8080);
    }

    #[test]
    fn test_cli_scan_action_override() {
        let cli = Cli::parse_from(["scan-web-bridge", "--scan-action", "vendor.SCANNED"]);
        assert_eq!(cli.scan_action, "vendor.SCANNED");
    }

    #[test]
    fn test_cli_page_url_override() {
        let cli = Cli::parse_from(["scan-web-bridge", "--page-url", "https://pos.local/"]);
        assert_eq!(cli.page_url, "https://pos.local/");
    }

    #[test]
    fn test_into_bridge_config_default_ports() {
        // Arrange
        let cli = Cli::parse_from(["scan-web-bridge"]);

        // Act
        let config = cli.into_bridge_config().unwrap();

        // Assert
        assert_eq!(config.broadcast_bind_addr.port(), 24810);
        assert_eq!(config.surface_bind_addr.port(), 24813);
    }

    #[test]
    fn test_into_bridge_config_binds_loopback_by_default() {
        let cli = Cli::parse_from(["scan-web-bridge"]);
        let config = cli.into_bridge_config().unwrap();
        assert!(config.broadcast_bind_addr.ip().is_loopback());
        assert!(config.surface_bind_addr.ip().is_loopback());
    }

    #[test]
    fn test_into_bridge_config_custom_surface_bind() {
        let cli = Cli::parse_from([
            "scan-web-bridge",
            "--surface-bind",
            "0.0.0.0",
            "--surface-port",
            "9000",
        ]);
        let config = cli.into_bridge_config().unwrap();
        assert_eq!(config.surface_bind_addr.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_into_bridge_config_invalid_broadcast_bind_returns_error() {
        // Arrange: provide an invalid IP address string
        let cli = Cli {
            broadcast_port: 24810,
            broadcast_bind: "not.an.ip".to_string(),
            surface_port: 24813,
            surface_bind: "127.0.0.1".to_string(),
            page_url: "https://scan.example.com/".to_string(),
            scan_action: "com.scanbridge.SCAN".to_string(),
            payload_key: "com.symbol.datawedge.data_string".to_string(),
            callback: "window.onBarcodeScanned".to_string(),
        };

        // Act
        let result = cli.into_bridge_config();

        // Assert: must return an error, not panic
        assert!(result.is_err());
    }

    #[test]
    fn test_into_bridge_config_invalid_surface_bind_returns_error() {
        let cli = Cli {
            broadcast_port: 24810,
            broadcast_bind: "127.0.0.1".to_string(),
            surface_port: 24813,
            surface_bind: "not.an.ip".to_string(),
            page_url: "https://scan.example.com/".to_string(),
            scan_action: "com.scanbridge.SCAN".to_string(),
            payload_key: "com.symbol.datawedge.data_string".to_string(),
            callback: "window.onBarcodeScanned".to_string(),
        };

        let result = cli.into_bridge_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_into_bridge_config_preserves_identifier_strings() {
        let cli = Cli::parse_from([
            "scan-web-bridge",
            "--payload-key",
            "vendor.data",
            "--callback",
            "window.onScan",
        ]);
        let config = cli.into_bridge_config().unwrap();
        assert_eq!(config.payload_key, "vendor.data");
        assert_eq!(config.callback, "window.onScan");
    }
}
