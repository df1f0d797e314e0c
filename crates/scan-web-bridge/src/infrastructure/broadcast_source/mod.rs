//! Broadcast ingress infrastructure for the scan bridge.
//!
//! The scanner's driver layer publishes each decoded scan as a broadcast
//! message. In production the bridge receives these as JSON datagrams on a
//! loopback UDP socket (see [`udp`]); tests inject synthetic broadcasts
//! through [`mock::MockBroadcastSource`].
//!
//! # Delivery contract
//!
//! Delivery is fire-and-forget and in-order per sender (UDP on loopback
//! preserves ordering in practice; the single receive loop preserves it
//! downstream). The source performs no filtering: *every* well-formed
//! broadcast is forwarded, and the application-layer listener decides which
//! actions matter. Malformed datagrams are dropped with a debug log —
//! expected noise, not an error.
//!
//! # Lifecycle
//!
//! `start()` registers the source with the OS (binds the socket) and hands
//! back the event channel; `stop()` deregisters it and releases the socket.
//! The coordinator calls these at the foreground/background edges of the
//! shell's lifecycle.

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::sync::mpsc;

use scan_core::ScanBroadcast;

pub mod mock;
pub mod udp;

pub use mock::MockBroadcastSource;
pub use udp::UdpBroadcastSource;

/// Error type for broadcast ingress operations.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The ingress socket could not be bound (port in use, no permission).
    #[error("failed to bind broadcast socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// `start()` was called twice without an intervening `stop()`.
    #[error("broadcast source has already been started")]
    AlreadyStarted,
}

/// Trait abstracting broadcast message production.
///
/// The production implementation is [`UdpBroadcastSource`]; tests use
/// [`MockBroadcastSource`].
#[async_trait]
pub trait BroadcastSource: Send + Sync {
    /// Starts the source and returns a receiver for incoming broadcasts.
    ///
    /// The channel is unbounded: the broadcast-delivery context must never
    /// block, and scans are human-paced, so backpressure is not a concern.
    async fn start(&self) -> Result<mpsc::UnboundedReceiver<ScanBroadcast>, BroadcastError>;

    /// Stops the source and releases all OS resources.
    ///
    /// Idempotent; stopping an already-stopped source is a no-op.
    fn stop(&self);
}
