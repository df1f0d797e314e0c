//! Loopback UDP broadcast ingress.
//!
//! The driver-layer shim publishes each scan broadcast as exactly one UDP
//! datagram containing a JSON-encoded [`ScanBroadcast`]:
//!
//! ```json
//! {"action":"com.scanbridge.SCAN","extras":{"com.symbol.datawedge.data_string":"012345678905"}}
//! ```
//!
//! One datagram, one broadcast — no framing, no fragmentation concerns at
//! scan-payload sizes, and loopback delivery preserves ordering. The receive
//! loop does nothing but decode and forward, so the delivery context is
//! never blocked by downstream work.

use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use scan_core::ScanBroadcast;

use super::{BroadcastError, BroadcastSource};

/// Maximum UDP payload; a datagram larger than this cannot exist.
const MAX_DATAGRAM: usize = 65_535;

/// Production broadcast source: binds a UDP socket and decodes one JSON
/// broadcast per datagram.
pub struct UdpBroadcastSource {
    bind_addr: SocketAddr,
    /// The actually-bound address, available after `start()`. Differs from
    /// `bind_addr` when port 0 was requested (tests).
    local_addr: Mutex<Option<SocketAddr>>,
    /// The receive-loop task, held so `stop()` can cancel it.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl UdpBroadcastSource {
    /// Creates a source that will bind `bind_addr` when started.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            local_addr: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Returns the bound address once `start()` has succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().expect("lock poisoned")
    }
}

#[async_trait]
impl BroadcastSource for UdpBroadcastSource {
    async fn start(&self) -> Result<mpsc::UnboundedReceiver<ScanBroadcast>, BroadcastError> {
        if self.task.lock().expect("lock poisoned").is_some() {
            return Err(BroadcastError::AlreadyStarted);
        }

        let socket = UdpSocket::bind(self.bind_addr)
            .await
            .map_err(|source| BroadcastError::BindFailed {
                addr: self.bind_addr,
                source,
            })?;
        let local = socket.local_addr().map_err(|source| BroadcastError::BindFailed {
            addr: self.bind_addr,
            source,
        })?;
        *self.local_addr.lock().expect("lock poisoned") = Some(local);
        info!("broadcast ingress listening on udp://{local}");

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                let (len, peer) = match socket.recv_from(&mut buf).await {
                    Ok(received) => received,
                    Err(e) => {
                        // Transient receive errors (e.g., ICMP-induced) are
                        // logged and the loop keeps going.
                        debug!("broadcast socket receive error: {e}");
                        continue;
                    }
                };

                match serde_json::from_slice::<ScanBroadcast>(&buf[..len]) {
                    Ok(broadcast) => {
                        if tx.send(broadcast).is_err() {
                            // Receiver gone — the pipeline has shut down.
                            debug!("broadcast channel closed; stopping receive loop");
                            break;
                        }
                    }
                    Err(e) => {
                        // Best-effort policy: a malformed datagram is dropped,
                        // never escalated.
                        debug!("dropping malformed broadcast datagram from {peer}: {e}");
                    }
                }
            }
        });
        *self.task.lock().expect("lock poisoned") = Some(handle);

        Ok(rx)
    }

    fn stop(&self) {
        if let Some(handle) = self.task.lock().expect("lock poisoned").take() {
            handle.abort();
            info!("broadcast ingress stopped");
        }
    }
}

impl Drop for UdpBroadcastSource {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
