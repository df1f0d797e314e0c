//! The scan listener use case: broadcast in, state update out.
//!
//! The listener is registered for exactly one broadcast action. For every
//! delivered broadcast it applies three rules, in order:
//!
//! 1. **Action filter** – a broadcast whose action differs from the
//!    configured scan action is ignored silently (trace log only). Shared
//!    broadcast namespaces are noisy by nature; a mismatch is expected, not
//!    an error.
//! 2. **Payload extraction** – the decoded scan is read from the configured
//!    extra key. A matching broadcast *without* that extra degrades to an
//!    empty-string scan rather than failing: the driver layer is trusted to
//!    supply it under normal operation, and a blank scan is observable
//!    downstream while an error would not be.
//! 3. **Forward** – the (possibly empty) payload is written into the scan
//!    state. `ScanState::set` is lock-free publication; the broadcast
//!    delivery context is never blocked for a non-trivial duration.
//!
//! The listener is the *only* writer of the scan state.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use scan_core::{ScanBroadcast, ScanState};

use crate::domain::BridgeConfig;

/// Decodes scan broadcasts into scan-state updates.
pub struct ScanListener {
    scan_action: String,
    payload_key: String,
    state: Arc<ScanState>,
}

impl ScanListener {
    /// Creates a listener for the configured action/extra key writing into
    /// `state`.
    pub fn new(config: &BridgeConfig, state: Arc<ScanState>) -> Self {
        Self {
            scan_action: config.scan_action.clone(),
            payload_key: config.payload_key.clone(),
            state,
        }
    }

    /// Handles one delivered broadcast.
    ///
    /// Fire-and-forget: never blocks, never errors. See the module docs for
    /// the three rules applied here.
    pub fn on_broadcast(&self, broadcast: &ScanBroadcast) {
        if broadcast.action != self.scan_action {
            trace!(action = %broadcast.action, "ignoring non-scan broadcast");
            return;
        }

        let payload = match broadcast.extra(&self.payload_key) {
            Some(payload) => payload.to_owned(),
            None => {
                // Missing-payload degradation: store "", never raise.
                debug!(key = %self.payload_key, "scan broadcast without payload extra; storing empty scan");
                String::new()
            }
        };

        debug!(len = payload.len(), "scan received");
        self.state.set(payload);
    }

    /// Spawns the delivery loop: drains `broadcasts` until the channel
    /// closes (source stopped), applying [`on_broadcast`] to each message.
    ///
    /// [`on_broadcast`]: ScanListener::on_broadcast
    pub fn spawn(self, mut broadcasts: UnboundedReceiver<ScanBroadcast>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(broadcast) = broadcasts.recv().await {
                self.on_broadcast(&broadcast);
            }
            debug!("broadcast channel closed; scan listener stopping");
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
