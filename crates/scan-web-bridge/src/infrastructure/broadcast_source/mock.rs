//! Mock broadcast source for unit testing.
//!
//! Allows tests to inject synthetic [`ScanBroadcast`]s without binding any
//! sockets.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedSender};

use scan_core::ScanBroadcast;

use super::{BroadcastError, BroadcastSource};

/// A mock implementation of [`BroadcastSource`] that allows tests to inject
/// broadcasts.
pub struct MockBroadcastSource {
    sender: Arc<Mutex<Option<UnboundedSender<ScanBroadcast>>>>,
}

impl MockBroadcastSource {
    /// Creates a new mock broadcast source.
    pub fn new() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
        }
    }

    /// Injects a synthetic broadcast, as if delivered by the OS.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been
    /// called.
    pub fn inject_broadcast(&self, broadcast: ScanBroadcast) {
        let guard = self.sender.lock().expect("lock poisoned");
        if let Some(ref sender) = *guard {
            sender
                .send(broadcast)
                .expect("receiver has been dropped; call start() first");
        } else {
            panic!("MockBroadcastSource::inject_broadcast called before start()");
        }
    }
}

impl Default for MockBroadcastSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BroadcastSource for MockBroadcastSource {
    async fn start(&self) -> Result<mpsc::UnboundedReceiver<ScanBroadcast>, BroadcastError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }
}
