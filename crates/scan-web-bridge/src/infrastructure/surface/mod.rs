//! Content surface infrastructure: where the emitted scripts go.
//!
//! The content surface is the embedded web-rendering component hosting the
//! remote page. The bridge only ever *submits script statements* to it —
//! fire-and-forget, no result consumed — so the seam is a single-method
//! trait. The production implementation is the WebSocket surface in [`ws`]
//! (the hosted page connects back to the shell and evaluates each received
//! frame); tests use [`RecordingSurface`].
//!
//! # Failure semantics
//!
//! `submit_script` is infallible by contract. Submitting to a surface whose
//! page is gone, not yet attached, or torn down is a silently-absorbed
//! no-op (logged at debug level): a missed scan is lower-cost than a crash
//! during active scanning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

pub mod ws;

pub use ws::WsSurface;

/// Trait abstracting script submission into the hosted page.
///
/// The production implementation is [`WsSurface`]; tests use
/// [`RecordingSurface`].
#[async_trait]
pub trait ContentSurface: Send + Sync {
    /// Submits one JavaScript statement for execution in the page.
    ///
    /// Fire-and-forget: no result is returned and failures never propagate.
    async fn submit_script(&self, script: &str);
}

/// A test double that records every submitted script.
///
/// Also models the dangling-sink case: after [`tear_down`], submissions are
/// absorbed without being recorded, matching the destroyed-surface no-op
/// contract.
///
/// [`tear_down`]: RecordingSurface::tear_down
pub struct RecordingSurface {
    scripts: Mutex<Vec<String>>,
    torn_down: AtomicBool,
}

impl RecordingSurface {
    /// Creates an attached, empty recording surface.
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Returns a copy of every script submitted so far, in order.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().expect("lock poisoned").clone()
    }

    /// Simulates the surface being destroyed; later submissions become
    /// no-ops.
    pub fn tear_down(&self) {
        self.torn_down.store(true, Ordering::Relaxed);
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentSurface for RecordingSurface {
    async fn submit_script(&self, script: &str) {
        if self.torn_down.load(Ordering::Relaxed) {
            debug!("surface torn down; script dropped");
            return;
        }
        self.scripts.lock().expect("lock poisoned").push(script.to_owned());
    }
}
