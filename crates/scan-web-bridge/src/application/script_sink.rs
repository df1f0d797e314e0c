//! The script sink use case: scan state in, script submission out.
//!
//! The sink holds a subscription to the scan state and, for every emitted
//! slot whose payload is present — including the replayed initial one —
//! builds the guarded callback invocation and submits it to the content
//! surface. Absent slots (no scan yet, or an explicit clear) produce no
//! submission.
//!
//! # Ordering and lifetime
//!
//! Emissions are processed one at a time on a single task, so scripts reach
//! the surface in emission order. The loop ends when the state holder is
//! dropped; aborting the task (coordinator teardown) revokes the
//! subscription, after which no further submissions can occur.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use scan_core::{callback_invocation, ScanSlot, ScanSubscription};

use crate::infrastructure::surface::ContentSurface;

/// Forwards scan-state emissions into the content surface as guarded script
/// invocations.
pub struct ScriptSink {
    callback: String,
    surface: Arc<dyn ContentSurface>,
}

impl ScriptSink {
    /// Creates a sink invoking `callback` on `surface`.
    pub fn new(callback: impl Into<String>, surface: Arc<dyn ContentSurface>) -> Self {
        Self {
            callback: callback.into(),
            surface,
        }
    }

    /// Handles one emitted slot: absent payloads are skipped, present ones
    /// (empty string included) become exactly one script submission.
    pub async fn forward(&self, slot: &ScanSlot) {
        let Some(payload) = slot.payload.as_deref() else {
            // "No scan yet" / cleared — nothing to tell the page.
            return;
        };
        let script = callback_invocation(&self.callback, payload);
        debug!(revision = slot.revision, "submitting scan to content surface");
        self.surface.submit_script(&script).await;
    }

    /// Spawns the observation loop over `subscription`.
    ///
    /// Runs until the owning state holder is dropped, or until the returned
    /// handle is aborted (subscription revocation at teardown).
    pub fn spawn(self, mut subscription: ScanSubscription) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match subscription.recv().await {
                    Ok(slot) => self.forward(&slot).await,
                    Err(_) => {
                        debug!("scan state holder dropped; script sink stopping");
                        break;
                    }
                }
            }
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::surface::RecordingSurface;
    use scan_core::{ScanState, DEFAULT_CALLBACK};
    use std::time::Duration;

    /// Polls the recording surface until it holds `count` scripts.
    async fn wait_for_scripts(surface: &RecordingSurface, count: usize) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let scripts = surface.scripts();
            if scripts.len() >= count {
                return scripts;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} script(s); got {scripts:?}"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_present_payload_is_submitted_as_guarded_invocation() {
        // Arrange
        let surface = Arc::new(RecordingSurface::new());
        let sink = ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _);

        // Act
        sink.forward(&ScanSlot {
            revision: 1,
            payload: Some("012345678905".to_string()),
        })
        .await;

        // Assert
        assert_eq!(
            surface.scripts(),
            vec!["if (window.onBarcodeScanned) window.onBarcodeScanned('012345678905');"]
        );
    }

    #[tokio::test]
    async fn test_absent_payload_produces_no_submission() {
        // Arrange
        let surface = Arc::new(RecordingSurface::new());
        let sink = ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _);

        // Act
        sink.forward(&ScanSlot {
            revision: 0,
            payload: None,
        })
        .await;

        // Assert
        assert!(surface.scripts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_payload_invokes_callback_with_empty_string() {
        // Arrange: the missing-extra degradation produces "" — the page
        // still gets told a scan happened.
        let surface = Arc::new(RecordingSurface::new());
        let sink = ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _);

        // Act
        sink.forward(&ScanSlot {
            revision: 1,
            payload: Some(String::new()),
        })
        .await;

        // Assert
        assert_eq!(
            surface.scripts(),
            vec!["if (window.onBarcodeScanned) window.onBarcodeScanned('');"]
        );
    }

    #[tokio::test]
    async fn test_spawned_sink_replays_latest_value() {
        // Arrange: the scan happened before the sink attached
        let state = ScanState::new();
        state.set("replayed");
        let surface = Arc::new(RecordingSurface::new());
        let sink = ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _);

        // Act
        let handle = sink.spawn(state.subscribe());

        // Assert
        let scripts = wait_for_scripts(&surface, 1).await;
        assert_eq!(
            scripts,
            vec!["if (window.onBarcodeScanned) window.onBarcodeScanned('replayed');"]
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_spawned_sink_forwards_subsequent_scans_in_order() {
        // Arrange
        let state = ScanState::new();
        let surface = Arc::new(RecordingSurface::new());
        let handle =
            ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _).spawn(state.subscribe());

        // Act: paced sets so the single-slot store never coalesces
        state.set("first");
        wait_for_scripts(&surface, 1).await;
        state.set("second");
        let scripts = wait_for_scripts(&surface, 2).await;

        // Assert
        assert_eq!(
            scripts,
            vec![
                "if (window.onBarcodeScanned) window.onBarcodeScanned('first');",
                "if (window.onBarcodeScanned) window.onBarcodeScanned('second');"
            ]
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_identical_consecutive_scans_both_reach_the_surface() {
        // Arrange
        let state = ScanState::new();
        let surface = Arc::new(RecordingSurface::new());
        let handle =
            ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _).spawn(state.subscribe());

        // Act
        state.set("4006381333931");
        wait_for_scripts(&surface, 1).await;
        state.set("4006381333931");
        let scripts = wait_for_scripts(&surface, 2).await;

        // Assert – no accidental de-duplication
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0], scripts[1]);
        handle.abort();
    }

    #[tokio::test]
    async fn test_clear_produces_no_submission() {
        // Arrange
        let state = ScanState::new();
        let surface = Arc::new(RecordingSurface::new());
        let handle =
            ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _).spawn(state.subscribe());
        state.set("present");
        wait_for_scripts(&surface, 1).await;

        // Act
        state.clear();
        state.set("after-clear");

        // Assert – the clear emission is skipped, the next scan is not
        let scripts = wait_for_scripts(&surface, 2).await;
        assert_eq!(
            scripts[1],
            "if (window.onBarcodeScanned) window.onBarcodeScanned('after-clear');"
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_aborted_sink_submits_nothing_further() {
        // Arrange
        let state = ScanState::new();
        let surface = Arc::new(RecordingSurface::new());
        let handle =
            ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _).spawn(state.subscribe());
        state.set("before-teardown");
        wait_for_scripts(&surface, 1).await;

        // Act: revoke the subscription, then keep scanning
        handle.abort();
        let _ = handle.await; // wait until the task is really gone
        state.set("after-teardown");
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Assert – no further submissions after teardown
        assert_eq!(surface.scripts().len(), 1);
    }

    #[tokio::test]
    async fn test_sink_stops_when_state_holder_is_dropped() {
        // Arrange
        let state = ScanState::new();
        let surface = Arc::new(RecordingSurface::new());
        let handle =
            ScriptSink::new(DEFAULT_CALLBACK, Arc::clone(&surface) as _).spawn(state.subscribe());

        // Act
        drop(state);

        // Assert – the loop exits on its own (no abort needed)
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sink task should stop after holder drop")
            .unwrap();
    }
}
