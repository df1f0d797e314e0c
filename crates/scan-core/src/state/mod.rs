//! The observable scan state holder.
//!
//! # What is the scan state? (for beginners)
//!
//! The pipeline needs a place where "the most recent scan" lives between the
//! moment the broadcast listener decodes it and the moment the bridge pushes
//! it into the page. That place is [`ScanState`]: a single optional slot
//! holding the latest payload. There is no queue and no history — a new scan
//! overwrites the previous one unconditionally.
//!
//! # Replay-latest subscriptions
//!
//! Observation is push-based. A new subscriber immediately receives the
//! current slot (so a bridge attached after a scan still sees it), then one
//! emission per subsequent change. This is built on `tokio::sync::watch`,
//! which is exactly a single-slot broadcast channel with safe publication
//! between threads.
//!
//! # Why the revision counter?
//!
//! A shopper scanning the same barcode twice is two distinct events, so two
//! consecutive `set` calls with the same payload must produce two distinct
//! notifications. A change primitive that compares values would coalesce
//! them. The slot therefore carries a monotonically increasing `revision`
//! that is bumped on every mutation: the stored value is always observably
//! different from the previous one, and subscribers can additionally use the
//! counter to detect skipped revisions (a slow subscriber only ever sees the
//! newest slot — that is the single-slot design, not a bug).
//!
//! # Concurrency
//!
//! `set`/`clear` are called from the broadcast-delivery task while
//! subscribers run on other tasks. `watch::Sender` publishes atomically, so
//! single-writer/multi-reader access needs no further locking. All mutation
//! methods take `&self`; the holder is shared by reference (`Arc<ScanState>`),
//! never copied.

use thiserror::Error;
use tokio::sync::watch;
use tracing::trace;

/// A snapshot of the scan state at one point in time.
///
/// `revision` starts at 0 for the initial empty slot and increments by one
/// on every [`ScanState::set`] or [`ScanState::clear`]. `payload` is `None`
/// when no scan has happened yet or the slot was explicitly cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSlot {
    /// Mutation counter; strictly increases across the holder's lifetime
    /// (wrapping at `u64::MAX`, which is unreachable in practice).
    pub revision: u64,
    /// The latest scan payload, or `None` for "no scan yet / cleared".
    pub payload: Option<String>,
}

impl ScanSlot {
    /// The initial slot: revision 0, no payload.
    fn empty() -> Self {
        Self {
            revision: 0,
            payload: None,
        }
    }
}

/// Error returned by [`ScanSubscription::recv`] once the owning
/// [`ScanState`] has been dropped and no further emissions can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scan state holder has been dropped")]
pub struct StateClosed;

/// Process-wide observable single-slot store for the most recent scan.
///
/// Constructed once by the owning coordinator and shared by reference with
/// the broadcast listener (writer) and the bridge sink (reader). Dropping
/// the holder closes all subscriptions.
///
/// # Examples
///
/// ```rust
/// # tokio_test::block_on(async {
/// use scan_core::ScanState;
///
/// let state = ScanState::new();
/// let mut sub = state.subscribe();
///
/// // Replay-latest: the first recv returns the current (empty) slot.
/// let initial = sub.recv().await.unwrap();
/// assert_eq!(initial.payload, None);
///
/// state.set("012345678905");
/// let slot = sub.recv().await.unwrap();
/// assert_eq!(slot.payload.as_deref(), Some("012345678905"));
/// # });
/// ```
#[derive(Debug)]
pub struct ScanState {
    tx: watch::Sender<ScanSlot>,
}

impl ScanState {
    /// Creates an empty holder (revision 0, no payload).
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ScanSlot::empty());
        Self { tx }
    }

    /// Stores `payload` as the current scan and notifies all subscribers.
    ///
    /// Always notifies, even when `payload` equals the previous value — the
    /// revision bump guarantees the stored slot differs. Never blocks and
    /// never fails; with zero subscribers the value is simply stored.
    pub fn set(&self, payload: impl Into<String>) {
        let payload = payload.into();
        // send_modify publishes unconditionally; it does not require a live
        // receiver (unlike watch::Sender::send).
        self.tx.send_modify(|slot| {
            slot.revision = slot.revision.wrapping_add(1);
            slot.payload = Some(payload);
        });
        trace!(revision = self.revision(), "scan slot updated");
    }

    /// Resets the slot to "no scan" and notifies all subscribers.
    pub fn clear(&self) {
        self.tx.send_modify(|slot| {
            slot.revision = slot.revision.wrapping_add(1);
            slot.payload = None;
        });
        trace!(revision = self.revision(), "scan slot cleared");
    }

    /// Returns a copy of the current payload without subscribing.
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().payload.clone()
    }

    /// Returns the current revision counter. Useful for diagnostics.
    pub fn revision(&self) -> u64 {
        self.tx.borrow().revision
    }

    /// Creates a new subscription with replay-latest semantics.
    ///
    /// The first [`ScanSubscription::recv`] returns the current slot
    /// immediately; each later call waits for the next change.
    pub fn subscribe(&self) -> ScanSubscription {
        ScanSubscription {
            rx: self.tx.subscribe(),
            replayed: false,
        }
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of a [`ScanState`].
///
/// Obtained from [`ScanState::subscribe`]. Dropping the subscription revokes
/// it; the holder keeps working for other subscribers.
#[derive(Debug)]
pub struct ScanSubscription {
    rx: watch::Receiver<ScanSlot>,
    /// Whether the initial replay emission has been delivered yet.
    replayed: bool,
}

impl ScanSubscription {
    /// Waits for the next emission.
    ///
    /// The first call returns the current slot immediately (replay-latest);
    /// subsequent calls return once the slot has changed. Returns
    /// [`StateClosed`] after the owning [`ScanState`] has been dropped and
    /// every pending change has been delivered.
    pub async fn recv(&mut self) -> Result<ScanSlot, StateClosed> {
        if !self.replayed {
            self.replayed = true;
            // borrow_and_update marks the current value as seen, so the next
            // call waits for a genuinely newer revision instead of replaying.
            return Ok(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.map_err(|_| StateClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Returns the current slot without waiting or consuming a notification.
    pub fn peek(&self) -> ScanSlot {
        self.rx.borrow().clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_new_holder_is_empty_at_revision_zero() {
        // Arrange / Act
        let state = ScanState::new();

        // Assert
        assert_eq!(state.current(), None);
        assert_eq!(state.revision(), 0);
    }

    #[tokio::test]
    async fn test_set_overwrites_previous_value() {
        // Arrange
        let state = ScanState::new();

        // Act
        state.set("first");
        state.set("second");

        // Assert – single slot, no history
        assert_eq!(state.current().as_deref(), Some("second"));
        assert_eq!(state.revision(), 2);
    }

    #[tokio::test]
    async fn test_clear_resets_to_absent() {
        // Arrange
        let state = ScanState::new();
        state.set("012345678905");

        // Act
        state.clear();

        // Assert – cleared is a real mutation, not a rollback to revision 0
        assert_eq!(state.current(), None);
        assert_eq!(state.revision(), 2);
    }

    #[tokio::test]
    async fn test_subscriber_receives_current_value_immediately() {
        // Arrange: the scan happens before anyone subscribes
        let state = ScanState::new();
        state.set("replayed");

        // Act
        let mut sub = state.subscribe();
        let slot = sub.recv().await.unwrap();

        // Assert – replay-latest
        assert_eq!(slot.payload.as_deref(), Some("replayed"));
        assert_eq!(slot.revision, 1);
    }

    #[tokio::test]
    async fn test_subscriber_receives_initial_empty_slot() {
        // Even an untouched holder replays its (empty) slot.
        let state = ScanState::new();
        let mut sub = state.subscribe();

        let slot = sub.recv().await.unwrap();
        assert_eq!(slot.payload, None);
        assert_eq!(slot.revision, 0);
    }

    #[tokio::test]
    async fn test_identical_consecutive_sets_notify_twice() {
        // Arrange
        let state = ScanState::new();
        let mut sub = state.subscribe();
        let _initial = sub.recv().await.unwrap();

        // Act: the same barcode scanned twice in a row
        state.set("4006381333931");
        let first = sub.recv().await.unwrap();
        state.set("4006381333931");
        let second = sub.recv().await.unwrap();

        // Assert – two distinct emissions despite equal payloads
        assert_eq!(first.payload, second.payload);
        assert_eq!(first.revision, 1);
        assert_eq!(second.revision, 2);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_all_observe_changes() {
        // Arrange
        let state = ScanState::new();
        let mut a = state.subscribe();
        let mut b = state.subscribe();
        let _ = a.recv().await.unwrap();
        let _ = b.recv().await.unwrap();

        // Act
        state.set("shared");

        // Assert – observation is independent per subscriber
        assert_eq!(a.recv().await.unwrap().payload.as_deref(), Some("shared"));
        assert_eq!(b.recv().await.unwrap().payload.as_deref(), Some("shared"));
    }

    #[tokio::test]
    async fn test_recv_returns_closed_after_holder_drop() {
        // Arrange
        let state = ScanState::new();
        let mut sub = state.subscribe();
        let _ = sub.recv().await.unwrap();

        // Act
        drop(state);

        // Assert
        assert_eq!(sub.recv().await, Err(StateClosed));
    }

    #[tokio::test]
    async fn test_pending_change_is_delivered_before_closed() {
        // A set immediately followed by the holder being dropped must still
        // reach the subscriber (graceful drain, then StateClosed).
        let state = ScanState::new();
        let mut sub = state.subscribe();
        let _ = sub.recv().await.unwrap();

        state.set("last-words");
        drop(state);

        assert_eq!(
            sub.recv().await.unwrap().payload.as_deref(),
            Some("last-words")
        );
        assert_eq!(sub.recv().await, Err(StateClosed));
    }

    #[tokio::test]
    async fn test_set_from_another_task_is_observed() {
        // Arrange: writer on a separate task, as in production (broadcast
        // delivery context vs. rendering context).
        let state = Arc::new(ScanState::new());
        let mut sub = state.subscribe();
        let _ = sub.recv().await.unwrap();

        // Act
        let writer = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            writer.set("cross-task");
        });
        handle.await.unwrap();

        // Assert
        assert_eq!(
            sub.recv().await.unwrap().payload.as_deref(),
            Some("cross-task")
        );
    }

    #[tokio::test]
    async fn test_peek_does_not_consume_notifications() {
        let state = ScanState::new();
        let mut sub = state.subscribe();
        let _ = sub.recv().await.unwrap();

        state.set("peeked");

        // peek sees the new slot...
        assert_eq!(sub.peek().payload.as_deref(), Some("peeked"));
        // ...and recv still delivers it as an emission.
        assert_eq!(sub.recv().await.unwrap().payload.as_deref(), Some("peeked"));
    }

    #[tokio::test]
    async fn test_empty_string_payload_is_present_not_absent() {
        // The missing-extra degradation stores "", which must be observable
        // as a real value distinct from "no scan".
        let state = ScanState::new();
        state.set("");

        assert_eq!(state.current().as_deref(), Some(""));
    }
}
