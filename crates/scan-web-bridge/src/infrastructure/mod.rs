//! Infrastructure layer for the scan bridge.
//!
//! Contains the OS-facing adapters — broadcast ingress sockets and the
//! WebSocket content surface — plus the coordinator that owns the pipeline.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain`,
//! and `scan_core`, but its concrete adapters MUST NOT be imported by the
//! application or domain layers (the traits at the seams are the only
//! exception).

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use scan_core::ScanState;

use crate::application::{ScanListener, ScriptSink};
use crate::domain::BridgeConfig;

pub mod broadcast_source;
pub mod surface;

pub use broadcast_source::{BroadcastSource, MockBroadcastSource, UdpBroadcastSource};
pub use surface::{ContentSurface, RecordingSurface, WsSurface};

/// Runs the scan pipeline until `running` is set to `false`.
///
/// The coordinator owns the two shared resources — the scan state holder
/// and the content surface — and passes references to the pipeline tasks
/// (explicit ownership, no ambient globals):
///
/// 1. Binds the content surface listener and the broadcast ingress socket.
/// 2. Spawns the scan listener task (the state holder's single writer).
/// 3. Spawns the script sink task (subscribed with replay-latest).
/// 4. Polls the shutdown flag every 200 ms.
///
/// # Teardown order
///
/// Source first (no new broadcasts), then the listener and sink tasks
/// (subscription revoked), then the surface (pages detached). After the
/// sink task is gone, later state changes can no longer reach the surface.
///
/// # Errors
///
/// Returns an error only if one of the two listeners cannot be bound;
/// everything after startup degrades gracefully instead of failing.
pub async fn run_bridge(config: BridgeConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    // The single shared mutable resource of the pipeline.
    let state = Arc::new(ScanState::new());

    let surface = WsSurface::bind(config.surface_bind_addr)
        .await
        .context("content surface startup failed")?;
    info!(
        "hosted page {} is expected to attach at ws://{}",
        config.page_url,
        surface.local_addr()
    );

    let source = UdpBroadcastSource::new(config.broadcast_bind_addr);
    let broadcasts = source
        .start()
        .await
        .context("broadcast ingress startup failed")?;

    let listener_task = ScanListener::new(&config, Arc::clone(&state)).spawn(broadcasts);
    let sink_task = ScriptSink::new(
        config.callback.clone(),
        Arc::clone(&surface) as Arc<dyn ContentSurface>,
    )
    .spawn(state.subscribe());

    info!("scan pipeline running");
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    info!("shutdown flag cleared; tearing down scan pipeline");
    source.stop();
    listener_task.abort();
    sink_task.abort();
    surface.shutdown().await;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
