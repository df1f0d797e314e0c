//! WebSocket content surface: accept loop and per-session forwarding.
//!
//! The shell points its embedded web view at the configured remote page; the
//! page, in turn, opens a WebSocket back to this listener and evaluates
//! every text frame it receives:
//!
//! ```js
//! const bridge = new WebSocket("ws://127.0.0.1:24813");
//! bridge.onmessage = (frame) => eval(frame.data);
//! ```
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming connections and upgrading them to WebSocket.
//! 3. Registering each session so [`WsSurface::submit_script`] can fan
//!    submitted scripts out to every attached page (normally exactly one).
//! 4. Removing sessions when the page navigates away or the socket drops.
//!
//! # Why fire-and-forget?
//!
//! The bridge never reads a result back from the page. A submission with no
//! attached session, or to a session whose socket just died, is absorbed as
//! a no-op — the guard clause inside the script itself handles the
//! page-not-ready case on the far side.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex as StdMutex;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use uuid::Uuid;

use super::ContentSurface;

/// Sessions share the script sender map between the accept loop and
/// `submit_script`.
type SessionMap = Arc<Mutex<HashMap<Uuid, mpsc::UnboundedSender<String>>>>;

/// Production content surface: a WebSocket listener the hosted page attaches
/// to.
pub struct WsSurface {
    sessions: SessionMap,
    local_addr: SocketAddr,
    /// The accept-loop task, held so `shutdown()` can cancel it.
    accept_task: StdMutex<Option<JoinHandle<()>>>,
}

impl WsSurface {
    /// Binds the surface listener and starts accepting page sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot be bound (e.g., the port
    /// is already in use or the process lacks permission to bind).
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Arc<Self>> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind content surface listener on {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read bound surface address")?;
        info!("content surface listening on ws://{local_addr}");

        let sessions: SessionMap = Arc::new(Mutex::new(HashMap::new()));
        let surface = Arc::new(Self {
            sessions: Arc::clone(&sessions),
            local_addr,
            accept_task: StdMutex::new(None),
        });

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer_addr)) => {
                        let sessions = Arc::clone(&sessions);
                        // One task per page session; a slow page never
                        // delays the accept loop.
                        tokio::spawn(async move {
                            handle_page_session(stream, peer_addr, sessions).await;
                        });
                    }
                    Err(e) => {
                        // Transient accept error (e.g., too many open file
                        // descriptors). Log and keep accepting.
                        error!("surface accept error: {e}");
                    }
                }
            }
        });
        *surface.accept_task.lock().expect("lock poisoned") = Some(handle);

        Ok(surface)
    }

    /// The actually-bound listener address (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of currently attached page sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Stops accepting new sessions and detaches every attached page.
    ///
    /// Dropping a session's sender makes its forwarding task send a Close
    /// frame and exit.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.accept_task.lock().expect("lock poisoned").take() {
            handle.abort();
        }
        self.sessions.lock().await.clear();
        info!("content surface shut down");
    }
}

#[async_trait]
impl ContentSurface for WsSurface {
    async fn submit_script(&self, script: &str) {
        let mut sessions = self.sessions.lock().await;
        if sessions.is_empty() {
            // No page attached yet (or anymore) — the dangling-sink no-op.
            debug!("no page session attached; script dropped");
            return;
        }
        // Fan out to every attached page, pruning sessions whose forwarding
        // task has already exited.
        sessions.retain(|id, tx| {
            let delivered = tx.send(script.to_owned()).is_ok();
            if !delivered {
                debug!("page session {id} gone; pruned");
            }
            delivered
        });
    }
}

/// Upgrades one TCP connection to a WebSocket session and forwards queued
/// scripts to it until either side goes away.
async fn handle_page_session(stream: TcpStream, peer_addr: SocketAddr, sessions: SessionMap) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!("WebSocket handshake from {peer_addr} failed: {e}");
            return;
        }
    };

    let session_id = Uuid::new_v4();
    let (script_tx, mut script_rx) = mpsc::unbounded_channel::<String>();
    sessions.lock().await.insert(session_id, script_tx);
    info!("page session {session_id} attached from {peer_addr}");

    let (mut ws_sink, mut ws_stream) = ws.split();

    loop {
        tokio::select! {
            queued = script_rx.recv() => match queued {
                Some(script) => {
                    if let Err(e) = ws_sink.send(WsMessage::Text(script)).await {
                        debug!("page session {session_id} write failed: {e}");
                        break;
                    }
                }
                None => {
                    // Surface shut down; close politely.
                    let _ = ws_sink.send(WsMessage::Close(None)).await;
                    break;
                }
            },
            inbound = ws_stream.next() => match inbound {
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {
                    // The surface is one-way; inbound frames are ignored.
                }
                Some(Err(e)) => {
                    debug!("page session {session_id} read failed: {e}");
                    break;
                }
            },
        }
    }

    sessions.lock().await.remove(&session_id);
    info!("page session {session_id} detached");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
