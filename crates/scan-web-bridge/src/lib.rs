//! scan-web-bridge library crate.
//!
//! This crate bridges hardware barcode-scan broadcasts into a hosted web
//! page's script environment, with no server round trip.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Scanner driver layer (JSON datagrams on loopback UDP)
//!         ↓
//! [scan-web-bridge]
//!   ├── domain/           Pure types: BridgeConfig
//!   ├── application/      Use cases: scan listener, script sink
//!   └── infrastructure/
//!         ├── broadcast_source/  UDP ingress + mock (BroadcastSource trait)
//!         └── surface/           WebSocket content surface + recording mock
//!         ↓
//! Hosted web page (`window.onBarcodeScanned('<payload>')`)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain`, `scan-core`, and the infrastructure
//!   *traits* (the seams), never on concrete adapters.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.
//!
//! # For beginners: why this structure?
//!
//! Clean architecture separates *what the program does* (domain +
//! application) from *how it does it* (infrastructure). The scan pipeline —
//! filter broadcast, store payload, emit guarded script — is identical
//! whether broadcasts arrive over UDP or from a test harness, and whether
//! the surface is a real page over WebSocket or a recording test double.
//! Keeping the pipeline behind traits makes every pipeline rule testable
//! without sockets.

/// Domain layer: pure configuration types (no I/O).
pub mod domain;

/// Application layer: the scan listener and script sink use cases.
pub mod application;

/// Infrastructure layer: broadcast ingress, content surface, coordinator.
pub mod infrastructure;
