//! Application layer use cases for the scan bridge.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules) and the infrastructure (OS/network).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil one goal of the pipeline.
//! - **Depend on abstractions** (traits, channels) rather than concrete
//!   adapters, so the infrastructure can be swapped without changing this
//!   code.
//! - **Contain no socket I/O** — they consume and produce through the seams.
//!
//! # Sub-modules
//!
//! - **`scan_listener`** – Receives raw broadcasts, keeps only configured
//!   scan actions, extracts the payload, and writes it into the scan state.
//!   This is the single writer of the state holder.
//!
//! - **`script_sink`** – Observes the scan state and turns every non-absent
//!   emission into a guarded script submission to the content surface.

pub mod scan_listener;
pub mod script_sink;

pub use scan_listener::ScanListener;
pub use script_sink::ScriptSink;
