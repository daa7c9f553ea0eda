//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/voice-demo
//!     → probe.rs
//!         ├─ HTTP GET status path      (reachability, sub-service statuses)
//!         └─ WebSocket open → close    (upgrade capability)
//!     → diagnostics.rs (combine)
//! ```
//!
//! # Design Decisions
//! - Diagnostics are rebuilt on every probe, never cached
//! - A failing upgrade check never hides the status result
//! - healthy = reachable AND upgrade-capable AND not error-flagged

pub mod diagnostics;
pub mod probe;

pub use diagnostics::{HealthDiagnostics, StatusReport};
pub use probe::HealthProbe;
