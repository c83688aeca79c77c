//! Project detail panel.
//!
//! # Responsibility
//! - Lifecycle state machine with stale-response protection (`machine`).
//! - Rendered regions shown once ready (`detail`, `bodies`).
//!
//! # Invariants
//! - Nothing renders before the first fetch for the current open completes.
//! - Only one panel instance exists; opening replaces the current one.

pub mod bodies;
pub mod detail;
pub mod machine;
