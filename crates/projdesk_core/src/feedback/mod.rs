//! Confirmation and feedback channels.
//!
//! # Responsibility
//! - Blocking two-outcome confirmation gate for destructive mutations.
//! - Timed, revealed-then-self-dismissing toast notifications.
//! - Generic "wait until predicate or timeout" over watched state.
//!
//! # Invariants
//! - At most one confirmation is pending per gate.
//! - A toast counts as shown only after its reveal delay has elapsed.

pub mod confirm;
pub mod toast;
pub mod wait;
