//! Mutation workflow building blocks.
//!
//! # Responsibility
//! - Form state and its pure validity rule.
//! - Mutation kinds, their fixed feedback messages and the in-flight guard.
//!
//! The orchestration itself lives in `crate::desk`.

pub mod form;
pub mod mutation;
