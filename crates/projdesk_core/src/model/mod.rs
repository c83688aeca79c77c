//! Project domain model.
//!
//! # Responsibility
//! - Define the canonical Project / Version / Body records.
//! - Own the validation rules shared by repository and workflow layers.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - A project exclusively owns its versions and bodies.
//! - At most one version of a project is active at any instant.

pub mod body;
pub mod project;
pub mod version;
