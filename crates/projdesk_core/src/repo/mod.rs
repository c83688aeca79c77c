//! Backend collaborator contracts and the SQLite reference backend.
//!
//! # Responsibility
//! - Define the project backend interface consumed by the service layer.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Writes validate model invariants before SQL mutations.
//! - Reads reject invalid persisted state instead of masking it.

pub mod project_repo;
