//! Core use-case services.
//!
//! # Responsibility
//! - Wrap backend calls into use-case level APIs with diagnostics.
//! - Keep workflow and panel layers decoupled from storage details.

pub mod project_service;
