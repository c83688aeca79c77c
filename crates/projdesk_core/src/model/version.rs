//! Project version records.

use crate::model::project::{ProjectId, ProjectSnapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type VersionId = Uuid;

/// Immutable snapshot of a project's editable fields.
///
/// Only `is_active` may change after creation, and only through restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub project_id: ProjectId,
    /// 1-based, monotonic per project.
    pub number: u32,
    pub payload: ProjectSnapshot,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub is_active: bool,
    pub is_latest: bool,
}

impl Version {
    /// Short display label, e.g. `v3`.
    pub fn label(&self) -> String {
        format!("v{}", self.number)
    }
}
