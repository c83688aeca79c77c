//! Project aggregate.
//!
//! # Responsibility
//! - Define the project record with its owned versions and bodies.
//! - Validate aggregate-level invariants before persistence and after reads.
//!
//! # Invariants
//! - `name` is non-empty after whitespace normalization.
//! - Exactly one version is active when at least one version exists.
//! - Only the highest-numbered version carries `is_latest`.
//! - Body indices are contiguous from zero.

use crate::model::body::{Body, BodyValidationError};
use crate::model::version::{Version, VersionId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Lifecycle status shown in the detail footer and list rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Archived,
    /// Removal requested but not yet confirmed by the backend.
    DeletePending,
}

impl ProjectStatus {
    /// Storage and display token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::DeletePending => "delete_pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            "delete_pending" => Some(Self::DeletePending),
            _ => None,
        }
    }
}

/// Editable project fields captured by every version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub name: String,
    pub description: Option<String>,
}

impl ProjectSnapshot {
    /// Builds a snapshot with normalized name and description.
    ///
    /// Blank descriptions collapse to `None`.
    pub fn new(name: impl AsRef<str>, description: Option<&str>) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            description: normalize_description(description),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Full project aggregate as returned by the detail fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    /// Ordered by `Version::number` ascending.
    pub versions: Vec<Version>,
    /// Ordered by `Body::index` ascending.
    pub bodies: Vec<Body>,
}

impl Project {
    /// Current editable fields as a snapshot.
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Returns the version flagged active, if any.
    pub fn active_version(&self) -> Option<&Version> {
        self.versions.iter().find(|version| version.is_active)
    }

    /// Returns the version flagged latest, if any.
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.iter().find(|version| version.is_latest)
    }

    pub fn version(&self, id: VersionId) -> Option<&Version> {
        self.versions.iter().find(|version| version.id == id)
    }

    /// Checks aggregate invariants.
    ///
    /// # Errors
    /// - Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        self.snapshot().validate()?;

        if !self.versions.is_empty() {
            let active = self.versions.iter().filter(|v| v.is_active).count();
            if active != 1 {
                return Err(ProjectValidationError::ActiveVersionCount(active));
            }
            let newest = self.versions.iter().map(|v| v.number).max().unwrap_or(0);
            for version in &self.versions {
                if version.project_id != self.id {
                    return Err(ProjectValidationError::ForeignVersion(version.id));
                }
                if version.is_latest != (version.number == newest) {
                    return Err(ProjectValidationError::LatestFlagMismatch(version.id));
                }
            }
        }

        for (position, body) in self.bodies.iter().enumerate() {
            body.validate()?;
            if body.project_id != self.id {
                return Err(ProjectValidationError::ForeignBody(body.id));
            }
            if body.index as usize != position {
                return Err(ProjectValidationError::BodyIndexGap {
                    expected: position as u32,
                    found: body.index,
                });
            }
        }

        Ok(())
    }
}

/// Row-level projection used by the project list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub updated_at: i64,
    pub version_count: u32,
    pub body_count: u32,
}

/// Aggregate validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectValidationError {
    EmptyName,
    ActiveVersionCount(usize),
    LatestFlagMismatch(VersionId),
    ForeignVersion(VersionId),
    ForeignBody(Uuid),
    BodyIndexGap { expected: u32, found: u32 },
    Body(BodyValidationError),
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name must not be empty"),
            Self::ActiveVersionCount(count) => {
                write!(f, "expected exactly one active version, found {count}")
            }
            Self::LatestFlagMismatch(id) => {
                write!(f, "latest flag does not match newest version: {id}")
            }
            Self::ForeignVersion(id) => write!(f, "version belongs to another project: {id}"),
            Self::ForeignBody(id) => write!(f, "body belongs to another project: {id}"),
            Self::BodyIndexGap { expected, found } => {
                write!(f, "body index gap: expected {expected}, found {found}")
            }
            Self::Body(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Body(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BodyValidationError> for ProjectValidationError {
    fn from(value: BodyValidationError) -> Self {
        Self::Body(value)
    }
}

/// Trims and collapses internal whitespace runs to single spaces.
pub fn normalize_name(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

fn normalize_description(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, ProjectSnapshot, ProjectStatus, ProjectValidationError};

    #[test]
    fn normalize_name_collapses_whitespace() {
        assert_eq!(normalize_name("  Test   Project\t123 "), "Test Project 123");
    }

    #[test]
    fn snapshot_drops_blank_description() {
        let snapshot = ProjectSnapshot::new("Alpha", Some("   "));
        assert_eq!(snapshot.description, None);
    }

    #[test]
    fn snapshot_rejects_blank_name() {
        let snapshot = ProjectSnapshot::new(" \n ", None);
        assert_eq!(snapshot.validate(), Err(ProjectValidationError::EmptyName));
    }

    #[test]
    fn status_tokens_roundtrip() {
        for status in [
            ProjectStatus::Active,
            ProjectStatus::Archived,
            ProjectStatus::DeletePending,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse("deleted"), None);
    }
}
