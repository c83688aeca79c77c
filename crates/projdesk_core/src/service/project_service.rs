//! Project use-case service.
//!
//! # Responsibility
//! - Expose the backend operations the UI workflow depends on.
//! - Emit one `event=backend_call` diagnostic line per call.
//! - Translate repository errors into service-level failures.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Read-back after a write must find the written project.

use crate::model::project::{
    Project, ProjectId, ProjectSnapshot, ProjectStatus, ProjectSummary, ProjectValidationError,
};
use crate::model::version::VersionId;
use crate::repo::project_repo::{ProjectRepository, ProjectUpdate, RepoError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of one backend call.
#[derive(Debug)]
pub enum ServiceError {
    /// Payload rejected by backend validation.
    Invalid(ProjectValidationError),
    /// Target project does not exist.
    ProjectNotFound(ProjectId),
    /// Target version does not exist in the project.
    VersionNotFound {
        project_id: ProjectId,
        version_id: VersionId,
    },
    /// Transport or storage failure.
    Backend(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::VersionNotFound {
                project_id,
                version_id,
            } => write!(f, "version {version_id} not found in project {project_id}"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            RepoError::VersionNotFound {
                project_id,
                version_id,
            } => Self::VersionNotFound {
                project_id,
                version_id,
            },
            other => Self::Backend(other),
        }
    }
}

/// Service facade over a project backend.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_projects(&self) -> ServiceResult<Vec<ProjectSummary>> {
        traced("list_projects", || self.repo.list_projects())
    }

    /// Fetches one project with versions and bodies populated.
    pub fn get_project(&self, id: ProjectId) -> ServiceResult<Project> {
        traced("get_project", || {
            self.repo.get_project(id)?.ok_or(RepoError::NotFound(id))
        })
    }

    /// Creates a project with its initial version.
    pub fn create_project(&self, snapshot: &ProjectSnapshot) -> ServiceResult<Project> {
        traced("create_project", || self.repo.create_project(snapshot))
    }

    /// Applies an edit; the backend appends a new active version.
    pub fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> ServiceResult<Project> {
        traced("update_project", || self.repo.update_project(id, update))
    }

    pub fn delete_project(&self, id: ProjectId) -> ServiceResult<()> {
        traced("delete_project", || self.repo.delete_project(id))
    }

    /// Makes `version_id` active and reverts project fields to its payload.
    pub fn restore_version(
        &self,
        project_id: ProjectId,
        version_id: VersionId,
    ) -> ServiceResult<Project> {
        traced("restore_version", || {
            self.repo.restore_version(project_id, version_id)
        })
    }

    pub fn archive_project(&self, id: ProjectId) -> ServiceResult<Project> {
        traced("archive_project", || {
            self.repo.set_status(id, ProjectStatus::Archived)
        })
    }
}

fn traced<T>(operation: &'static str, call: impl FnOnce() -> Result<T, RepoError>) -> ServiceResult<T> {
    let started_at = Instant::now();
    match call() {
        Ok(value) => {
            debug!(
                "event=backend_call module=service status=ok op={operation} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            warn!(
                "event=backend_call module=service status=error op={operation} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err.into())
        }
    }
}
