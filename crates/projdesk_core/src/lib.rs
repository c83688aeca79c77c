//! Core domain logic for ProjDesk.
//! This crate owns the project model, the detail panel state machine and the
//! mutation workflow; rendering layers only consume its view models.

pub mod config;
pub mod db;
pub mod desk;
pub mod feedback;
pub mod list;
pub mod logging;
pub mod model;
pub mod panel;
pub mod repo;
pub mod service;
pub mod workflow;

pub use config::{ConfigError, DeskConfig};
pub use desk::{EditDialog, EditOrigin, ProjectDesk};
pub use feedback::confirm::{ConfirmationGate, Decision, RequestId};
pub use feedback::toast::{ToastChannel, ToastKind, VisibleToast};
pub use feedback::wait::{wait_until, WaitError};
pub use list::{LookupError, ProjectList, ProjectRow};
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LoggingError,
};
pub use model::body::{Body, BodyDimensions, BodyId};
pub use model::project::{
    Project, ProjectId, ProjectSnapshot, ProjectStatus, ProjectSummary, ProjectValidationError,
};
pub use model::version::{Version, VersionId};
pub use panel::bodies::ViewMode;
pub use panel::detail::DetailView;
pub use panel::machine::{ApplyOutcome, CloseOutcome, CloseTrigger, PanelPhase, ProjectPanel};
pub use repo::project_repo::{
    ProjectRepository, ProjectUpdate, RepoError, RepoResult, SqliteProjectRepository,
};
pub use service::project_service::{ProjectService, ServiceError};
pub use workflow::form::ProjectForm;
pub use workflow::mutation::{MutationKind, MutationOutcome, MutationReport, WorkflowError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
