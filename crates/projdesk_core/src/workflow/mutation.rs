//! Mutation kinds, commit tickets and the double-submit guard.
//!
//! # Invariants
//! - At most one commit per target is outstanding.
//! - A ticket resolves exactly once; resolving it releases its target.

use crate::feedback::confirm::ConfirmError;
use crate::list::LookupError;
use crate::model::project::{ProjectId, ProjectSnapshot};
use crate::model::version::VersionId;
use crate::panel::machine::PanelError;
use crate::repo::project_repo::ProjectUpdate;
use crate::service::project_service::ServiceError;
use crate::workflow::form::FormError;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Restore,
    Archive,
}

impl MutationKind {
    /// Fixed toast text shown when the mutation succeeds.
    pub fn success_message(self) -> &'static str {
        match self {
            Self::Create => "Project created successfully",
            Self::Update => "Project updated successfully",
            Self::Delete => "Project deleted successfully",
            Self::Restore => "Version restored successfully",
            Self::Archive => "Project archived successfully",
        }
    }

    /// Toast text shown when the backend rejects the mutation.
    pub fn failure_message(self, reason: &dyn Display) -> String {
        let verb = match self {
            Self::Create => "create project",
            Self::Update => "update project",
            Self::Delete => "delete project",
            Self::Restore => "restore version",
            Self::Archive => "archive project",
        };
        format!("Failed to {verb}: {reason}")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Restore => "restore",
            Self::Archive => "archive",
        }
    }
}

/// Entity a commit is keyed on for double-submit protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationTarget {
    /// The create dialog; there is only one.
    NewProject,
    Project(ProjectId),
}

/// Action parked behind a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete {
        project_id: ProjectId,
        name: String,
    },
    Restore {
        project_id: ProjectId,
        version_id: VersionId,
    },
    Archive {
        project_id: ProjectId,
    },
}

impl ConfirmAction {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Delete { .. } => MutationKind::Delete,
            Self::Restore { .. } => MutationKind::Restore,
            Self::Archive { .. } => MutationKind::Archive,
        }
    }

    pub fn project_id(&self) -> ProjectId {
        match self {
            Self::Delete { project_id, .. }
            | Self::Restore { project_id, .. }
            | Self::Archive { project_id } => *project_id,
        }
    }
}

/// Backend call waiting to be issued for a ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation {
    Create(ProjectSnapshot),
    Update {
        project_id: ProjectId,
        update: ProjectUpdate,
    },
    Delete(ProjectId),
    Restore {
        project_id: ProjectId,
        version_id: VersionId,
    },
    Archive(ProjectId),
}

impl PendingMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update { .. } => MutationKind::Update,
            Self::Delete(_) => MutationKind::Delete,
            Self::Restore { .. } => MutationKind::Restore,
            Self::Archive(_) => MutationKind::Archive,
        }
    }

    pub fn target(&self) -> MutationTarget {
        match self {
            Self::Create(_) => MutationTarget::NewProject,
            Self::Update { project_id, .. } | Self::Restore { project_id, .. } => {
                MutationTarget::Project(*project_id)
            }
            Self::Delete(project_id) | Self::Archive(project_id) => {
                MutationTarget::Project(*project_id)
            }
        }
    }
}

impl From<ConfirmAction> for PendingMutation {
    fn from(action: ConfirmAction) -> Self {
        match action {
            ConfirmAction::Delete { project_id, .. } => Self::Delete(project_id),
            ConfirmAction::Restore {
                project_id,
                version_id,
            } => Self::Restore {
                project_id,
                version_id,
            },
            ConfirmAction::Archive { project_id } => Self::Archive(project_id),
        }
    }
}

/// Handle for one outstanding commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitTicket {
    pub id: u64,
    pub kind: MutationKind,
    pub target: MutationTarget,
}

/// Outstanding commits keyed by target.
#[derive(Debug, Default)]
pub struct InFlight {
    next_id: u64,
    commits: HashMap<MutationTarget, (u64, PendingMutation)>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a commit.
    ///
    /// # Errors
    /// - `Busy` when the same target already has a commit outstanding.
    pub fn begin(&mut self, mutation: PendingMutation) -> Result<CommitTicket, WorkflowError> {
        let target = mutation.target();
        if self.commits.contains_key(&target) {
            return Err(WorkflowError::Busy(target));
        }
        self.next_id += 1;
        let ticket = CommitTicket {
            id: self.next_id,
            kind: mutation.kind(),
            target,
        };
        self.commits.insert(target, (ticket.id, mutation));
        Ok(ticket)
    }

    /// Releases the ticket and hands back the call to issue.
    pub fn take(&mut self, ticket: &CommitTicket) -> Result<PendingMutation, WorkflowError> {
        match self.commits.get(&ticket.target) {
            Some((id, _)) if *id == ticket.id => {}
            _ => return Err(WorkflowError::UnknownTicket(ticket.id)),
        }
        self.commits
            .remove(&ticket.target)
            .map(|(_, mutation)| mutation)
            .ok_or(WorkflowError::UnknownTicket(ticket.id))
    }

    pub fn is_busy(&self, target: MutationTarget) -> bool {
        self.commits.contains_key(&target)
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Result of a workflow step that may be cancelled by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    Proceed(T),
    /// The user dismissed the confirmation; nothing was sent.
    Aborted,
}

/// What a resolved commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    pub kind: MutationKind,
    pub project_id: ProjectId,
    pub toast_id: u64,
}

#[derive(Debug)]
pub enum WorkflowError {
    /// Form input is invalid; nothing reached the backend.
    Validation(FormError),
    /// A commit for the same target is still outstanding.
    Busy(MutationTarget),
    /// The required dialog is not open.
    NoDialog,
    /// Another dialog already covers the desk.
    DialogOpen,
    /// Ticket was already resolved or never issued.
    UnknownTicket(u64),
    /// The project is neither listed nor open in the panel.
    UnknownProject(ProjectId),
    Lookup(LookupError),
    /// The backend rejected the call; UI state was left unchanged.
    Backend {
        kind: MutationKind,
        source: ServiceError,
    },
    /// Loading a project into a dialog failed.
    Load(ServiceError),
    /// Reloading the list or panel after a mutation failed.
    Refresh(ServiceError),
    Confirm(ConfirmError),
    Panel(PanelError),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid form: {err}"),
            Self::Busy(target) => write!(f, "a commit is already in flight for {target:?}"),
            Self::NoDialog => write!(f, "dialog is not open"),
            Self::DialogOpen => write!(f, "another dialog is already open"),
            Self::UnknownTicket(id) => write!(f, "unknown commit ticket {id}"),
            Self::UnknownProject(id) => write!(f, "project is not shown: {id}"),
            Self::Lookup(err) => write!(f, "{err}"),
            Self::Backend { kind, source } => {
                write!(f, "{} failed: {source}", kind.as_str())
            }
            Self::Load(err) => write!(f, "loading project failed: {err}"),
            Self::Refresh(err) => write!(f, "refresh failed: {err}"),
            Self::Confirm(err) => write!(f, "{err}"),
            Self::Panel(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Backend { source, .. } => Some(source),
            Self::Load(err) | Self::Refresh(err) => Some(err),
            Self::Confirm(err) => Some(err),
            Self::Panel(err) => Some(err),
            Self::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormError> for WorkflowError {
    fn from(value: FormError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConfirmError> for WorkflowError {
    fn from(value: ConfirmError) -> Self {
        Self::Confirm(value)
    }
}

impl From<LookupError> for WorkflowError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}

impl From<PanelError> for WorkflowError {
    fn from(value: PanelError) -> Self {
        Self::Panel(value)
    }
}
