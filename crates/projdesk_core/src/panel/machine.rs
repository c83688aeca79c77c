//! Detail panel lifecycle.
//!
//! # Responsibility
//! - Track `Closed → Opening → Ready → Closing → Closed` plus `Failed`.
//! - Hold the ready sub-states: view mode, selected version, sub-dialog.
//! - Discard fetch results that belong to a superseded open.
//!
//! # Invariants
//! - Every open bumps `generation`; only the current generation may apply.
//! - Loading is observable on its own: `is_loading()` is true while a fetch
//!   or a commit on the open project is outstanding, even if data exists.
//! - A pending sub-dialog blocks the close path until it is dismissed.
//! - Opening a project first completes closing the current one.

use crate::feedback::confirm::RequestId;
use crate::model::project::{Project, ProjectId};
use crate::model::version::VersionId;
use crate::panel::bodies::ViewMode;
use crate::panel::detail::{render_detail, DetailView};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Handle for one in-flight detail fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub project_id: ProjectId,
    pub deadline: Instant,
}

/// Modal content stacked on top of the ready panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelDialog {
    /// Edit dialog for the shown project; its form lives with the desk.
    Edit(ProjectId),
    Confirm(RequestId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyPanel {
    project: Project,
    view_mode: ViewMode,
    selected_version: Option<VersionId>,
    dialog: Option<PanelDialog>,
    busy: bool,
}

impl ReadyPanel {
    fn new(project: Project) -> Self {
        let selected_version = project.active_version().map(|version| version.id);
        Self {
            project,
            view_mode: ViewMode::default(),
            selected_version,
            dialog: None,
            busy: false,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn selected_version(&self) -> Option<VersionId> {
        self.selected_version
    }

    pub fn dialog(&self) -> Option<&PanelDialog> {
        self.dialog.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn detail(&self) -> DetailView {
        render_detail(
            &self.project,
            self.view_mode,
            self.selected_version,
            self.busy,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Closed,
    Opening(FetchTicket),
    Ready(ReadyPanel),
    Closing,
    /// Recoverable error display for a failed or timed-out open.
    Failed {
        project_id: ProjectId,
        message: String,
    },
}

/// Coarse phase published to watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Closed,
    Loading,
    Ready,
    Closing,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    CloseButton,
    Escape,
    Backdrop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    /// Panel entered `Closing`; call `finish_close` to complete.
    Closing,
    AlreadyClosed,
    /// A sub-dialog is pending; the panel stays ready.
    Blocked,
    /// Escape dismissed the pending sub-dialog; the panel stays ready.
    DialogDismissed(PanelDialog),
}

/// Result of applying a fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Ready,
    Failed,
    /// Response belonged to a closed or superseded open and was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    NotReady,
    DialogOpen,
    NoDialog,
    UnknownVersion(VersionId),
    CloseBlocked,
    NothingToRetry,
}

impl Display for PanelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "detail panel is not ready"),
            Self::DialogOpen => write!(f, "a dialog is already open on the detail panel"),
            Self::NoDialog => write!(f, "no dialog is open on the detail panel"),
            Self::UnknownVersion(id) => write!(f, "version {id} is not part of this project"),
            Self::CloseBlocked => {
                write!(f, "detail panel cannot close while a dialog is pending")
            }
            Self::NothingToRetry => write!(f, "no failed open to retry"),
        }
    }
}

impl Error for PanelError {}

pub struct ProjectPanel {
    state: PanelState,
    generation: u64,
    fetch_timeout: Duration,
    phase_tx: watch::Sender<PanelPhase>,
}

impl ProjectPanel {
    pub fn new(fetch_timeout: Duration) -> Self {
        let (phase_tx, _) = watch::channel(PanelPhase::Closed);
        Self {
            state: PanelState::Closed,
            generation: 0,
            fetch_timeout,
            phase_tx,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn phase(&self) -> PanelPhase {
        match &self.state {
            PanelState::Closed => PanelPhase::Closed,
            PanelState::Opening(_) => PanelPhase::Loading,
            PanelState::Ready(ready) if ready.busy => PanelPhase::Loading,
            PanelState::Ready(_) => PanelPhase::Ready,
            PanelState::Closing => PanelPhase::Closing,
            PanelState::Failed { .. } => PanelPhase::Failed,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelPhase> {
        self.phase_tx.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == PanelPhase::Loading
    }

    /// Ready and no loading indicator present.
    pub fn is_ready(&self) -> bool {
        self.phase() == PanelPhase::Ready
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, PanelState::Closed)
    }

    /// Project currently shown, opening or failed.
    pub fn project_id(&self) -> Option<ProjectId> {
        match &self.state {
            PanelState::Opening(ticket) => Some(ticket.project_id),
            PanelState::Ready(ready) => Some(ready.project.id),
            PanelState::Failed { project_id, .. } => Some(*project_id),
            PanelState::Closed | PanelState::Closing => None,
        }
    }

    pub fn ready(&self) -> Option<&ReadyPanel> {
        match &self.state {
            PanelState::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    fn ready_mut(&mut self) -> Result<&mut ReadyPanel, PanelError> {
        match &mut self.state {
            PanelState::Ready(ready) => Ok(ready),
            _ => Err(PanelError::NotReady),
        }
    }

    /// Rendered detail; `None` until the first fetch has completed.
    pub fn detail(&self) -> Option<DetailView> {
        self.ready().map(ReadyPanel::detail)
    }

    /// Starts opening `project_id`, closing any open panel first.
    ///
    /// # Errors
    /// - `CloseBlocked` when the current panel has a pending sub-dialog.
    pub fn begin_open(
        &mut self,
        project_id: ProjectId,
        now: Instant,
    ) -> Result<FetchTicket, PanelError> {
        match &self.state {
            PanelState::Ready(ready) if ready.dialog.is_some() => {
                return Err(PanelError::CloseBlocked);
            }
            PanelState::Closed => {}
            _ => {
                debug!("event=panel_replace module=panel status=ok");
            }
        }

        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            project_id,
            deadline: now + self.fetch_timeout,
        };
        info!(
            "event=panel_open module=panel status=start project_id={project_id} generation={}",
            ticket.generation
        );
        self.set_state(PanelState::Opening(ticket));
        Ok(ticket)
    }

    /// Applies a fetch response if it belongs to the current open.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Project, String>,
    ) -> ApplyOutcome {
        let current = match &self.state {
            PanelState::Opening(current) => *current,
            _ => {
                debug!(
                    "event=panel_fetch module=panel status=stale generation={} reason=not_opening",
                    ticket.generation
                );
                return ApplyOutcome::Stale;
            }
        };
        if current.generation != ticket.generation {
            debug!(
                "event=panel_fetch module=panel status=stale generation={} current={}",
                ticket.generation, current.generation
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(project) => {
                info!(
                    "event=panel_open module=panel status=ok project_id={} versions={} bodies={}",
                    project.id,
                    project.versions.len(),
                    project.bodies.len()
                );
                self.set_state(PanelState::Ready(ReadyPanel::new(project)));
                ApplyOutcome::Ready
            }
            Err(message) => {
                warn!(
                    "event=panel_open module=panel status=error project_id={} error={message}",
                    ticket.project_id
                );
                self.set_state(PanelState::Failed {
                    project_id: ticket.project_id,
                    message,
                });
                ApplyOutcome::Failed
            }
        }
    }

    /// Fails an open whose fetch outlived its deadline.
    pub fn expire_overdue(&mut self, now: Instant) -> bool {
        let PanelState::Opening(ticket) = &self.state else {
            return false;
        };
        if now < ticket.deadline {
            return false;
        }
        let ticket = *ticket;
        warn!(
            "event=panel_open module=panel status=timeout project_id={} generation={}",
            ticket.project_id, ticket.generation
        );
        self.set_state(PanelState::Failed {
            project_id: ticket.project_id,
            message: format!(
                "loading timed out after {} ms",
                self.fetch_timeout.as_millis()
            ),
        });
        true
    }

    /// Re-opens the project of a failed panel.
    pub fn retry(&mut self, now: Instant) -> Result<FetchTicket, PanelError> {
        let PanelState::Failed { project_id, .. } = &self.state else {
            return Err(PanelError::NothingToRetry);
        };
        let project_id = *project_id;
        self.begin_open(project_id, now)
    }

    /// Routes a close gesture through the shared closing path.
    pub fn request_close(&mut self, trigger: CloseTrigger) -> CloseOutcome {
        match &mut self.state {
            PanelState::Closed => return CloseOutcome::AlreadyClosed,
            PanelState::Closing => return CloseOutcome::Closing,
            PanelState::Ready(ready) if ready.dialog.is_some() => {
                if trigger == CloseTrigger::Escape {
                    if let Some(dialog) = ready.dialog.take() {
                        debug!("event=panel_dialog module=panel status=dismissed trigger=escape");
                        self.publish();
                        return CloseOutcome::DialogDismissed(dialog);
                    }
                }
                debug!("event=panel_close module=panel status=blocked trigger={trigger:?}");
                return CloseOutcome::Blocked;
            }
            _ => {}
        }

        debug!("event=panel_close module=panel status=start trigger={trigger:?}");
        self.set_state(PanelState::Closing);
        CloseOutcome::Closing
    }

    /// Completes `Closing → Closed`. Returns false when not closing.
    pub fn finish_close(&mut self) -> bool {
        if !matches!(self.state, PanelState::Closing) {
            return false;
        }
        info!("event=panel_close module=panel status=ok");
        self.set_state(PanelState::Closed);
        true
    }

    /// `request_close` followed by `finish_close` when allowed.
    pub fn close(&mut self, trigger: CloseTrigger) -> CloseOutcome {
        let outcome = self.request_close(trigger);
        if outcome == CloseOutcome::Closing {
            self.finish_close();
        }
        outcome
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), PanelError> {
        self.ready_mut()?.view_mode = mode;
        Ok(())
    }

    /// Highlights a version for display; persisted flags are untouched.
    pub fn select_version(&mut self, version_id: VersionId) -> Result<(), PanelError> {
        let ready = self.ready_mut()?;
        if ready.project.version(version_id).is_none() {
            return Err(PanelError::UnknownVersion(version_id));
        }
        ready.selected_version = Some(version_id);
        Ok(())
    }

    pub fn open_dialog(&mut self, dialog: PanelDialog) -> Result<(), PanelError> {
        let ready = self.ready_mut()?;
        if ready.dialog.is_some() {
            return Err(PanelError::DialogOpen);
        }
        ready.dialog = Some(dialog);
        Ok(())
    }

    pub fn clear_dialog(&mut self) -> Option<PanelDialog> {
        match &mut self.state {
            PanelState::Ready(ready) => ready.dialog.take(),
            _ => None,
        }
    }

    pub fn set_busy(&mut self, busy: bool) {
        if let PanelState::Ready(ready) = &mut self.state {
            ready.busy = busy;
            self.publish();
        }
    }

    /// Swaps in a refreshed project after a successful mutation.
    ///
    /// View mode is kept; the selection follows the active version.
    pub fn replace_project(&mut self, project: Project) -> Result<(), PanelError> {
        let ready = self.ready_mut()?;
        if ready.project.id != project.id {
            return Err(PanelError::NotReady);
        }
        ready.selected_version = project.active_version().map(|version| version.id);
        ready.project = project;
        Ok(())
    }

    fn set_state(&mut self, state: PanelState) {
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        let phase = self.phase();
        self.phase_tx.send_if_modified(|current| {
            if *current == phase {
                return false;
            }
            *current = phase;
            true
        });
    }
}
