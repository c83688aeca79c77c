//! Project desk: list, detail panel, dialogs and the mutation workflow.
//!
//! # Responsibility
//! - Drive create, edit, delete, restore and archive through
//!   validate → confirm → commit → feedback → refresh.
//! - Own the single detail panel, the edit dialog, the confirmation gate and
//!   the toast channel.
//! - Keep UI state unchanged when the backend rejects a commit.
//!
//! # Invariants
//! - A commit is split into `submit_*`/`answer_confirmation` (issues a
//!   `CommitTicket`) and `resolve` (runs the backend call). Between the two
//!   the target is busy and a second submit fails with `Busy`.
//! - Create and delete settle only once their success toast is visible:
//!   until a `tick` observes it, the create dialog stays open, the list keeps
//!   its old rows and the target stays busy.
//! - A commit result only lands on the panel when it is `Ready` on the same
//!   project; otherwise it is dropped and the panel's own fetch wins.
//! - Deleting the open project closes the panel.

use crate::config::DeskConfig;
use crate::feedback::confirm::{
    ConfirmationGate, Decision, PendingConfirmation, RequestId, Resolution,
};
use crate::feedback::toast::{ToastChannel, ToastId, ToastKind, VisibleToast};
use crate::list::ProjectList;
use crate::model::project::{Project, ProjectId};
use crate::model::version::VersionId;
use crate::panel::bodies::ViewMode;
use crate::panel::machine::{
    ApplyOutcome, CloseOutcome, CloseTrigger, FetchTicket, PanelDialog, PanelError, PanelPhase,
    ProjectPanel,
};
use crate::repo::project_repo::{ProjectRepository, ProjectUpdate};
use crate::service::project_service::{ProjectService, ServiceResult};
use crate::workflow::form::{commit_enabled, ProjectForm};
use crate::workflow::mutation::{
    CommitTicket, ConfirmAction, InFlight, MutationKind, MutationOutcome, MutationReport,
    MutationTarget, PendingMutation, WorkflowError,
};
use log::{debug, info, warn};
use std::time::Instant;
use tokio::sync::watch;

/// What a successful backend call produced.
enum Committed {
    Saved(Project),
    Deleted(ProjectId),
}

impl Committed {
    fn project_id(&self) -> ProjectId {
        match self {
            Self::Saved(project) => project.id,
            Self::Deleted(id) => *id,
        }
    }
}

/// Where the edit dialog was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// Edit icon on a list row; no panel involved.
    Row,
    /// Edit action in the panel footer.
    Panel,
}

/// Open edit dialog: the form plus the project it was loaded from, whose
/// versions back the dialog's history table.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDialog {
    project: Project,
    form: ProjectForm,
    origin: EditOrigin,
}

impl EditDialog {
    fn new(project: Project, origin: EditOrigin) -> Self {
        Self {
            form: ProjectForm::for_project(&project),
            project,
            origin,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn form(&self) -> &ProjectForm {
        &self.form
    }

    pub fn origin(&self) -> EditOrigin {
        self.origin
    }

    /// Refills the form from a restored project; typed edits are discarded.
    fn reload(&mut self, project: &Project) {
        self.form = ProjectForm::for_project(project);
        self.project = project.clone();
    }
}

/// Committed create or delete waiting for its success toast to show.
#[derive(Debug, Clone, Copy)]
struct Settling {
    toast_id: ToastId,
    kind: MutationKind,
    target: MutationTarget,
    project_id: ProjectId,
}

pub struct ProjectDesk<R: ProjectRepository> {
    service: ProjectService<R>,
    config: DeskConfig,
    list: ProjectList,
    panel: ProjectPanel,
    create_dialog: Option<ProjectForm>,
    edit_dialog: Option<EditDialog>,
    confirmations: ConfirmationGate<ConfirmAction>,
    toasts: ToastChannel,
    in_flight: InFlight,
    settling: Vec<Settling>,
}

impl<R: ProjectRepository> ProjectDesk<R> {
    pub fn new(repo: R, config: DeskConfig) -> Self {
        Self {
            service: ProjectService::new(repo),
            panel: ProjectPanel::new(config.fetch_timeout()),
            toasts: ToastChannel::new(config.toast_reveal_delay(), config.toast_duration()),
            config,
            list: ProjectList::new(),
            create_dialog: None,
            edit_dialog: None,
            confirmations: ConfirmationGate::new(),
            in_flight: InFlight::new(),
            settling: Vec::new(),
        }
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn list(&self) -> &ProjectList {
        &self.list
    }

    pub fn panel(&self) -> &ProjectPanel {
        &self.panel
    }

    pub fn toasts(&self) -> &ToastChannel {
        &self.toasts
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation<ConfirmAction>> {
        self.confirmations.pending()
    }

    /// True while a committed create or delete waits for its toast.
    pub fn is_awaiting_feedback(&self) -> bool {
        !self.settling.is_empty()
    }

    pub fn subscribe_panel(&self) -> watch::Receiver<PanelPhase> {
        self.panel.subscribe()
    }

    pub fn subscribe_toasts(&self) -> watch::Receiver<Vec<VisibleToast>> {
        self.toasts.subscribe()
    }

    /// Advances time-driven state: toast reveal/expiry, fetch deadlines and
    /// creates/deletes whose success toast has now been seen.
    ///
    /// # Errors
    /// - `Refresh` when reloading the list for a settled mutation failed.
    pub fn tick(&mut self, now: Instant) -> Result<(), WorkflowError> {
        self.toasts.tick(now);
        self.panel.expire_overdue(now);

        let toasts = &self.toasts;
        let (observed, waiting): (Vec<Settling>, Vec<Settling>) =
            std::mem::take(&mut self.settling)
                .into_iter()
                .partition(|settling| {
                    toasts.is_visible(settling.toast_id, now)
                        || !toasts.is_present(settling.toast_id)
                });
        self.settling = waiting;
        if observed.is_empty() {
            return Ok(());
        }

        for settled in &observed {
            match settled.kind {
                MutationKind::Create => self.create_dialog = None,
                MutationKind::Delete => self.close_deleted(settled.project_id),
                _ => {}
            }
            info!(
                "event=mutation module=desk status=settled op={} project_id={} toast_id={}",
                settled.kind.as_str(),
                settled.project_id,
                settled.toast_id
            );
        }
        self.refresh_list()
    }

    /// Reloads the list rows from the backend.
    pub fn refresh_list(&mut self) -> Result<(), WorkflowError> {
        let summaries = self
            .service
            .list_projects()
            .map_err(WorkflowError::Refresh)?;
        self.list.replace(summaries);
        Ok(())
    }

    /// Opens the create dialog, keeping an already open one as is.
    pub fn open_create_dialog(&mut self) -> &mut ProjectForm {
        self.create_dialog.get_or_insert_with(ProjectForm::new)
    }

    pub fn is_create_dialog_open(&self) -> bool {
        self.create_dialog.is_some()
    }

    pub fn create_form(&self) -> Option<&ProjectForm> {
        self.create_dialog.as_ref()
    }

    pub fn create_form_mut(&mut self) -> Option<&mut ProjectForm> {
        self.create_dialog.as_mut()
    }

    pub fn create_commit_enabled(&self) -> bool {
        self.create_dialog.as_ref().is_some_and(|form| {
            commit_enabled(form, self.is_busy(MutationTarget::NewProject))
        })
    }

    /// Closes the create dialog without committing. Returns false when it was
    /// not open or a commit from it is outstanding.
    pub fn cancel_create_dialog(&mut self) -> bool {
        if self.is_busy(MutationTarget::NewProject) {
            return false;
        }
        self.create_dialog.take().is_some()
    }

    /// Validates the create form and registers the commit.
    ///
    /// # Errors
    /// - `NoDialog` when the create dialog is closed.
    /// - `Validation` when the form is invalid.
    /// - `Busy` when a create commit is outstanding or not yet settled.
    pub fn submit_create(&mut self) -> Result<CommitTicket, WorkflowError> {
        let form = self.create_dialog.as_ref().ok_or(WorkflowError::NoDialog)?;
        let snapshot = form.snapshot()?;
        self.begin(PendingMutation::Create(snapshot))
    }

    /// `submit_create` followed by `resolve`.
    pub fn create_project(&mut self, now: Instant) -> Result<MutationReport, WorkflowError> {
        let ticket = self.submit_create()?;
        self.resolve(ticket, now)
    }

    /// Row selection: starts opening the panel for `project_id`.
    pub fn select_row(
        &mut self,
        project_id: ProjectId,
        now: Instant,
    ) -> Result<FetchTicket, WorkflowError> {
        if self.edit_dialog.is_some() {
            return Err(WorkflowError::DialogOpen);
        }
        Ok(self.panel.begin_open(project_id, now)?)
    }

    /// Runs the detail fetch for `ticket` and applies it to the panel.
    pub fn complete_fetch(&mut self, ticket: FetchTicket) -> ApplyOutcome {
        let result = self
            .service
            .get_project(ticket.project_id)
            .map_err(|err| err.to_string());
        self.panel.apply_fetch(ticket, result)
    }

    /// `select_row` followed by `complete_fetch`.
    pub fn open_project(
        &mut self,
        project_id: ProjectId,
        now: Instant,
    ) -> Result<ApplyOutcome, WorkflowError> {
        let ticket = self.select_row(project_id, now)?;
        Ok(self.complete_fetch(ticket))
    }

    /// Retries a failed open.
    pub fn retry_open(&mut self, now: Instant) -> Result<ApplyOutcome, WorkflowError> {
        let ticket = self.panel.retry(now)?;
        Ok(self.complete_fetch(ticket))
    }

    /// Close gesture. Escape removes the topmost modal first: a confirmation
    /// stacked on the edit dialog, then the panel's own dialog. A permitted
    /// close is completed immediately.
    pub fn close_panel(&mut self, trigger: CloseTrigger) -> CloseOutcome {
        if let Some(PanelDialog::Edit(project_id)) =
            self.panel.ready().and_then(|ready| ready.dialog())
        {
            let project_id = *project_id;
            let stacked = self.confirmations.pending().map(|pending| pending.request_id);
            if let (Some(request_id), CloseTrigger::Escape) = (stacked, trigger) {
                self.dismiss_confirmation(request_id);
                return CloseOutcome::DialogDismissed(PanelDialog::Confirm(request_id));
            }
            if stacked.is_some() || self.is_busy(MutationTarget::Project(project_id)) {
                debug!("event=panel_close module=desk status=blocked trigger={trigger:?}");
                return CloseOutcome::Blocked;
            }
        }

        let outcome = self.panel.request_close(trigger);
        match &outcome {
            CloseOutcome::DialogDismissed(PanelDialog::Confirm(request_id)) => {
                self.dismiss_confirmation(*request_id);
            }
            CloseOutcome::DialogDismissed(PanelDialog::Edit(_)) => {
                self.edit_dialog = None;
            }
            CloseOutcome::Closing => {
                self.panel.finish_close();
            }
            _ => {}
        }
        outcome
    }

    fn dismiss_confirmation(&mut self, request_id: RequestId) {
        if let Some(pending) = self.confirmations.dismiss() {
            info!(
                "event=confirm module=desk status=dismissed request_id={request_id} op={}",
                pending.action.kind().as_str()
            );
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), WorkflowError> {
        Ok(self.panel.set_view_mode(mode)?)
    }

    pub fn select_version(&mut self, version_id: VersionId) -> Result<(), WorkflowError> {
        Ok(self.panel.select_version(version_id)?)
    }

    /// Opens the edit dialog from the panel footer, prefilled from the open
    /// project.
    pub fn open_edit_dialog(&mut self) -> Result<(), WorkflowError> {
        self.ensure_no_modal()?;
        let project = self
            .panel
            .ready()
            .ok_or(PanelError::NotReady)?
            .project()
            .clone();
        self.panel.open_dialog(PanelDialog::Edit(project.id))?;
        self.edit_dialog = Some(EditDialog::new(project, EditOrigin::Panel));
        Ok(())
    }

    /// Opens the edit dialog from a list row's edit icon. The project is
    /// loaded fresh; the panel is not opened.
    ///
    /// # Errors
    /// - `DialogOpen` when another edit dialog or a confirmation is showing.
    /// - `UnknownProject` when the row is not listed.
    /// - `Load` when the backend could not return the project.
    pub fn open_row_edit(&mut self, project_id: ProjectId) -> Result<(), WorkflowError> {
        self.ensure_no_modal()?;
        if !self.list.contains(project_id) {
            return Err(WorkflowError::UnknownProject(project_id));
        }
        let project = self
            .service
            .get_project(project_id)
            .map_err(WorkflowError::Load)?;
        info!(
            "event=edit_open module=desk status=ok origin=row project_id={project_id} versions={}",
            project.versions.len()
        );
        self.edit_dialog = Some(EditDialog::new(project, EditOrigin::Row));
        Ok(())
    }

    fn ensure_no_modal(&self) -> Result<(), WorkflowError> {
        if self.edit_dialog.is_some() || self.confirmations.pending().is_some() {
            return Err(WorkflowError::DialogOpen);
        }
        Ok(())
    }

    pub fn edit_dialog(&self) -> Option<&EditDialog> {
        self.edit_dialog.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut ProjectForm> {
        self.edit_dialog.as_mut().map(|dialog| &mut dialog.form)
    }

    pub fn edit_commit_enabled(&self) -> bool {
        self.edit_dialog.as_ref().is_some_and(|dialog| {
            commit_enabled(
                &dialog.form,
                self.is_busy(MutationTarget::Project(dialog.project.id)),
            )
        })
    }

    /// Closes the edit dialog without committing. Refused while a commit or
    /// a stacked confirmation is outstanding.
    pub fn cancel_edit_dialog(&mut self) -> bool {
        let Some(dialog) = &self.edit_dialog else {
            return false;
        };
        if self.confirmations.pending().is_some()
            || self.is_busy(MutationTarget::Project(dialog.project.id))
        {
            return false;
        }
        self.close_edit_dialog();
        true
    }

    fn close_edit_dialog(&mut self) {
        if let Some(dialog) = self.edit_dialog.take() {
            let panel_edit = matches!(
                self.panel.ready().and_then(|ready| ready.dialog()),
                Some(PanelDialog::Edit(_))
            );
            if dialog.origin == EditOrigin::Panel && panel_edit {
                self.panel.clear_dialog();
            }
        }
    }

    /// Validates the edit form and registers the commit.
    ///
    /// # Errors
    /// - `NoDialog` when no edit dialog is open.
    /// - `Validation` when the form is invalid.
    /// - `Busy` when a commit on the project is outstanding.
    pub fn submit_edit(&mut self) -> Result<CommitTicket, WorkflowError> {
        let dialog = self.edit_dialog.as_ref().ok_or(WorkflowError::NoDialog)?;
        let mut update = ProjectUpdate::fields(dialog.form.snapshot()?);
        update.bodies = dialog.form.bodies().map(<[_]>::to_vec);
        let project_id = dialog.project.id;
        let ticket = self.begin(PendingMutation::Update { project_id, update })?;
        if self.is_panel_target(ticket.target) {
            self.panel.set_busy(true);
        }
        Ok(ticket)
    }

    /// `submit_edit` followed by `resolve`.
    pub fn save_edit(&mut self, now: Instant) -> Result<MutationReport, WorkflowError> {
        let ticket = self.submit_edit()?;
        self.resolve(ticket, now)
    }

    /// Asks to delete the project identified by `project_id`.
    pub fn request_delete(&mut self, project_id: ProjectId) -> Result<RequestId, WorkflowError> {
        let name = match self.list.get(project_id) {
            Some(row) => row.name.clone(),
            None => self
                .panel
                .ready()
                .map(|ready| ready.project())
                .filter(|project| project.id == project_id)
                .map(|project| project.name.clone())
                .ok_or(WorkflowError::UnknownProject(project_id))?,
        };
        let message = format!("Delete \"{name}\"? This cannot be undone.");
        self.request(
            ConfirmAction::Delete { project_id, name },
            "Delete project",
            message,
        )
    }

    /// Name-addressed delete; ambiguous names are refused.
    pub fn request_delete_by_name(&mut self, name: &str) -> Result<RequestId, WorkflowError> {
        let project_id = self.list.find_by_name(name)?.id;
        self.request_delete(project_id)
    }

    /// Asks to restore `version_id`. With the edit dialog open the version
    /// comes from its history table and the confirmation stacks on top of it;
    /// otherwise the panel must be ready.
    pub fn request_restore(&mut self, version_id: VersionId) -> Result<RequestId, WorkflowError> {
        let project = match &self.edit_dialog {
            Some(dialog) => &dialog.project,
            None => self.panel.ready().ok_or(PanelError::NotReady)?.project(),
        };
        let version = project
            .version(version_id)
            .ok_or(PanelError::UnknownVersion(version_id))?;
        let message = format!("Restore {} of \"{}\"?", version.label(), project.name);
        let action = ConfirmAction::Restore {
            project_id: project.id,
            version_id,
        };
        self.request(action, "Restore version", message)
    }

    /// Asks to archive the open project.
    pub fn request_archive(&mut self) -> Result<RequestId, WorkflowError> {
        let project = self.panel.ready().ok_or(PanelError::NotReady)?.project();
        let message = format!("Archive \"{}\"?", project.name);
        let action = ConfirmAction::Archive {
            project_id: project.id,
        };
        self.request(action, "Archive project", message)
    }

    fn request(
        &mut self,
        action: ConfirmAction,
        title: &str,
        message: String,
    ) -> Result<RequestId, WorkflowError> {
        let project_id = action.project_id();
        let kind = action.kind();
        if self.is_busy(MutationTarget::Project(project_id)) {
            return Err(WorkflowError::Busy(MutationTarget::Project(project_id)));
        }
        let over_edit = match &self.edit_dialog {
            Some(dialog) if dialog.project.id == project_id && kind == MutationKind::Restore => {
                true
            }
            Some(_) => return Err(WorkflowError::DialogOpen),
            None => false,
        };
        let on_panel = !over_edit
            && self
                .panel
                .ready()
                .is_some_and(|ready| ready.project().id == project_id);
        if on_panel && self.panel.ready().is_some_and(|ready| ready.dialog().is_some()) {
            return Err(PanelError::DialogOpen.into());
        }

        let request_id = self.confirmations.request(action, title, message)?;
        if on_panel {
            self.panel.open_dialog(PanelDialog::Confirm(request_id))?;
        }
        info!(
            "event=confirm module=desk status=requested request_id={request_id} op={} project_id={project_id} over_edit={over_edit}",
            kind.as_str()
        );
        Ok(request_id)
    }

    /// Resolves the pending confirmation. Accept registers the commit;
    /// dismiss aborts without a backend call. An accepted delete keeps its
    /// panel dialog until the deletion settles.
    pub fn answer_confirmation(
        &mut self,
        request_id: RequestId,
        decision: Decision,
    ) -> Result<MutationOutcome<CommitTicket>, WorkflowError> {
        let resolution = self.confirmations.answer(request_id, decision)?;
        let action = match resolution {
            Resolution::Dismissed(action) => {
                self.clear_panel_confirm(Some(request_id));
                info!(
                    "event=confirm module=desk status=aborted request_id={request_id} op={}",
                    action.kind().as_str()
                );
                return Ok(MutationOutcome::Aborted);
            }
            Resolution::Accepted(action) => action,
        };
        if action.kind() != MutationKind::Delete {
            self.clear_panel_confirm(Some(request_id));
        }

        let ticket = match self.begin(PendingMutation::from(action)) {
            Ok(ticket) => ticket,
            Err(err) => {
                self.clear_panel_confirm(Some(request_id));
                return Err(err);
            }
        };
        if self.is_panel_target(ticket.target) {
            self.panel.set_busy(true);
        }
        Ok(MutationOutcome::Proceed(ticket))
    }

    /// `answer_confirmation` followed by `resolve` when accepted.
    pub fn confirm(
        &mut self,
        request_id: RequestId,
        decision: Decision,
        now: Instant,
    ) -> Result<MutationOutcome<MutationReport>, WorkflowError> {
        match self.answer_confirmation(request_id, decision)? {
            MutationOutcome::Proceed(ticket) => {
                Ok(MutationOutcome::Proceed(self.resolve(ticket, now)?))
            }
            MutationOutcome::Aborted => Ok(MutationOutcome::Aborted),
        }
    }

    /// Issues the backend call for `ticket` and queues its toast.
    ///
    /// Edit, restore and archive refresh the list, open dialogs and the panel
    /// right away. Create and delete settle on the `tick` that first sees
    /// their success toast.
    ///
    /// # Errors
    /// - `UnknownTicket` when the ticket was already resolved.
    /// - `Backend` when the backend rejected the call; a failure toast was
    ///   queued and dialogs and panel are unchanged.
    /// - `Refresh` when the post-commit reload failed.
    pub fn resolve(
        &mut self,
        ticket: CommitTicket,
        now: Instant,
    ) -> Result<MutationReport, WorkflowError> {
        let mutation = self.in_flight.take(&ticket)?;
        let kind = mutation.kind();
        let result = self.commit(mutation);
        if self.is_panel_target(ticket.target) {
            self.panel.set_busy(false);
        }

        let committed = match result {
            Ok(committed) => committed,
            Err(source) => {
                warn!(
                    "event=mutation module=desk status=error op={} error={source}",
                    kind.as_str()
                );
                if kind == MutationKind::Delete {
                    self.clear_panel_confirm(None);
                }
                self.toasts
                    .push(ToastKind::Failure, kind.failure_message(&source), now);
                return Err(WorkflowError::Backend { kind, source });
            }
        };

        let project_id = committed.project_id();
        let toast_id = self
            .toasts
            .push(ToastKind::Success, kind.success_message(), now);
        info!(
            "event=mutation module=desk status=ok op={} project_id={project_id} toast_id={toast_id}",
            kind.as_str()
        );

        if let Committed::Saved(project) = committed {
            self.apply_saved(kind, project);
        }
        let report = MutationReport {
            kind,
            project_id,
            toast_id,
        };
        if matches!(kind, MutationKind::Create | MutationKind::Delete) {
            debug!(
                "event=mutation module=desk status=awaiting_feedback op={} project_id={project_id} toast_id={toast_id}",
                kind.as_str()
            );
            self.settling.push(Settling {
                toast_id,
                kind,
                target: ticket.target,
                project_id,
            });
            return Ok(report);
        }

        self.refresh_list()?;
        Ok(report)
    }

    /// Moves a saved project into the edit dialog and the panel.
    fn apply_saved(&mut self, kind: MutationKind, project: Project) {
        let open_edit = self
            .edit_dialog
            .as_ref()
            .is_some_and(|dialog| dialog.project.id == project.id);
        match kind {
            MutationKind::Update if open_edit => self.close_edit_dialog(),
            MutationKind::Restore if open_edit => {
                if let Some(dialog) = self.edit_dialog.as_mut() {
                    dialog.reload(&project);
                }
            }
            _ => {}
        }

        let project_id = project.id;
        let shown = self
            .panel
            .ready()
            .is_some_and(|ready| ready.project().id == project_id);
        if shown {
            if let Err(err) = self.panel.replace_project(project) {
                debug!("event=mutation module=desk status=stale project_id={project_id} error={err}");
            }
        } else if self.panel.project_id() == Some(project_id) {
            debug!(
                "event=mutation module=desk status=stale op={} project_id={project_id} phase={:?}",
                kind.as_str(),
                self.panel.phase()
            );
        }
    }

    /// Closes whatever still shows a project that is now gone.
    fn close_deleted(&mut self, project_id: ProjectId) {
        if self
            .edit_dialog
            .as_ref()
            .is_some_and(|dialog| dialog.project.id == project_id)
        {
            self.close_edit_dialog();
        }
        if self.panel.project_id() == Some(project_id) {
            self.panel.clear_dialog();
            self.panel.close(CloseTrigger::CloseButton);
        }
    }

    /// Drops a confirm dialog shown on the panel; `None` matches any request.
    fn clear_panel_confirm(&mut self, request_id: Option<RequestId>) {
        let shown = match self.panel.ready().and_then(|ready| ready.dialog()) {
            Some(PanelDialog::Confirm(shown)) => *shown,
            _ => return,
        };
        if request_id.map_or(true, |id| id == shown) {
            self.panel.clear_dialog();
        }
    }

    fn begin(&mut self, mutation: PendingMutation) -> Result<CommitTicket, WorkflowError> {
        let target = mutation.target();
        if self.awaiting_feedback(target) {
            return Err(WorkflowError::Busy(target));
        }
        self.in_flight.begin(mutation)
    }

    fn is_busy(&self, target: MutationTarget) -> bool {
        self.in_flight.is_busy(target) || self.awaiting_feedback(target)
    }

    fn awaiting_feedback(&self, target: MutationTarget) -> bool {
        self.settling.iter().any(|settling| settling.target == target)
    }

    fn commit(&self, mutation: PendingMutation) -> ServiceResult<Committed> {
        match mutation {
            PendingMutation::Create(snapshot) => {
                self.service.create_project(&snapshot).map(Committed::Saved)
            }
            PendingMutation::Update { project_id, update } => self
                .service
                .update_project(project_id, &update)
                .map(Committed::Saved),
            PendingMutation::Delete(project_id) => self
                .service
                .delete_project(project_id)
                .map(|()| Committed::Deleted(project_id)),
            PendingMutation::Restore {
                project_id,
                version_id,
            } => self
                .service
                .restore_version(project_id, version_id)
                .map(Committed::Saved),
            PendingMutation::Archive(project_id) => self
                .service
                .archive_project(project_id)
                .map(Committed::Saved),
        }
    }

    fn is_panel_target(&self, target: MutationTarget) -> bool {
        match target {
            MutationTarget::Project(id) => self.panel.project_id() == Some(id),
            MutationTarget::NewProject => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectDesk;
    use crate::config::DeskConfig;
    use crate::db::open_db_in_memory;
    use crate::feedback::confirm::Decision;
    use crate::repo::project_repo::SqliteProjectRepository;
    use crate::workflow::mutation::{MutationOutcome, WorkflowError};
    use std::time::Instant;

    #[test]
    fn invalid_form_never_registers_a_commit() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteProjectRepository::try_new(&conn).unwrap();
        let mut desk = ProjectDesk::new(repo, DeskConfig::default());

        desk.open_create_dialog().set_name("   ");
        assert!(!desk.create_commit_enabled());
        assert!(matches!(
            desk.submit_create(),
            Err(WorkflowError::Validation(_))
        ));
        assert!(desk.is_create_dialog_open());
    }

    #[test]
    fn dismissed_delete_keeps_row() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteProjectRepository::try_new(&conn).unwrap();
        let mut desk = ProjectDesk::new(repo, DeskConfig::default());
        let now = Instant::now();

        desk.open_create_dialog().set_name("Keep Me");
        let report = desk.create_project(now).unwrap();
        desk.tick(now + desk.config().toast_reveal_delay()).unwrap();

        let request = desk.request_delete(report.project_id).unwrap();
        let outcome = desk.confirm(request, Decision::Dismiss, now).unwrap();
        assert_eq!(outcome, MutationOutcome::Aborted);
        assert!(desk.list().contains(report.project_id));
        assert!(desk.pending_confirmation().is_none());
    }
}
