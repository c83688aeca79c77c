//! Detail panel view model.
//!
//! # Invariants
//! - Exactly four stats labelled CREATED, UPDATED, VERSIONS, BODIES.
//! - Exactly three footer actions: edit, archive, delete.
//! - Exactly one version item is highlighted when versions exist.

use crate::model::project::{Project, ProjectStatus};
use crate::model::version::VersionId;
use crate::panel::bodies::{render_bodies, view_controls, BodiesView, ViewMode, ViewModeControl};
use time::macros::format_description;
use time::OffsetDateTime;

pub const STAT_LABELS: [&str; 4] = ["CREATED", "UPDATED", "VERSIONS", "BODIES"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterAction {
    Edit,
    Archive,
    Delete,
}

impl FooterAction {
    pub const ALL: [FooterAction; 3] = [
        FooterAction::Edit,
        FooterAction::Archive,
        FooterAction::Delete,
    ];

    /// Icon name rendered on the button.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Archive => "archive",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    /// Short identifier badge (first 8 hex chars).
    pub id_badge: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionItem {
    pub id: VersionId,
    pub label: String,
    pub name: String,
    /// Display selection; drives the highlighted row.
    pub highlighted: bool,
    /// Persisted active flag.
    pub is_active: bool,
    pub is_latest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub status: ProjectStatus,
    pub actions: [FooterAction; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub header: Header,
    pub stats: [Stat; 4],
    pub versions: Vec<VersionItem>,
    pub view_controls: [ViewModeControl; 3],
    pub bodies: BodiesView,
    pub footer: Footer,
    /// A commit on this project is outstanding.
    pub busy: bool,
}

impl DetailView {
    pub fn highlighted_version(&self) -> Option<&VersionItem> {
        self.versions.iter().find(|item| item.highlighted)
    }
}

pub(crate) fn render_detail(
    project: &Project,
    view_mode: ViewMode,
    selected_version: Option<VersionId>,
    busy: bool,
) -> DetailView {
    let versions = project
        .versions
        .iter()
        .map(|version| VersionItem {
            id: version.id,
            label: version.label(),
            name: version.payload.name.clone(),
            highlighted: Some(version.id) == selected_version,
            is_active: version.is_active,
            is_latest: version.is_latest,
        })
        .collect();

    DetailView {
        header: Header {
            title: project.name.clone(),
            id_badge: project.id.simple().to_string().chars().take(8).collect(),
        },
        stats: [
            Stat {
                label: STAT_LABELS[0],
                value: format_date(project.created_at),
            },
            Stat {
                label: STAT_LABELS[1],
                value: format_date(project.updated_at),
            },
            Stat {
                label: STAT_LABELS[2],
                value: project.versions.len().to_string(),
            },
            Stat {
                label: STAT_LABELS[3],
                value: project.bodies.len().to_string(),
            },
        ],
        versions,
        view_controls: view_controls(view_mode),
        bodies: render_bodies(&project.bodies, view_mode),
        footer: Footer {
            status: project.status,
            actions: FooterAction::ALL,
        },
        busy,
    }
}

fn format_date(epoch_ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|moment| moment.format(&format).ok())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::format_date;

    #[test]
    fn formats_epoch_millis_as_calendar_date() {
        assert_eq!(format_date(0), "1970-01-01");
        assert_eq!(format_date(1_700_000_000_000), "2023-11-14");
    }

    #[test]
    fn out_of_range_dates_render_placeholder() {
        assert_eq!(format_date(i64::MAX), "-");
    }
}
