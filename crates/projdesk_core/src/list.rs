//! Project list view model.
//!
//! Rows are addressed by project id. Name lookup exists for presentation
//! checks and reports ambiguity instead of picking a row by position.

use crate::model::project::{ProjectId, ProjectStatus, ProjectSummary};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRow {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub version_count: u32,
    pub body_count: u32,
    pub updated_at: i64,
}

impl From<ProjectSummary> for ProjectRow {
    fn from(value: ProjectSummary) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
            version_count: value.version_count,
            body_count: value.body_count,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound(String),
    /// Several rows display the same name; resolve by id.
    Ambiguous { name: String, ids: Vec<ProjectId> },
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "no project row named `{name}`"),
            Self::Ambiguous { name, ids } => {
                write!(f, "{} project rows are named `{name}`", ids.len())
            }
        }
    }
}

impl Error for LookupError {}

/// Loaded rows; `None` until the first successful load.
#[derive(Debug, Clone, Default)]
pub struct ProjectList {
    rows: Option<Vec<ProjectRow>>,
}

impl ProjectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, summaries: Vec<ProjectSummary>) {
        self.rows = Some(summaries.into_iter().map(ProjectRow::from).collect());
    }

    pub fn is_loaded(&self) -> bool {
        self.rows.is_some()
    }

    pub fn rows(&self) -> &[ProjectRow] {
        self.rows.as_deref().unwrap_or_default()
    }

    /// Loaded and without rows.
    pub fn is_empty(&self) -> bool {
        self.rows.as_ref().is_some_and(Vec::is_empty)
    }

    pub fn get(&self, id: ProjectId) -> Option<&ProjectRow> {
        self.rows().iter().find(|row| row.id == id)
    }

    pub fn contains(&self, id: ProjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.rows().iter().any(|row| row.name == name)
    }

    /// Exact-name lookup.
    ///
    /// # Errors
    /// - `NotFound` when no row matches.
    /// - `Ambiguous` when several rows match.
    pub fn find_by_name(&self, name: &str) -> Result<&ProjectRow, LookupError> {
        let matches: Vec<&ProjectRow> = self.rows().iter().filter(|row| row.name == name).collect();
        match matches.as_slice() {
            [] => Err(LookupError::NotFound(name.to_string())),
            [row] => Ok(row),
            many => Err(LookupError::Ambiguous {
                name: name.to_string(),
                ids: many.iter().map(|row| row.id).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupError, ProjectList};
    use crate::model::project::{ProjectStatus, ProjectSummary};
    use uuid::Uuid;

    fn summary(name: &str) -> ProjectSummary {
        ProjectSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: ProjectStatus::Active,
            updated_at: 0,
            version_count: 1,
            body_count: 0,
        }
    }

    #[test]
    fn unloaded_list_is_not_empty_state() {
        let list = ProjectList::new();
        assert!(!list.is_loaded());
        assert!(!list.is_empty());
        assert!(list.rows().is_empty());
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let mut list = ProjectList::new();
        let first = summary("Twin");
        let second = summary("Twin");
        let (first_id, second_id) = (first.id, second.id);
        list.replace(vec![first, second, summary("Solo")]);

        let err = list.find_by_name("Twin").unwrap_err();
        assert_eq!(
            err,
            LookupError::Ambiguous {
                name: "Twin".to_string(),
                ids: vec![first_id, second_id]
            }
        );
        assert!(list.get(second_id).is_some());
        assert_eq!(list.find_by_name("Solo").unwrap().name, "Solo");
    }
}
