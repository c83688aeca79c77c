//! Create / edit form state.
//!
//! # Invariants
//! - Validity is a pure function of the current field values.
//! - A valid form always converts into a valid `ProjectSnapshot`.

use crate::model::body::{BodyDimensions, BodyValidationError};
use crate::model::project::{Project, ProjectSnapshot};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    NameRequired,
    InvalidBody {
        index: usize,
        error: BodyValidationError,
    },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => write!(f, "name is required"),
            Self::InvalidBody { index, error } => write!(f, "body #{index}: {error}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBody { error, .. } => Some(error),
            Self::NameRequired => None,
        }
    }
}

/// Field values of the project dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    name: String,
    description: String,
    bodies: Option<Vec<BodyDimensions>>,
}

impl ProjectForm {
    /// Empty form used by the create dialog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Form prefilled from the project's current fields for editing.
    pub fn for_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone().unwrap_or_default(),
            bodies: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    /// Appends typed characters to the name field.
    pub fn type_name(&mut self, keys: &str) {
        self.name.push_str(keys);
    }

    pub fn type_description(&mut self, keys: &str) {
        self.description.push_str(keys);
    }

    /// Requests replacement of the project's body list on commit.
    pub fn set_bodies(&mut self, bodies: Vec<BodyDimensions>) {
        self.bodies = Some(bodies);
    }

    pub fn bodies(&self) -> Option<&[BodyDimensions]> {
        self.bodies.as_deref()
    }

    /// All current violations, in field order.
    pub fn errors(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FormError::NameRequired);
        }
        if let Some(bodies) = &self.bodies {
            for (index, dimensions) in bodies.iter().enumerate() {
                if let Err(error) = dimensions.validate() {
                    errors.push(FormError::InvalidBody { index, error });
                }
            }
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Converts the form into a committed snapshot.
    ///
    /// # Errors
    /// - The first violation from `errors()`.
    pub fn snapshot(&self) -> Result<ProjectSnapshot, FormError> {
        if let Some(error) = self.errors().into_iter().next() {
            return Err(error);
        }
        Ok(ProjectSnapshot::new(
            &self.name,
            Some(self.description.as_str()),
        ))
    }
}

/// Commit control state: enabled exactly when the form is valid and no commit
/// for the same entity is outstanding.
pub fn commit_enabled(form: &ProjectForm, in_flight: bool) -> bool {
    form.is_valid() && !in_flight
}

#[cfg(test)]
mod tests {
    use super::{commit_enabled, FormError, ProjectForm};
    use crate::model::body::BodyDimensions;

    #[test]
    fn validity_tracks_every_keystroke() {
        let mut form = ProjectForm::new();
        assert!(!commit_enabled(&form, false));

        form.type_name(" ");
        assert!(!commit_enabled(&form, false));

        form.type_name("A");
        assert!(commit_enabled(&form, false));

        form.set_name("");
        assert!(!commit_enabled(&form, false));
    }

    #[test]
    fn in_flight_commit_disables_control() {
        let mut form = ProjectForm::new();
        form.set_name("Alpha");
        assert!(!commit_enabled(&form, true));
    }

    #[test]
    fn description_is_optional() {
        let mut form = ProjectForm::new();
        form.set_name("Alpha");
        let snapshot = form.snapshot().expect("valid form");
        assert_eq!(snapshot.name, "Alpha");
        assert_eq!(snapshot.description, None);
    }

    #[test]
    fn invalid_body_blocks_snapshot() {
        let mut form = ProjectForm::new();
        form.set_name("Alpha");
        form.set_bodies(vec![
            BodyDimensions::new(1.0, 1.0, 1.0),
            BodyDimensions::new(1.0, -2.0, 1.0),
        ]);
        assert!(matches!(
            form.snapshot(),
            Err(FormError::InvalidBody { index: 1, .. })
        ));
    }
}
