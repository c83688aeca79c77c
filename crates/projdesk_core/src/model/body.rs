//! Project body records.
//!
//! # Invariants
//! - All three dimensions are finite and strictly positive.
//! - `index` is the 0-based position inside the owning project.

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type BodyId = Uuid;

/// Width, height and depth of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl BodyDimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn validate(&self) -> Result<(), BodyValidationError> {
        for (axis, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BodyValidationError::NonPositiveDimension { axis, value });
            }
        }
        Ok(())
    }

    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }

    pub fn largest(&self) -> f64 {
        self.width.max(self.height).max(self.depth)
    }
}

/// One body owned by a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub project_id: ProjectId,
    pub index: u32,
    pub dimensions: BodyDimensions,
}

impl Body {
    pub fn validate(&self) -> Result<(), BodyValidationError> {
        self.dimensions.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyValidationError {
    NonPositiveDimension { axis: &'static str, value: f64 },
}

impl Display for BodyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveDimension { axis, value } => {
                write!(f, "body {axis} must be a positive number, got {value}")
            }
        }
    }
}

impl Error for BodyValidationError {}

#[cfg(test)]
mod tests {
    use super::{BodyDimensions, BodyValidationError};

    #[test]
    fn rejects_zero_and_nan_dimensions() {
        let zero = BodyDimensions::new(1.0, 0.0, 2.0);
        assert!(matches!(
            zero.validate(),
            Err(BodyValidationError::NonPositiveDimension { axis: "height", .. })
        ));

        let nan = BodyDimensions::new(f64::NAN, 1.0, 1.0);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn volume_and_largest() {
        let dims = BodyDimensions::new(2.0, 3.0, 4.0);
        assert_eq!(dims.volume(), 24.0);
        assert_eq!(dims.largest(), 4.0);
    }
}
