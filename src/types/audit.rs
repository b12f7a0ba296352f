use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CompletedCourses, Requirement};
use crate::CourseMatchError;

/// Identity block at the top of the audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub student_id: String,
    pub name: String,
    pub program: String,
}

/// A course line from the audit's coursework listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_id: String,
    pub credits: String,
    /// A letter grade, `TR`, `AP`, `In-Progress`, or `Completed` when the
    /// line carried no marker.
    pub status: String,
}

/// Structured result of parsing a degree audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DegreeAudit {
    #[serde(default)]
    pub student_info: StudentInfo,
    #[serde(default)]
    pub completed_courses: Vec<CourseRecord>,
    #[serde(default)]
    pub in_progress_courses: Vec<CourseRecord>,
    #[serde(default)]
    pub requirements_needed: Vec<Requirement>,
}

impl DegreeAudit {
    /// Completed and in-progress courses together, canonicalized.
    #[must_use]
    pub fn completed_set(&self) -> CompletedCourses {
        self.completed_courses
            .iter()
            .chain(&self.in_progress_courses)
            .map(|record| record.course_id.as_str())
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`CourseMatchError::Json`] if `json` is not a valid audit document.
    pub fn from_json(json: &str) -> Result<Self, CourseMatchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns [`CourseMatchError`] on I/O or JSON failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CourseMatchError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// # Errors
    ///
    /// Returns [`CourseMatchError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, CourseMatchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
