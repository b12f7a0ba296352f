use std::path::Path;

use serde::{Deserialize, Serialize};

use super::CourseCode;
use crate::CourseMatchError;

/// An open section from the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSection {
    #[serde(default)]
    pub crn: String,
    /// Section code as listed, e.g. `CS-2506-01`.
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub location: String,
}

/// A section row as stored by the timetable scraper, with a single `time`
/// column instead of separate start/end times.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionRow {
    #[serde(default)]
    pub crn: String,
    pub section_code: String,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub instructor: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SectionRecord {
    Open(OpenSection),
    Row(SectionRow),
}

impl OpenSection {
    pub fn new(code: impl Into<String>, instructor: impl Into<String>) -> Self {
        Self {
            crn: String::new(),
            code: code.into(),
            name: String::new(),
            instructor: instructor.into(),
            days: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            location: String::new(),
        }
    }

    /// The section's course in canonical form (`CS-2506-01` -> `CS2506`).
    #[must_use]
    pub fn course_code(&self) -> CourseCode {
        CourseCode::normalize(&self.code)
    }

    /// Parse a JSON array of sections. Entries may be full [`OpenSection`]s
    /// or raw [`SectionRow`]s.
    ///
    /// # Errors
    ///
    /// Returns [`CourseMatchError::Json`] if the array is malformed.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, CourseMatchError> {
        let records: Vec<SectionRecord> = serde_json::from_str(json)?;
        Ok(records
            .into_iter()
            .map(|record| match record {
                SectionRecord::Open(section) => section,
                SectionRecord::Row(row) => row.into(),
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns [`CourseMatchError`] on I/O or JSON failure.
    pub fn list_from_file(path: impl AsRef<Path>) -> Result<Vec<Self>, CourseMatchError> {
        Self::list_from_json(&std::fs::read_to_string(path)?)
    }
}

impl From<SectionRow> for OpenSection {
    fn from(row: SectionRow) -> Self {
        let (start_time, end_time) = split_time_range(&row.time);
        Self {
            crn: row.crn,
            code: row.section_code,
            name: String::new(),
            instructor: row.instructor,
            days: row.days,
            start_time,
            end_time,
            location: row.location,
        }
    }
}

/// Split `"9:05AM - 9:55AM"` into its two ends. Anything that is not exactly
/// one `start-end` pair (e.g. `"ONLINE"` or `"TBA"`) yields two empty strings.
#[must_use]
pub fn split_time_range(time: &str) -> (String, String) {
    let parts: Vec<&str> = time.split('-').collect();
    match parts.as_slice() {
        [start, end] => (start.trim().to_owned(), end.trim().to_owned()),
        _ => (String::new(), String::new()),
    }
}
