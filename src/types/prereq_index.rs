use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CompletedCourses, CourseCode, PrereqExpr};
use crate::CourseMatchError;

/// Catalog entry carrying the raw prerequisite and corequisite text of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRequirements {
    pub course_code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub prerequisites: String,
    #[serde(default)]
    pub corequisites: String,
}

impl CourseRequirements {
    /// The parsed prerequisite tree, or `None` when the course lists none.
    #[must_use]
    pub fn prerequisite_expr(&self) -> Option<PrereqExpr> {
        crate::parse::parse_requirement(&self.prerequisites)
    }

    /// The parsed corequisite tree, or `None` when the course lists none.
    #[must_use]
    pub fn corequisite_expr(&self) -> Option<PrereqExpr> {
        crate::parse::parse_requirement(&self.corequisites)
    }
}

/// Parsed prerequisite trees keyed by canonical course code.
///
/// Courses without an entry have no prerequisites on file and are treated
/// as satisfied; see [`PrereqIndex::prereqs_satisfied`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, PrereqExpr>",
    into = "BTreeMap<CourseCode, PrereqExpr>"
)]
pub struct PrereqIndex {
    pub(crate) entries: BTreeMap<CourseCode, PrereqExpr>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexSource {
    Parsed(PrereqIndex),
    Records(Vec<CourseRequirements>),
}

impl PrereqIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parsed tree under the canonical form of `code`.
    pub fn insert(&mut self, code: &str, expr: PrereqExpr) {
        self.entries.insert(CourseCode::normalize(code), expr);
    }

    /// Parse `raw` and register it. Blank text registers nothing.
    pub fn insert_raw(&mut self, code: &str, raw: &str) {
        if let Some(expr) = crate::parse::parse_requirement(raw) {
            self.insert(code, expr);
        }
    }

    /// Build an index from catalog records, parsing each prerequisite string once.
    #[must_use]
    pub fn from_requirements<'a>(
        records: impl IntoIterator<Item = &'a CourseRequirements>,
    ) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert_raw(&record.course_code, &record.prerequisites);
        }
        index
    }

    /// Look up the tree for `code`, canonicalizing it first.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&PrereqExpr> {
        self.entries.get(&CourseCode::normalize(code))
    }

    /// Whether the student meets the prerequisites of `code`.
    ///
    /// A course with no entry in the index has no prerequisites on file and
    /// is reported as satisfied.
    #[must_use]
    pub fn prereqs_satisfied(&self, code: &str, completed: &CompletedCourses) -> bool {
        crate::evaluate::prereqs_satisfied(code, completed, self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CourseCode, &PrereqExpr)> {
        self.entries.iter()
    }

    /// Read an index from JSON. Accepts either a map of course code to
    /// stored tree, or an array of [`CourseRequirements`] records whose raw
    /// prerequisite text is parsed on load.
    ///
    /// # Errors
    ///
    /// Returns [`CourseMatchError::Json`] if the document matches neither shape.
    pub fn from_json(json: &str) -> Result<Self, CourseMatchError> {
        Ok(match serde_json::from_str(json)? {
            IndexSource::Parsed(index) => index,
            IndexSource::Records(records) => Self::from_requirements(&records),
        })
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

    /// Encode into the checksummed binary cache format.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::SerializeError) if encoding fails.
    #[cfg(feature = "binary-cache")]
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::SerializeError> {
        crate::serial::encode(self)
    }

    /// Decode an index previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::DeserializeError) if the blob is
    /// corrupt, truncated, or from an incompatible format version.
    #[cfg(feature = "binary-cache")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// Write the binary cache to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CourseMatchError`] on encoding or I/O failure.
    #[cfg(feature = "binary-cache")]
    pub fn save_cache(&self, path: impl AsRef<Path>) -> Result<(), CourseMatchError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Read a binary cache from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CourseMatchError`] on I/O or decoding failure.
    #[cfg(feature = "binary-cache")]
    pub fn load_cache(path: impl AsRef<Path>) -> Result<Self, CourseMatchError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes)?)
    }
}

impl From<BTreeMap<String, PrereqExpr>> for PrereqIndex {
    fn from(raw: BTreeMap<String, PrereqExpr>) -> Self {
        let mut index = Self::new();
        for (code, expr) in raw {
            index.insert(&code, expr);
        }
        index
    }
}

impl From<PrereqIndex> for BTreeMap<CourseCode, PrereqExpr> {
    fn from(index: PrereqIndex) -> Self {
        index.entries
    }
}
