use serde::{Deserialize, Serialize};

use super::CourseCode;

/// One outstanding degree requirement reconstructed from the audit.
///
/// `select_from` and `not_from` are ordered sets: codes keep the order in
/// which they were gathered and are never repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// The full `NEEDS:` text, including any continuation lines up to `HOURS`.
    #[serde(rename = "requirement_description", alias = "description")]
    pub description: String,
    pub hours_needed: f64,
    /// Heading gathered above the `NEEDS:` block. Empty when none qualified.
    pub requirement_type: String,
    pub select_from: Vec<CourseCode>,
    pub not_from: Vec<CourseCode>,
    /// `NEEDS:` blocks that followed an `OR)` marker and were merged into
    /// this requirement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativeBlock>,
}

/// The raw text of an OR-merged `NEEDS:` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeBlock {
    pub description: String,
    pub hours_needed: Option<f64>,
}

impl Requirement {
    pub fn new(
        description: impl Into<String>,
        hours_needed: f64,
        requirement_type: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            hours_needed,
            requirement_type: requirement_type.into(),
            select_from: Vec::new(),
            not_from: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Builder-style helper for tests and callers assembling requirements by hand.
    #[must_use]
    pub fn select(mut self, codes: &[&str]) -> Self {
        self.extend_select_from(codes.iter().map(|c| CourseCode::new(*c)));
        self
    }

    /// Builder-style counterpart of [`select`](Self::select) for `not_from`.
    #[must_use]
    pub fn exclude(mut self, codes: &[&str]) -> Self {
        self.extend_not_from(codes.iter().map(|c| CourseCode::new(*c)));
        self
    }

    pub fn extend_select_from(&mut self, codes: impl IntoIterator<Item = CourseCode>) {
        append_unique(&mut self.select_from, codes);
    }

    pub fn extend_not_from(&mut self, codes: impl IntoIterator<Item = CourseCode>) {
        append_unique(&mut self.not_from, codes);
    }

    /// Whether `code` is ruled out by this requirement's `not_from` list.
    #[must_use]
    pub fn excludes(&self, code: &CourseCode) -> bool {
        self.not_from
            .iter()
            .any(|excluded| CourseCode::normalize(excluded.as_str()).matches(code))
    }
}

fn append_unique(list: &mut Vec<CourseCode>, codes: impl IntoIterator<Item = CourseCode>) {
    for code in codes {
        if !list.contains(&code) {
            list.push(code);
        }
    }
}
