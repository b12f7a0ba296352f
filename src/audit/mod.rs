//! Degree-audit text into a structured [`DegreeAudit`].
//!
//! The audit is read as a stream of trimmed lines. Requirement blocks open at
//! `NEEDS:` markers and collect the course lists that follow (`SELECT FROM:`,
//! `NOT FROM:`); a `NEEDS:` block preceded by `OR)` is folded into the block
//! before it.

mod classify;
mod segment;
mod tokens;
mod transcript;

use std::path::Path;

pub use classify::{
    gather_heading_for_needs, is_block_boundary, is_heading_candidate, is_possible_course_line,
    should_skip_heading_line,
};
pub use tokens::parse_course_tokens;

use crate::{CourseMatchError, DegreeAudit, TextLine};

/// Lines scanned above a `NEEDS:` marker when looking for its heading.
pub const DEFAULT_HEADING_LOOKBACK: usize = 10;

/// Parser for degree-audit text.
///
/// # Example
///
/// ```
/// use coursematch::AuditParser;
///
/// let audit = AuditParser::new().parse_text(
///     "CS THEORY REQUIREMENT\n\
///      NEEDS: 3.00 HOURS\n\
///      SELECT FROM: CS 4104, 4114",
/// );
/// let req = &audit.requirements_needed[0];
/// assert_eq!(req.requirement_type, "CS THEORY REQUIREMENT");
/// assert_eq!(req.select_from.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditParser {
    heading_lookback: usize,
}

impl Default for AuditParser {
    fn default() -> Self {
        Self {
            heading_lookback: DEFAULT_HEADING_LOOKBACK,
        }
    }
}

impl AuditParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines above each `NEEDS:` marker searched for a heading.
    #[must_use]
    pub fn heading_lookback(mut self, lines: usize) -> Self {
        self.heading_lookback = lines;
        self
    }

    /// Parse raw lines. Lines are trimmed and blank ones dropped first.
    pub fn parse_lines<I, S>(&self, lines: I) -> DegreeAudit
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = TextLine::collect(lines);
        let (completed_courses, in_progress_courses) = transcript::extract_courses(&lines);
        let requirements_needed =
            segment::Segmenter::new(&lines, self.heading_lookback).run();
        tracing::debug!(
            lines = lines.len(),
            requirements = requirements_needed.len(),
            completed = completed_courses.len(),
            in_progress = in_progress_courses.len(),
            "parsed degree audit"
        );
        DegreeAudit {
            student_info: transcript::extract_student_info(&lines),
            completed_courses,
            in_progress_courses,
            requirements_needed,
        }
    }

    #[must_use]
    pub fn parse_text(&self, text: &str) -> DegreeAudit {
        self.parse_lines(text.lines())
    }

    /// Read and parse an audit text file.
    ///
    /// # Errors
    ///
    /// Returns [`CourseMatchError::Io`] if the file cannot be read.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DegreeAudit, CourseMatchError> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.parse_text(&text))
    }
}

/// Parse audit text with default settings.
#[must_use]
pub fn parse_audit(text: &str) -> DegreeAudit {
    AuditParser::new().parse_text(text)
}
