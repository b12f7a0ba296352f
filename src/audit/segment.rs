use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::classify::{gather_heading_for_needs, is_block_boundary, is_possible_course_line};
use super::tokens::parse_course_tokens;
use crate::{AlternativeBlock, CourseCode, Requirement, TextLine};

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)NEEDS:\s+([\d.]+)\s+HOURS").expect("hours pattern is valid")
});

const NEEDS: &str = "NEEDS:";
const OR_MARKER: &str = "OR)";
const SELECT_FROM: &str = "SELECT FROM:";
const NOT_FROM: &str = "NOT FROM:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    SelectFrom,
    NotFrom,
}

impl ListKind {
    fn marker(self) -> &'static str {
        match self {
            Self::SelectFrom => SELECT_FROM,
            Self::NotFrom => NOT_FROM,
        }
    }
}

/// Single pass over the audit lines, reconstructing requirement blocks.
///
/// State lives only for one call: the open requirement, the subject carried
/// between course lists, and whether an `OR)` marker is pending.
pub(crate) struct Segmenter<'a> {
    lines: &'a [TextLine],
    lookback: usize,
    requirements: Vec<Requirement>,
    current: Option<usize>,
    last_subject: Option<String>,
    or_mode: bool,
}

impl<'a> Segmenter<'a> {
    pub(crate) fn new(lines: &'a [TextLine], lookback: usize) -> Self {
        Self {
            lines,
            lookback,
            requirements: Vec::new(),
            current: None,
            last_subject: None,
            or_mode: false,
        }
    }

    pub(crate) fn run(mut self) -> Vec<Requirement> {
        let mut i = 0;
        while i < self.lines.len() {
            i = self.step(i);
        }
        self.requirements
    }

    /// Handle the line at `i` and return the index of the next unread line.
    fn step(&mut self, i: usize) -> usize {
        let upper = self.lines[i].text().to_ascii_uppercase();
        if upper.starts_with(OR_MARKER) {
            self.or_mode = true;
            i + 1
        } else if upper.starts_with(NEEDS) {
            self.needs_block(i)
        } else if upper.contains(SELECT_FROM) {
            self.course_list(i, ListKind::SelectFrom)
        } else if upper.contains(NOT_FROM) {
            self.course_list(i, ListKind::NotFrom)
        } else {
            i + 1
        }
    }

    fn needs_block(&mut self, start: usize) -> usize {
        let mut end = start;
        let mut combined = self.lines[start].text().to_owned();
        while !combined.to_ascii_uppercase().contains("HOURS") && end + 1 < self.lines.len() {
            end += 1;
            combined.push(' ');
            combined.push_str(self.lines[end].text());
        }
        let hours = HOURS_RE
            .captures(&combined)
            .and_then(|caps| caps[1].parse::<f64>().ok());

        if self.or_mode {
            match self.current {
                Some(open) => self.requirements[open].alternatives.push(AlternativeBlock {
                    description: combined,
                    hours_needed: hours,
                }),
                None => debug!(line = start, "OR) block with no open requirement"),
            }
        } else if let Some(hours) = hours {
            let heading = gather_heading_for_needs(self.lines, end, self.lookback);
            self.requirements
                .push(Requirement::new(combined, hours, heading));
            self.current = Some(self.requirements.len() - 1);
        } else {
            debug!(line = start, text = %combined, "discarding NEEDS block without hours");
            self.current = None;
        }
        self.or_mode = false;
        end + 1
    }

    fn course_list(&mut self, start: usize, kind: ListKind) -> usize {
        let lines = self.lines;
        let mut gathered = Vec::new();
        if let Some(rest) = trailing_text(lines[start].text(), kind.marker()) {
            gathered.push(rest);
        }
        let mut next = start + 1;
        while let Some(line) = lines.get(next) {
            let text = line.text();
            if ends_course_list(text) || !is_possible_course_line(text) {
                break;
            }
            gathered.push(text);
            next += 1;
        }

        let (tokens, subject) = parse_course_tokens(&gathered, self.last_subject.as_deref());
        self.last_subject = subject;
        let tokens = tokens
            .into_iter()
            .filter(|code| !code.as_str().eq_ignore_ascii_case("OR"));
        match self.current {
            Some(open) => {
                let requirement = &mut self.requirements[open];
                match kind {
                    ListKind::SelectFrom => requirement.extend_select_from(tokens),
                    ListKind::NotFrom => requirement.extend_not_from(tokens),
                }
            }
            None => {
                let dropped: Vec<CourseCode> = tokens.collect();
                debug!(line = start, ?kind, ?dropped, "course list with no open requirement");
            }
        }
        next
    }
}

/// Text after the first occurrence of `marker`, matched case-insensitively.
fn trailing_text<'t>(line: &'t str, marker: &str) -> Option<&'t str> {
    let at = line.to_ascii_uppercase().find(marker)?;
    Some(line[at + marker.len()..].trim())
}

/// Stop conditions for a multi-line course list. A `-> NOT FROM:` line counts
/// as a `NOT FROM:` prefix.
fn ends_course_list(line: &str) -> bool {
    let upper = line.to_ascii_uppercase();
    let unarrowed = upper.trim_start_matches("->").trim_start();
    upper.starts_with(NEEDS)
        || upper.starts_with(OR_MARKER)
        || unarrowed.starts_with(NOT_FROM)
        || upper.contains(SELECT_FROM)
        || is_block_boundary(line)
}
