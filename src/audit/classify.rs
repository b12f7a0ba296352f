//! Line-level decisions: heading candidates, noise, and block boundaries.

use std::sync::LazyLock;

use regex::{Regex, RegexSet};

/// Vocabulary that marks a line as a requirement heading regardless of case.
const HEADING_KEYWORDS: &[&str] = &[
    "complete the following",
    "theory",
    "capstone",
    "elective",
    "requirement",
    "foundation",
    "language study",
    "cs technical",
    "non-technical",
    "with grade c",
    "degree",
    "english requirement",
    "core",
];

/// Structural markers that open or close an audit block.
const BOUNDARY_MARKERS: &[&str] = &[
    "NEEDS:",
    "OR)",
    "NOT FROM:",
    "SELECT FROM:",
    "AWARDED:",
    "COURSES TAKEN",
    "UNDERGRADUATE CREDIT SUMMARY",
    "END OF ANALYSIS",
];

const UPPERCASE_RATIO: f64 = 0.6;
const MIN_HEADING_CHARS: usize = 5;

/// Noise patterns, matched against the lower-cased line.
static SKIP_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"completed",
        r"awarded:",
        r"h.ours added",
        r"sub-group",
        r"\d+\.00\s+h.ours",
        r"https?://",
        r"courses taken",
        r"^\s*$",
    ])
    .expect("skip patterns are valid")
});

static COURSE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z]{2,4}\s*\d{3,4}|\d\*+").expect("course token pattern is valid")
});

static SEPARATOR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-\s*-\s*").expect("separator pattern is valid"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Whether `line` looks like a requirement heading: it contains a heading
/// keyword, or at least 60% of its letters are upper case and it is at least
/// five characters long.
#[must_use]
pub fn is_heading_candidate(line: &str) -> bool {
    let lower = line.to_lowercase();
    if HEADING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return true;
    }
    let (alpha, upper) = line
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0_usize, 0_usize), |(alpha, upper), c| {
            (alpha + 1, upper + usize::from(c.is_uppercase()))
        });
    if alpha == 0 {
        return false;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = upper as f64 / alpha as f64;
    ratio >= UPPERCASE_RATIO && line.trim().chars().count() >= MIN_HEADING_CHARS
}

/// Whether `line` is noise that must never be used as a heading (progress
/// notes, hour tallies, URLs, blank lines).
#[must_use]
pub fn should_skip_heading_line(line: &str) -> bool {
    SKIP_PATTERNS.is_match(&line.to_lowercase())
}

/// Whether `line` carries course data: a subject followed by a number, or a
/// digit followed by a wildcard.
#[must_use]
pub fn is_possible_course_line(line: &str) -> bool {
    COURSE_TOKEN_RE.is_match(line)
}

/// Whether `line` starts a structural marker and carries no course data of
/// its own.
#[must_use]
pub fn is_block_boundary(line: &str) -> bool {
    let upper = line.to_uppercase();
    BOUNDARY_MARKERS.iter().any(|marker| upper.starts_with(marker)) && !is_possible_course_line(line)
}

/// Collect the heading for the `NEEDS:` block ending at `needs_index`.
///
/// Scans at most `lookback` lines strictly above `needs_index`, stopping at
/// an earlier `NEEDS:` line, keeps heading candidates that are not noise,
/// and joins them top-down with `" - "`. Returns an empty string when
/// nothing qualifies.
pub fn gather_heading_for_needs<S: AsRef<str>>(
    lines: &[S],
    needs_index: usize,
    lookback: usize,
) -> String {
    let end = needs_index.min(lines.len());
    let start = needs_index.saturating_sub(lookback);
    let mut collected = Vec::new();
    for line in lines[start.min(end)..end].iter().rev() {
        let line = line.as_ref().trim();
        if line.to_uppercase().starts_with("NEEDS:") {
            break;
        }
        if is_heading_candidate(line) && !should_skip_heading_line(line) {
            collected.push(line);
        }
    }
    if collected.is_empty() {
        return String::new();
    }
    collected.reverse();
    let joined = collected.join(" - ");
    let joined = SEPARATOR_RUN_RE.replace_all(&joined, " - ");
    WHITESPACE_RE.replace_all(&joined, " ").trim().to_owned()
}
