//! Prerequisite and corequisite strings into [`PrereqExpr`] trees.
//!
//! Course literals are `SUBJECT NUMBER` pairs joined by `and` / `or`
//! (case-insensitive, left-associative, `and` binding tighter). Parentheses
//! group.

mod error;
mod grammar;

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub use error::ParseError;

use crate::{PrereqExpr, MAX_EXPR_DEPTH};

/// Deepest parenthesis nesting handed to the grammar.
const MAX_NESTING: usize = 32;

static OPERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\b(and|or)\b\s*").expect("operator pattern is valid")
});

/// Replace non-breaking spaces, trim, and pad `and` / `or` with single
/// spaces in lower case.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let text = raw.replace('\u{a0}', " ");
    let padded = OPERATOR_RE.replace_all(text.trim(), |caps: &Captures<'_>| {
        format!(" {} ", caps[1].to_ascii_lowercase())
    });
    padded.trim().to_owned()
}

/// Parse a prerequisite string strictly.
///
/// # Errors
///
/// Returns [`ParseError`] if the normalized text is not a well-formed
/// expression over course literals, nests parentheses deeper than 32
/// levels, or joins more than [`MAX_EXPR_DEPTH`] operands.
pub fn parse(input: &str) -> Result<PrereqExpr, ParseError> {
    use winnow::Parser;
    let normalized = normalize(input);
    check_size(&normalized)?;
    grammar::prereq_expr
        .parse(normalized.as_str())
        .map_err(|e| ParseError::new(normalized.as_str(), e.to_string()))
}

/// Reject text whose tree would be too deep to parse or evaluate safely.
/// Operand count bounds the depth of the folded tree.
fn check_size(text: &str) -> Result<(), ParseError> {
    let mut level = 0_usize;
    let mut deepest = 0_usize;
    for c in text.chars() {
        match c {
            '(' => {
                level += 1;
                deepest = deepest.max(level);
            }
            ')' => level = level.saturating_sub(1),
            _ => {}
        }
    }
    if deepest > MAX_NESTING {
        return Err(ParseError::new(
            text,
            format!("parentheses nested deeper than {MAX_NESTING} levels"),
        ));
    }
    let operands = 1 + text.matches(" and ").count() + text.matches(" or ").count();
    if operands > MAX_EXPR_DEPTH {
        return Err(ParseError::new(
            text,
            format!("{operands} operands, at most {MAX_EXPR_DEPTH} allowed"),
        ));
    }
    Ok(())
}

impl std::str::FromStr for PrereqExpr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a prerequisite string, never failing.
///
/// Blank text means "no requirement" and yields `None`. Text the grammar
/// cannot read is kept whole as a single course literal, which will only be
/// satisfied if it happens to canonicalize to a completed course.
#[must_use]
pub fn parse_requirement(raw: &str) -> Option<PrereqExpr> {
    let text = raw.replace('\u{a0}', " ");
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse(trimmed) {
        Ok(expr) => Some(expr),
        Err(err) => {
            tracing::warn!(%err, "keeping unparsed prerequisite as a literal");
            Some(PrereqExpr::Course(trimmed.to_owned()))
        }
    }
}
