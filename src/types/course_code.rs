use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix marking a wildcard code: `CS***` stands for any `CS` course number.
pub const WILDCARD_SUFFIX: &str = "***";

/// A course code in canonical `SUBJECT+NUMBER` form (`CS2506`), or a
/// wildcard `SUBJECT***`.
///
/// Equality is exact string equality. Use [`CourseCode::matches`] when a
/// wildcard should stand in for a concrete code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCode(String);

impl CourseCode {
    /// Wrap a token that is already canonical, without rewriting it.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Canonicalize a catalog or section code.
    ///
    /// `CS-2506-01` becomes `CS2506` (section suffix dropped), `cs 2506`
    /// becomes `CS2506`, and any code containing `*` collapses to
    /// `SUBJECT***`. Already-canonical codes are returned unchanged.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        if upper.contains('*') {
            return Self::wildcard(leading_letters(&upper));
        }
        let mut parts = upper.split('-');
        if let (Some(subject), Some(number)) = (parts.next(), parts.next()) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return Self(format!("{subject}{number}"));
            }
        }
        Self(upper.chars().filter(char::is_ascii_alphanumeric).collect())
    }

    /// `SUBJECT***` for the given subject.
    #[must_use]
    pub fn wildcard(subject: &str) -> Self {
        Self(format!("{subject}{WILDCARD_SUFFIX}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading run of letters, e.g. `CS` for `CS2506` and `MATH` for `MATH***`.
    #[must_use]
    pub fn subject(&self) -> &str {
        leading_letters(&self.0)
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.0.contains('*')
    }

    /// Whether `self` admits `other`.
    ///
    /// A concrete code admits only itself. A wildcard admits every concrete
    /// code with the same subject whose number starts with a digit.
    #[must_use]
    pub fn matches(&self, other: &CourseCode) -> bool {
        if !self.is_wildcard() {
            return self == other;
        }
        let subject = self.subject();
        !other.is_wildcard()
            && other.subject().eq_ignore_ascii_case(subject)
            && other.0[other.subject().len()..].starts_with(|c: char| c.is_ascii_digit())
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CourseCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

pub(crate) fn leading_letters(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    &s[..end]
}
