use std::collections::HashSet;

use super::CourseCode;

/// The courses a student has completed or is currently taking, in canonical form.
///
/// Used as the read-only context for prerequisite evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedCourses {
    codes: HashSet<CourseCode>,
}

impl CompletedCourses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a course, canonicalizing the raw code first.
    pub fn insert(&mut self, raw: &str) {
        self.codes.insert(CourseCode::normalize(raw));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, raw: &str) -> Self {
        self.insert(raw);
        self
    }

    /// Exact membership of an already-canonical code.
    #[must_use]
    pub fn contains(&self, code: &CourseCode) -> bool {
        self.codes.contains(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseCode> {
        self.codes.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for CompletedCourses {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut completed = Self::new();
        for raw in iter {
            completed.insert(raw.as_ref());
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_canonicalized_on_insert() {
        let completed: CompletedCourses = ["CS-2506-01", "math 1226"].into_iter().collect();
        assert!(completed.contains(&CourseCode::new("CS2506")));
        assert!(completed.contains(&CourseCode::new("MATH1226")));
        assert_eq!(completed.len(), 2);
    }

    #[test]
    fn duplicates_collapse() {
        let completed = CompletedCourses::new().with("CS2506").with("CS 2506");
        assert_eq!(completed.len(), 1);
    }
}
