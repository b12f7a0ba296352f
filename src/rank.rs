use std::collections::HashSet;

use crate::{
    Candidate, CompletedCourses, CourseCode, DegreeAudit, OpenSection, PrereqIndex, Recommendation,
    Recommendations, Requirement,
};

/// Source of the recency-weighted GPA for a course taught by an instructor.
///
/// `None` means no history; the ranker scores such sections as `0`.
pub trait GpaLookup {
    fn weighted_gpa(&self, course: &CourseCode, instructor: &str) -> Option<f64>;
}

impl<F> GpaLookup for F
where
    F: Fn(&CourseCode, &str) -> Option<f64>,
{
    fn weighted_gpa(&self, course: &CourseCode, instructor: &str) -> Option<f64> {
        self(course, instructor)
    }
}

/// Joins outstanding requirements with open sections.
///
/// For every `select_from` code, a section is proposed when its canonical
/// code matches (wildcards by subject), the student has not already taken
/// it, its prerequisites are met, and the requirement does not exclude it.
/// Each requirement lists a section at most once, ordered by weighted GPA,
/// highest first; ties keep discovery order.
pub struct Ranker<'a, G> {
    sections: &'a [OpenSection],
    section_codes: Vec<CourseCode>,
    prereqs: &'a PrereqIndex,
    gpa: &'a G,
}

impl<'a, G: GpaLookup> Ranker<'a, G> {
    pub fn new(sections: &'a [OpenSection], prereqs: &'a PrereqIndex, gpa: &'a G) -> Self {
        Self {
            sections,
            section_codes: sections.iter().map(OpenSection::course_code).collect(),
            prereqs,
            gpa,
        }
    }

    /// One recommendation per requirement in audit order, including
    /// requirements with no eligible section.
    #[must_use]
    pub fn recommend(&self, audit: &DegreeAudit) -> Recommendations {
        let completed = audit.completed_set();
        Recommendations {
            recommendations: audit
                .requirements_needed
                .iter()
                .map(|req| self.rank_requirement(req, &completed))
                .collect(),
        }
    }

    #[must_use]
    pub fn rank_requirement(
        &self,
        requirement: &Requirement,
        completed: &CompletedCourses,
    ) -> Recommendation {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for wanted in &requirement.select_from {
            let wanted = CourseCode::normalize(wanted.as_str());
            for (at, (section, code)) in self.sections.iter().zip(&self.section_codes).enumerate() {
                if !wanted.matches(code) || seen.contains(&at) {
                    continue;
                }
                if completed.contains(code)
                    || requirement.excludes(code)
                    || !self.prereqs.prereqs_satisfied(&section.code, completed)
                {
                    continue;
                }
                seen.insert(at);
                let instructor = section.instructor.trim();
                candidates.push(Candidate {
                    section: section.clone(),
                    weighted_gpa: self.gpa.weighted_gpa(code, instructor).unwrap_or(0.0),
                    instructor: instructor.to_owned(),
                });
            }
        }
        candidates.sort_by(|a, b| b.weighted_gpa.total_cmp(&a.weighted_gpa));
        tracing::debug!(
            requirement = %requirement.requirement_type,
            candidates = candidates.len(),
            "ranked requirement"
        );
        Recommendation {
            requirement: requirement.requirement_type.clone(),
            candidates,
        }
    }
}
