use std::fmt;

use serde::{Deserialize, Serialize};

use super::OpenSection;

/// An open section proposed for a requirement, with its difficulty signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub section: OpenSection,
    /// Recency-weighted historical GPA for this course and instructor; `0`
    /// when no history exists. Higher reads as easier.
    #[serde(rename = "avg_gpa")]
    pub weighted_gpa: f64,
    #[serde(rename = "professor")]
    pub instructor: String,
}

/// Ranked candidates for one outstanding requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The requirement's heading (may be empty).
    pub requirement: String,
    #[serde(rename = "recommended_courses")]
    pub candidates: Vec<Candidate>,
}

/// Ranker output: one [`Recommendation`] per outstanding requirement, in audit order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub recommendations: Vec<Recommendation>,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {:.3}",
            self.section.code, self.instructor, self.weighted_gpa
        )
    }
}

impl fmt::Display for Recommendations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rec in &self.recommendations {
            let heading = if rec.requirement.is_empty() {
                "(untitled requirement)"
            } else {
                rec.requirement.as_str()
            };
            writeln!(f, "{heading}")?;
            for candidate in &rec.candidates {
                writeln!(f, "  {candidate}")?;
            }
        }
        Ok(())
    }
}
