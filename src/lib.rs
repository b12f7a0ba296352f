//! Degree-audit parsing and course recommendation.
//!
//! A degree audit is read line by line into outstanding requirements
//! ([`AuditParser`]), catalog prerequisite text is parsed into boolean trees
//! ([`parse`], [`PrereqIndex`]), and open sections are ranked against each
//! requirement by recency-weighted GPA ([`Ranker`]).

pub mod audit;
mod error;
pub mod evaluate;
pub mod gpa;
pub mod parse;
mod rank;
#[cfg(feature = "binary-cache")]
mod serial;
mod types;

pub use audit::{parse_audit, AuditParser};
pub use error::CourseMatchError;
pub use gpa::{GradeRecord, WeightedGpa, WeightedGpaTable};
pub use parse::ParseError;
pub use rank::{GpaLookup, Ranker};
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    course, split_time_range, AlternativeBlock, Candidate, CompletedCourses, CourseCode,
    CourseRecord, CourseRequirements, DegreeAudit, OpenSection, PrereqExpr, PrereqIndex,
    Recommendation, Recommendations, Requirement, SectionRow, StudentInfo, TextLine,
    MAX_EXPR_DEPTH, WILDCARD_SUFFIX,
};
