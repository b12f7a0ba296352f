mod audit;
mod completed;
mod course_code;
mod expr;
mod line;
mod prereq_index;
mod recommendation;
mod requirement;
mod section;

pub use audit::{CourseRecord, DegreeAudit, StudentInfo};
pub use completed::CompletedCourses;
pub(crate) use course_code::leading_letters;
pub use course_code::{CourseCode, WILDCARD_SUFFIX};
pub(crate) use expr::folded_depth;
pub use expr::{course, PrereqExpr, MAX_EXPR_DEPTH};
pub use line::TextLine;
pub use prereq_index::{CourseRequirements, PrereqIndex};
pub use recommendation::{Candidate, Recommendation, Recommendations};
pub use requirement::{AlternativeBlock, Requirement};
pub use section::{split_time_range, OpenSection, SectionRow};
