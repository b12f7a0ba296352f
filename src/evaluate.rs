use crate::{CompletedCourses, CourseCode, PrereqExpr, PrereqIndex};

/// Evaluate a prerequisite tree against a student's completed courses.
///
/// A literal holds when its canonical code is in `completed`. `And` needs
/// both children, `Or` either. An [`PrereqExpr::Unrecognized`] node is never
/// satisfied.
///
/// Recursion follows the tree, so hand-built trees should stay within
/// [`MAX_EXPR_DEPTH`](crate::MAX_EXPR_DEPTH) like the ones read from text or JSON.
#[must_use]
pub fn evaluate(expr: &PrereqExpr, completed: &CompletedCourses) -> bool {
    match expr {
        PrereqExpr::Course(code) => completed.contains(&CourseCode::normalize(code)),
        PrereqExpr::And(a, b) => evaluate(a, completed) && evaluate(b, completed),
        PrereqExpr::Or(a, b) => evaluate(a, completed) || evaluate(b, completed),
        PrereqExpr::Unrecognized(tag) => {
            tracing::warn!(tag = %tag, "unrecognized prerequisite operator; treating as unmet");
            false
        }
    }
}

/// Whether the student meets the prerequisites of `code`.
///
/// Open-world default: a course with no entry in `index` has no
/// prerequisites on file and is satisfied.
#[must_use]
pub fn prereqs_satisfied(code: &str, completed: &CompletedCourses, index: &PrereqIndex) -> bool {
    match index.get(code) {
        Some(expr) => evaluate(expr, completed),
        None => true,
    }
}
