use std::fmt;

use serde::{Deserialize, Serialize};

use super::CompletedCourses;

/// Deepest tree read from catalog text or stored JSON. Longer chains and
/// deeper nesting are not built, so evaluation and drop stay well inside
/// the stack.
pub const MAX_EXPR_DEPTH: usize = 128;

/// Prerequisite expression tree.
///
/// Leaves are course literals as written in the catalog (`CS 2506`); they
/// are canonicalized when evaluated. Built once per course and reused for
/// every student.
///
/// On the wire a literal is a plain string and an operator node is
/// `{"type": "and" | "or", "conditions": [...]}`. A JSON array is read as a
/// conjunction of its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireExpr", into = "WireExpr")]
pub enum PrereqExpr {
    Course(String),
    And(Box<PrereqExpr>, Box<PrereqExpr>),
    Or(Box<PrereqExpr>, Box<PrereqExpr>),
    /// A stored node whose operator tag is not understood. Never satisfied.
    Unrecognized(String),
}

impl PrereqExpr {
    #[must_use]
    pub fn and(self, other: PrereqExpr) -> PrereqExpr {
        PrereqExpr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: PrereqExpr) -> PrereqExpr {
        PrereqExpr::Or(Box::new(self), Box::new(other))
    }

    /// Nodes on the longest root-to-leaf path; a literal has depth `1`.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1_usize)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let PrereqExpr::And(a, b) | PrereqExpr::Or(a, b) = node {
                stack.push((&**a, level + 1));
                stack.push((&**b, level + 1));
            }
        }
        deepest
    }

    /// Evaluate against a student's completed courses.
    ///
    /// See [`evaluate`](crate::evaluate::evaluate) for the rules.
    #[must_use]
    pub fn evaluate(&self, completed: &CompletedCourses) -> bool {
        crate::evaluate::evaluate(self, completed)
    }
}

/// Shorthand for a course literal.
#[must_use]
pub fn course(code: &str) -> PrereqExpr {
    PrereqExpr::Course(code.to_owned())
}

impl fmt::Display for PrereqExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrereqExpr::Course(code) => write!(f, "{code}"),
            PrereqExpr::And(a, b) => write!(f, "({a} and {b})"),
            PrereqExpr::Or(a, b) => write!(f, "({a} or {b})"),
            PrereqExpr::Unrecognized(tag) => write!(f, "<{tag}>"),
        }
    }
}

// -- Wire format ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireExpr {
    Literal(String),
    List(Vec<WireExpr>),
    Node {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        conditions: Vec<WireExpr>,
    },
}

impl From<WireExpr> for PrereqExpr {
    fn from(wire: WireExpr) -> Self {
        match wire {
            WireExpr::Literal(code) => PrereqExpr::Course(code),
            WireExpr::List(items) => fold(items, "and", PrereqExpr::and),
            WireExpr::Node { kind, conditions } => match kind.to_ascii_lowercase().as_str() {
                "and" => fold(conditions, &kind, PrereqExpr::and),
                "or" => fold(conditions, &kind, PrereqExpr::or),
                // Fallback wrapper written for strings the grammar could not read.
                "single" if conditions.len() == 1 => conditions
                    .into_iter()
                    .next()
                    .map_or(PrereqExpr::Unrecognized(kind), PrereqExpr::from),
                _ => PrereqExpr::Unrecognized(kind),
            },
        }
    }
}

/// Left-fold n-ary children into a binary tree. An empty operator node
/// has nothing to satisfy it, and a node that would fold deeper than
/// [`MAX_EXPR_DEPTH`] is not built; both become [`PrereqExpr::Unrecognized`].
fn fold(
    children: Vec<WireExpr>,
    kind: &str,
    combine: fn(PrereqExpr, PrereqExpr) -> PrereqExpr,
) -> PrereqExpr {
    let children: Vec<PrereqExpr> = children.into_iter().map(PrereqExpr::from).collect();
    let depths: Vec<usize> = children.iter().map(PrereqExpr::depth).collect();
    if folded_depth(&depths) > MAX_EXPR_DEPTH {
        tracing::warn!(
            kind,
            operands = children.len(),
            "stored prerequisite tree too deep; treating as unmet"
        );
        return PrereqExpr::Unrecognized(kind.to_owned());
    }
    children
        .into_iter()
        .reduce(combine)
        .unwrap_or_else(|| PrereqExpr::Unrecognized(kind.to_owned()))
}

/// Depth of the left-associative fold of children with the given depths.
/// The first child sits under `n - 1` operator nodes, child `i` under `n - i`.
pub(crate) fn folded_depth(child_depths: &[usize]) -> usize {
    let n = child_depths.len();
    child_depths
        .iter()
        .enumerate()
        .map(|(i, depth)| depth + n - i.max(1))
        .max()
        .unwrap_or(0)
}

impl From<PrereqExpr> for WireExpr {
    fn from(expr: PrereqExpr) -> Self {
        match expr {
            PrereqExpr::Course(code) => WireExpr::Literal(code),
            PrereqExpr::And(a, b) => WireExpr::Node {
                kind: "and".to_owned(),
                conditions: vec![(*a).into(), (*b).into()],
            },
            PrereqExpr::Or(a, b) => WireExpr::Node {
                kind: "or".to_owned(),
                conditions: vec![(*a).into(), (*b).into()],
            },
            PrereqExpr::Unrecognized(kind) => WireExpr::Node {
                kind,
                conditions: Vec::new(),
            },
        }
    }
}
