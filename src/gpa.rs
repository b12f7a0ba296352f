//! Recency-weighted GPA per course and instructor.
//!
//! Each semester of grade history is weighted `10 × year + season`
//! (Spring 1, Summer 2, Fall 3), so newer terms dominate the average.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::rank::GpaLookup;
use crate::{CourseCode, CourseMatchError};

static SEMESTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Spring|Summer|Fall)\s+(\d{4})").expect("semester pattern is valid")
});

/// One semester of grade history for a course section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub course_code: String,
    pub instructor: String,
    /// Rows without a GPA are ignored.
    #[serde(default)]
    pub avg_gpa: Option<f64>,
    /// `Fall 2023`, `Spring 2024-25`, ...
    pub semester: String,
}

/// Aggregated row: the weighted average for one (course, instructor) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedGpa {
    pub course_code: CourseCode,
    pub instructor: String,
    pub avg_gpa: f64,
}

/// Weight of a semester label. Unknown formats weigh `0` and so drop out of
/// the average.
#[must_use]
pub fn semester_weight(semester: &str) -> u32 {
    let Some(caps) = SEMESTER_RE.captures(semester) else {
        return 0;
    };
    let season = match &caps[1] {
        "Spring" => 1,
        "Summer" => 2,
        "Fall" => 3,
        _ => 0,
    };
    caps[2]
        .parse::<u32>()
        .map_or(0, |year| year * 10 + season)
}

/// Weighted GPA keyed by canonical course code and trimmed instructor name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<WeightedGpa>", into = "Vec<WeightedGpa>")]
pub struct WeightedGpaTable {
    entries: BTreeMap<(CourseCode, String), f64>,
}

impl WeightedGpaTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate raw semester rows, rounding each average to three decimals.
    /// Pairs whose total weight is zero are left out.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a GradeRecord>) -> Self {
        let mut sums: BTreeMap<(CourseCode, String), (f64, f64)> = BTreeMap::new();
        for record in records {
            let Some(gpa) = record.avg_gpa else {
                continue;
            };
            let weight = f64::from(semester_weight(&record.semester));
            let key = (
                CourseCode::normalize(&record.course_code),
                record.instructor.trim().to_owned(),
            );
            let (weighted_sum, total_weight) = sums.entry(key).or_default();
            *weighted_sum += gpa * weight;
            *total_weight += weight;
        }
        let entries: BTreeMap<_, _> = sums
            .into_iter()
            .filter(|(_, (_, total))| *total > 0.0)
            .map(|(key, (sum, total))| (key, round3(sum / total)))
            .collect();
        tracing::debug!(pairs = entries.len(), "aggregated weighted GPA");
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, course: &CourseCode, instructor: &str) -> Option<f64> {
        self.entries
            .get(&(course.clone(), instructor.trim().to_owned()))
            .copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = WeightedGpa> + '_ {
        self.entries
            .iter()
            .map(|((course_code, instructor), avg_gpa)| WeightedGpa {
                course_code: course_code.clone(),
                instructor: instructor.clone(),
                avg_gpa: *avg_gpa,
            })
    }

    /// Load either aggregated rows or raw semester rows.
    ///
    /// # Errors
    ///
    /// Returns [`CourseMatchError::Json`] if `json` matches neither shape.
    pub fn from_json(json: &str) -> Result<Self, CourseMatchError> {
        match serde_json::from_str::<GpaSource>(json)? {
            GpaSource::Weighted(table) => Ok(table),
            GpaSource::Raw(records) => Ok(Self::from_records(&records)),
        }
    }

    /// # Errors
    ///
    /// Returns [`CourseMatchError`] on I/O or JSON failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CourseMatchError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// # Errors
    ///
    /// Returns [`CourseMatchError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, CourseMatchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl GpaLookup for WeightedGpaTable {
    fn weighted_gpa(&self, course: &CourseCode, instructor: &str) -> Option<f64> {
        self.get(course, instructor)
    }
}

impl From<Vec<WeightedGpa>> for WeightedGpaTable {
    fn from(rows: Vec<WeightedGpa>) -> Self {
        Self {
            entries: rows
                .into_iter()
                .map(|row| {
                    let key = (
                        CourseCode::normalize(row.course_code.as_str()),
                        row.instructor.trim().to_owned(),
                    );
                    (key, row.avg_gpa)
                })
                .collect(),
        }
    }
}

impl From<WeightedGpaTable> for Vec<WeightedGpa> {
    fn from(table: WeightedGpaTable) -> Self {
        table.iter().collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GpaSource {
    Raw(Vec<GradeRecord>),
    Weighted(WeightedGpaTable),
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
