//! Student identity and coursework listed on the audit.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::{CourseRecord, StudentInfo, TextLine};

static STUDENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Student ID[:\s]+(\d{9})").expect("student id pattern is valid"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]+,\s*[A-Za-z]+\b").expect("name pattern is valid"));

static COURSE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z]{2,4}\s?\d{4})\s+([\d.]+)\s+(IP|TR|AP|[A-F])?")
        .expect("course line pattern is valid")
});

const IN_PROGRESS: &str = "In-Progress";
const COMPLETED: &str = "Completed";

/// Student ID, `Last, First` name, and the program line right below the name.
pub(crate) fn extract_student_info(lines: &[TextLine]) -> StudentInfo {
    let mut info = StudentInfo::default();
    let mut name_at = None;
    for (i, line) in lines.iter().enumerate() {
        let text = line.text();
        if text.contains("Student ID") {
            if let Some(caps) = STUDENT_ID_RE.captures(text) {
                info.student_id = caps[1].to_owned();
            }
        } else if info.name.is_empty() && NAME_RE.is_match(text) {
            info.name = text.to_owned();
            name_at = Some(i);
        } else if name_at.is_some_and(|at| i == at + 1)
            && info.program.is_empty()
            && !text.contains(|c: char| c.is_ascii_digit())
        {
            info.program = text.to_owned();
        }
    }
    info
}

/// Completed and in-progress course records, in first-seen order.
///
/// A repeated completed course is replaced only by a letter grade, or by
/// `AP` over an earlier `TR`. A repeated in-progress course keeps its
/// latest line.
pub(crate) fn extract_courses(lines: &[TextLine]) -> (Vec<CourseRecord>, Vec<CourseRecord>) {
    let mut completed = OrderedRecords::default();
    let mut in_progress = OrderedRecords::default();
    for line in lines {
        let Some(caps) = COURSE_LINE_RE.captures(line.text()) else {
            continue;
        };
        let course_id: String = caps[1].chars().filter(|c| *c != ' ').collect();
        let credits = caps[2].to_owned();
        let marker = caps.get(3).map(|m| m.as_str());
        let status = match marker {
            Some("IP") => IN_PROGRESS,
            Some(marker) => marker,
            None => COMPLETED,
        };
        let record = CourseRecord {
            course_id,
            credits,
            status: status.to_owned(),
        };
        if marker == Some("IP") {
            in_progress.upsert(record, |_| true);
        } else {
            record_completed(&mut completed, record, marker);
        }
    }
    (completed.into_vec(), in_progress.into_vec())
}

fn record_completed(records: &mut OrderedRecords, record: CourseRecord, marker: Option<&str>) {
    let letter_grade = marker.is_some_and(|m| m.len() == 1);
    let upgrades_transfer = marker == Some("AP");
    records.upsert(record, |old| {
        letter_grade || (upgrades_transfer && old.status == "TR")
    });
}

#[derive(Default)]
struct OrderedRecords {
    records: Vec<CourseRecord>,
    positions: HashMap<String, usize>,
}

impl OrderedRecords {
    /// Insert a new course, or overwrite an existing one in place when
    /// `replace` allows it.
    fn upsert(&mut self, record: CourseRecord, replace: impl FnOnce(&CourseRecord) -> bool) {
        match self.positions.get(&record.course_id) {
            Some(&at) => {
                if replace(&self.records[at]) {
                    self.records[at] = record;
                }
            }
            None => {
                self.positions
                    .insert(record.course_id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    fn into_vec(self) -> Vec<CourseRecord> {
        self.records
    }
}
