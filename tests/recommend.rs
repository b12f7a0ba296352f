use coursematch::{
    parse_audit, CourseCode, CourseRecord, DegreeAudit, OpenSection, PrereqIndex, Ranker,
    Recommendations, WeightedGpaTable,
};

const AUDIT: &str = include_str!("fixtures/audit.txt");
const SECTIONS: &str = include_str!("fixtures/sections.json");
const CATALOG: &str = include_str!("fixtures/course_requirements.json");
const GRADES: &str = include_str!("fixtures/grades.json");

struct Fixture {
    sections: Vec<OpenSection>,
    prereqs: PrereqIndex,
    gpa: WeightedGpaTable,
}

impl Fixture {
    fn load() -> Self {
        Self {
            sections: OpenSection::list_from_json(SECTIONS).unwrap(),
            prereqs: PrereqIndex::from_json(CATALOG).unwrap(),
            gpa: WeightedGpaTable::from_json(GRADES).unwrap(),
        }
    }

    fn recommend(&self, audit: &DegreeAudit) -> Recommendations {
        Ranker::new(&self.sections, &self.prereqs, &self.gpa).recommend(audit)
    }
}

fn section_codes(recs: &Recommendations, at: usize) -> Vec<&str> {
    recs.recommendations[at]
        .candidates
        .iter()
        .map(|c| c.section.code.as_str())
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[test]
fn sections_accept_both_row_shapes() {
    let sections = OpenSection::list_from_json(SECTIONS).unwrap();
    assert_eq!(sections.len(), 9);
    let row = sections.iter().find(|s| s.crn == "13020").unwrap();
    assert_eq!(row.code, "CS-3304-01");
    assert_eq!(row.start_time, "4:00PM");
    assert_eq!(row.end_time, "5:15PM");
    assert_eq!(row.course_code(), CourseCode::new("CS3304"));

    let tba = sections.iter().find(|s| s.crn == "13060").unwrap();
    assert_eq!(tba.start_time, "");
}

#[test]
fn grade_rows_aggregate_by_recency() {
    let table = WeightedGpaTable::from_json(GRADES).unwrap();
    let cs3114 = CourseCode::new("CS3114");
    let expected: f64 = (2.81 * 20223.0 + 2.95 * 20241.0) / (20223.0 + 20241.0);
    let mcquain = table.get(&cs3114, "McQuain").unwrap();
    assert!(close(mcquain, (expected * 1000.0).round() / 1000.0));
    assert_eq!(table.get(&cs3114, "Shaffer"), Some(3.12));
    // Rows with a null GPA are skipped; unknown terms weigh nothing.
    assert_eq!(table.get(&CourseCode::new("HIST3524"), "Nelson"), Some(3.55));
    assert_eq!(table.get(&CourseCode::new("MATH4175"), "Brown"), None);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn one_recommendation_per_requirement() {
    let fixture = Fixture::load();
    let audit = parse_audit(AUDIT);
    let recs = fixture.recommend(&audit);
    assert_eq!(recs.recommendations.len(), audit.requirements_needed.len());
    for (rec, req) in recs.recommendations.iter().zip(&audit.requirements_needed) {
        assert_eq!(rec.requirement, req.requirement_type);
    }
}

#[test]
fn eligible_sections_for_parsed_audit() {
    let fixture = Fixture::load();
    let recs = fixture.recommend(&parse_audit(AUDIT));

    // CS 3114 needs discrete math and CS 3214 needs CS 3114.
    assert_eq!(section_codes(&recs, 0), ["CS-3304-01"]);
    let servant = &recs.recommendations[0].candidates[0];
    assert_eq!(servant.instructor, "Servant");
    assert!(close(servant.weighted_gpa, 3.4));

    // No grade history scores zero.
    assert_eq!(section_codes(&recs, 1), ["CS-4104-01"]);
    assert!(close(recs.recommendations[1].candidates[0].weighted_gpa, 0.0));

    // HIST 3144 is excluded and ENGL 3844 requires junior standing.
    assert_eq!(section_codes(&recs, 2), ["HIST-3524-01"]);
    assert!(recs.recommendations[3].candidates.is_empty());
}

#[test]
fn higher_weighted_gpa_ranks_first() {
    let fixture = Fixture::load();
    let mut audit = parse_audit(AUDIT);
    audit.completed_courses.push(CourseRecord {
        course_id: "MATH2534".to_owned(),
        credits: "3.0".to_owned(),
        status: "A".to_owned(),
    });
    let recs = fixture.recommend(&audit);

    assert_eq!(
        section_codes(&recs, 0),
        ["CS-3304-01", "CS-3114-02", "CS-3114-01"]
    );
    let gpas: Vec<f64> = recs.recommendations[0]
        .candidates
        .iter()
        .map(|c| c.weighted_gpa)
        .collect();
    assert!(gpas.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(section_codes(&recs, 1), ["CS-4104-01", "MATH-4175-01"]);
}

#[test]
fn completed_courses_are_not_recommended() {
    let fixture = Fixture::load();
    let mut audit = parse_audit(AUDIT);
    audit.completed_courses.push(CourseRecord {
        course_id: "CS3304".to_owned(),
        credits: "3.0".to_owned(),
        status: "B".to_owned(),
    });
    let recs = fixture.recommend(&audit);
    assert!(recs.recommendations[0].candidates.is_empty());
}

#[test]
fn summary_and_json_output() {
    let fixture = Fixture::load();
    let recs = fixture.recommend(&parse_audit(AUDIT));

    let summary = recs.to_string();
    assert!(summary.starts_with(
        "CS CORE REQUIREMENTS - Complete the following courses\n  CS-3304-01 (Servant) 3.400\n"
    ));
    assert!(summary.contains("(untitled requirement)\n"));

    let json = serde_json::to_value(&recs).unwrap();
    let first = &json["recommendations"][0];
    assert_eq!(
        first["requirement"],
        "CS CORE REQUIREMENTS - Complete the following courses"
    );
    assert_eq!(first["recommended_courses"][0]["professor"], "Servant");
    assert_eq!(first["recommended_courses"][0]["section"]["crn"], "13020");
}
