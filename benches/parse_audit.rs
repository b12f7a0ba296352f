use coursematch::{audit::parse_course_tokens, AuditParser, CourseCode};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const AUDIT: &str = include_str!("../tests/fixtures/audit.txt");

/// The fixture audit with its requirement section repeated `copies` times.
fn long_audit(copies: usize) -> String {
    let (head, tail) = AUDIT
        .split_once("END OF ANALYSIS")
        .unwrap_or((AUDIT, ""));
    let mut text = String::with_capacity(AUDIT.len() * copies);
    for _ in 0..copies {
        text.push_str(head);
    }
    text.push_str("END OF ANALYSIS");
    text.push_str(tail);
    text
}

fn bench_parse_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_audit");
    let parser = AuditParser::new();

    for &copies in &[1, 10, 50] {
        let text = long_audit(copies);
        group.bench_function(&format!("{copies}_sections"), |b| {
            b.iter(|| parser.parse_text(black_box(&text)));
        });
    }

    group.finish();
}

fn bench_course_tokens(c: &mut Criterion) {
    let lines = [
        "CS 3114, 3214, 3304, 3414, 3604,",
        "MATH 2534 OR 3034, STAT 4105, 4106",
        "HIST 3***, ENGL 3***, ECE 2524",
    ];
    c.bench_function("course_tokens", |b| {
        b.iter(|| black_box(parse_course_tokens(black_box(&lines[..]), None)));
    });

    let raw = ["CS-3114-01", "cs 2506", "MATH4175", "HIST 3***"];
    c.bench_function("normalize", |b| {
        b.iter(|| {
            for code in &raw {
                black_box(CourseCode::normalize(black_box(code)));
            }
        });
    });
}

criterion_group!(benches, bench_parse_audit, bench_course_tokens);
criterion_main!(benches);
