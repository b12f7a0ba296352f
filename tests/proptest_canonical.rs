
use coursematch::audit::parse_course_tokens;
use coursematch::CourseCode;
use proptest::prelude::*;
use strategies::{arb_canonical_code, SUBJECTS};

fn as_strs(codes: &[CourseCode]) -> Vec<&str> {
    codes.iter().map(CourseCode::as_str).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Canonical codes survive the canonicalizer untouched.
    #[test]
    fn canonical_codes_are_fixed_points(code in arb_canonical_code()) {
        let (tokens, _) = parse_course_tokens(&[code.as_str()], None);
        prop_assert_eq!(as_strs(&tokens), vec![code.as_str()]);
        let normalized = CourseCode::normalize(&code);
        prop_assert_eq!(normalized.as_str(), code.as_str());
    }

    /// Re-reading the canonical output yields the same set.
    #[test]
    fn canonicalizer_is_idempotent(
        subject in prop::sample::select(SUBJECTS),
        numbers in prop::collection::vec(1000_u32..=4999, 1..6),
        wildcard in any::<bool>(),
    ) {
        let mut listing: Vec<String> = numbers.iter().map(u32::to_string).collect();
        if wildcard {
            listing.push("4***".to_owned());
        }
        let first_line = format!("{subject} {}", listing.join(", "));
        let (first, _) = parse_course_tokens(&[first_line], None);
        let (second, _) = parse_course_tokens(&[as_strs(&first).join(", ")], None);
        prop_assert_eq!(first, second);
    }

    /// Bare numbers take the subject carried in from an earlier line.
    #[test]
    fn subject_carries_over(
        subject in prop::sample::select(SUBJECTS),
        numbers in prop::collection::btree_set(1000_u32..=4999, 1..6),
    ) {
        let listing = numbers.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
        let (tokens, carried) = parse_course_tokens(&[subject.to_owned(), listing], None);
        let expected: Vec<String> = numbers.iter().map(|n| format!("{subject}{n}")).collect();
        prop_assert_eq!(as_strs(&tokens), expected.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(carried.as_deref(), Some(subject));
    }

    /// Any token with a `*` collapses to `SUBJECT***`.
    #[test]
    fn wildcards_collapse(
        subject in prop::sample::select(SUBJECTS),
        digit in 0_u32..=9,
        stars in 1_usize..=4,
    ) {
        let part = format!("{subject}{digit}{}", "*".repeat(stars));
        let (tokens, _) = parse_course_tokens(&[part], None);
        let expected = format!("{subject}***");
        prop_assert_eq!(as_strs(&tokens), vec![expected.as_str()]);
    }

    /// The connective `OR` is never emitted, whatever surrounds it.
    #[test]
    fn or_never_emitted(
        subject in prop::sample::select(SUBJECTS),
        numbers in prop::collection::vec(1000_u32..=4999, 1..6),
    ) {
        let listing = numbers.iter().map(u32::to_string).collect::<Vec<_>>().join(" OR ");
        let (tokens, _) = parse_course_tokens(&[format!("{subject} {listing} or")], None);
        prop_assert!(tokens.iter().all(|t| !t.as_str().eq_ignore_ascii_case("OR")));
        prop_assert!(!tokens.is_empty());
    }

    /// Section codes normalize to the catalog code they belong to.
    #[test]
    fn section_suffix_dropped(code in arb_canonical_code(), section in 1_u32..=99) {
        let split = code.find(|c: char| c.is_ascii_digit()).unwrap();
        let dashed = format!("{}-{}-{section:02}", &code[..split], &code[split..]);
        let normalized = CourseCode::normalize(&dashed);
        prop_assert_eq!(normalized.as_str(), code.as_str());
    }
}
