use std::collections::BTreeSet;

use crate::types::leading_letters;
use crate::CourseCode;

/// Canonicalize the course listing spread over `lines`.
///
/// Parts are separated by commas and whitespace. A bare subject (`CS`) or a
/// full code (`CS2506`) sets the subject carried onto later bare numbers
/// (`3114`) and wildcards (`4***`). The carried subject starts at
/// `last_subject` and the final value is returned so a listing can continue
/// across separate lists.
///
/// Tokens come back upper-cased, deduplicated and sorted; anything with a
/// `*` collapses to `SUBJECT***`. The connective `OR` is never emitted.
pub fn parse_course_tokens<S: AsRef<str>>(
    lines: &[S],
    last_subject: Option<&str>,
) -> (Vec<CourseCode>, Option<String>) {
    let joined = lines
        .iter()
        .map(|line| line.as_ref().trim())
        .collect::<Vec<_>>()
        .join(" ");
    let parts: Vec<&str> = joined
        .split(',')
        .flat_map(str::split_whitespace)
        .collect();

    let mut subject = last_subject.map(str::to_owned);
    let mut raw_tokens = BTreeSet::new();
    let mut i = 0;
    while i < parts.len() {
        let part = parts[i];
        if part.eq_ignore_ascii_case("OR") {
            i += 1;
            continue;
        }
        if part.chars().any(|c| c.is_ascii_alphabetic()) {
            let letters = leading_letters(part);
            let rest = &part[letters.len()..];
            if is_subject(letters) && rest.starts_with(|c: char| c.is_ascii_digit()) {
                raw_tokens.insert(part.to_owned());
                subject = Some(letters.to_owned());
            } else if is_subject(letters) && rest.is_empty() {
                subject = Some(part.to_owned());
                if let Some(next) = parts.get(i + 1).filter(|next| starts_with_digit(next)) {
                    raw_tokens.insert(format!("{part}{next}"));
                    i += 1;
                }
            } else {
                raw_tokens.insert(part.to_owned());
            }
        } else if let Some(subject) = &subject {
            if is_course_number(part) || is_digit_wildcard(part) {
                raw_tokens.insert(format!("{subject}{part}"));
            }
        }
        i += 1;
    }

    let tokens: BTreeSet<CourseCode> = raw_tokens.iter().map(|raw| canonical(raw)).collect();
    (tokens.into_iter().collect(), subject)
}

fn canonical(raw: &str) -> CourseCode {
    let upper = raw.to_ascii_uppercase();
    if upper.contains('*') {
        CourseCode::wildcard(leading_letters(&upper))
    } else {
        CourseCode::new(upper)
    }
}

fn is_subject(letters: &str) -> bool {
    (2..=4).contains(&letters.len())
}

fn starts_with_digit(part: &str) -> bool {
    part.starts_with(|c: char| c.is_ascii_digit())
}

fn is_course_number(part: &str) -> bool {
    part.len() == 4 && part.chars().all(|c| c.is_ascii_digit())
}

/// `4***`: one digit, then one or more asterisks.
fn is_digit_wildcard(part: &str) -> bool {
    let mut chars = part.chars();
    chars.next().is_some_and(|c| c.is_ascii_digit())
        && part.len() > 1
        && chars.all(|c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(tokens: &[CourseCode]) -> Vec<&str> {
        tokens.iter().map(CourseCode::as_str).collect()
    }

    #[test]
    fn subject_carries_over_bare_numbers() {
        let (tokens, subject) = parse_course_tokens(&["CS", "2506, 3114"], None);
        assert_eq!(codes(&tokens), ["CS2506", "CS3114"]);
        assert_eq!(subject.as_deref(), Some("CS"));
    }

    #[test]
    fn subject_comes_from_previous_list() {
        let (tokens, subject) = parse_course_tokens(&["3214, 4104"], Some("CS"));
        assert_eq!(codes(&tokens), ["CS3214", "CS4104"]);
        assert_eq!(subject.as_deref(), Some("CS"));
    }

    #[test]
    fn full_codes_switch_subject() {
        let (tokens, subject) = parse_course_tokens(&["CS3114, MATH4175, 4176"], None);
        assert_eq!(codes(&tokens), ["CS3114", "MATH4175", "MATH4176"]);
        assert_eq!(subject.as_deref(), Some("MATH"));
    }

    #[test]
    fn wildcards_collapse_to_subject() {
        let (tokens, _) = parse_course_tokens(&["CS 4***, 3***", "HIST3*"], None);
        assert_eq!(codes(&tokens), ["CS***", "HIST***"]);
    }

    #[test]
    fn numbers_without_subject_are_dropped() {
        let (tokens, subject) = parse_course_tokens(&["2506, 3114"], None);
        assert!(tokens.is_empty());
        assert_eq!(subject, None);
    }

    #[test]
    fn short_numbers_are_not_codes() {
        let (tokens, _) = parse_course_tokens(&["CS 2506, 12, 314"], None);
        assert_eq!(codes(&tokens), ["CS2506"]);
    }

    #[test]
    fn or_connective_is_skipped() {
        let (tokens, subject) = parse_course_tokens(&["CS 2506 OR 3114", "or MATH 1226"], None);
        assert_eq!(codes(&tokens), ["CS2506", "CS3114", "MATH1226"]);
        assert_eq!(subject.as_deref(), Some("MATH"));
    }

    #[test]
    fn output_is_deduplicated_and_sorted() {
        let (tokens, _) = parse_course_tokens(&["CS 3114, 2506, CS2506"], None);
        assert_eq!(codes(&tokens), ["CS2506", "CS3114"]);
    }

    #[test]
    fn canonical_output_is_a_fixed_point() {
        let (first, _) = parse_course_tokens(&["CS 2506, 3114, 4***", "MATH 1226"], None);
        let joined = codes(&first).join(", ");
        let (second, _) = parse_course_tokens(&[joined], None);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input() {
        let (tokens, subject) = parse_course_tokens::<&str>(&[], Some("CS"));
        assert!(tokens.is_empty());
        assert_eq!(subject.as_deref(), Some("CS"));
    }
}
