use winnow::ascii::Caseless;
use winnow::combinator::{alt, cut_err, delimited, not, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::PrereqExpr;

// -- Whitespace & operators -------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

fn word_char(input: &mut &str) -> ModalResult<char> {
    one_of(|c: char| c.is_ascii_alphanumeric()).parse_next(input)
}

fn and_op(input: &mut &str) -> ModalResult<()> {
    (ws, Caseless("and"), not(word_char)).void().parse_next(input)
}

fn or_op(input: &mut &str) -> ModalResult<()> {
    (ws, Caseless("or"), not(word_char)).void().parse_next(input)
}

// -- Course literals --------------------------------------------------------

/// `SUBJECT NUMBER`: letters, whitespace, then letters or digits (`CS 2506`,
/// `MATH 1225H`). Kept as written with a single separating space.
fn course_literal(input: &mut &str) -> ModalResult<PrereqExpr> {
    let (subject, _, number) = (
        take_while(1.., |c: char| c.is_ascii_alphabetic()),
        take_while(1.., char::is_whitespace),
        take_while(1.., |c: char| c.is_ascii_alphanumeric()),
    )
        .parse_next(input)?;
    Ok(PrereqExpr::Course(format!("{subject} {number}")))
}

// -- Expressions (precedence: OR < AND < primary) ---------------------------

fn primary(input: &mut &str) -> ModalResult<PrereqExpr> {
    ws.parse_next(input)?;
    alt((delimited('(', expr, (ws, ')')), course_literal))
        .context(StrContext::Expected(StrContextValue::Description("course")))
        .parse_next(input)
}

fn and_expr(input: &mut &str) -> ModalResult<PrereqExpr> {
    let first = primary(input)?;
    let rest: Vec<PrereqExpr> =
        repeat(0.., preceded(and_op, cut_err(primary))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, PrereqExpr::and))
}

fn or_expr(input: &mut &str) -> ModalResult<PrereqExpr> {
    let first = and_expr(input)?;
    let rest: Vec<PrereqExpr> =
        repeat(0.., preceded(or_op, cut_err(and_expr))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, PrereqExpr::or))
}

fn expr(input: &mut &str) -> ModalResult<PrereqExpr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn prereq_expr(input: &mut &str) -> ModalResult<PrereqExpr> {
    let parsed = expr(input)?;
    ws.parse_next(input)?;
    Ok(parsed)
}
