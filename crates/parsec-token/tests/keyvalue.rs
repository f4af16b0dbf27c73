//! A small non-recursive `key=value;key=value` grammar exercising `chain`,
//! `choice`, `until` and `many` at their boundaries. Token combinators
//! cannot express the mutually- or left-recursive grammars the symbol
//! layer handles, so this is deliberately a flat, linear grammar.

use parsec_token::{chain_with_action, choice, many, map, regex, str, until, Parser};
use parsec_state::ParseState;
use pretty_assertions::assert_eq;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
struct Pairs(Vec<(String, String)>);

fn ident() -> Parser<Pairs, String> {
    regex(
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap(),
        |_, _| "unexpected end of input".to_string(),
        |_, _| "expected an identifier".to_string(),
    )
}

fn quoted_value() -> Parser<Pairs, String> {
    let open = str("\"", |_, _| "unexpected end of input".to_string(), |_, _| "expected opening quote".to_string());
    let body = until(
        str("\"", |_, _| "unterminated string".to_string(), |_, _| "unreachable".to_string()),
        |_, _| "unterminated string".to_string(),
    );
    let close = str("\"", |_, _| "unexpected end of input".to_string(), |_, _| "expected closing quote".to_string());
    chain_with_action(vec![open, body, close], |_: Vec<Pairs>| Pairs(Vec::new()))
}

fn one_pair() -> Parser<Pairs, String> {
    let key = ident();
    let eq = str("=", |_, _| "unexpected end of input".to_string(), |_, _| "expected '='".to_string());
    let value = choice(
        vec![bare_value(), quoted_value()],
        |_, _| "expected a value".to_string(),
    );
    chain_with_action(vec![key, eq, value], |_: Vec<Pairs>| Pairs(Vec::new()))
}

fn bare_value() -> Parser<Pairs, String> {
    regex(
        Regex::new(r#"^[^;"]+"#).unwrap(),
        |_, _| "unexpected end of input".to_string(),
        |_, _| "expected a value".to_string(),
    )
}

fn parse_pairs(input: &str) -> ParseState<Pairs, String> {
    // `chain_with_action`/`choice` only see their own slots, so the pairing
    // into `Pairs` happens here by reading `result()` afterwards. A record's
    // token count isn't fixed — a bare value is one token (key, "=", value,
    // ";") but a quoted one is three (key, "=", '"', body, '"', ";") — so
    // `extract_pairs` splits on the literal ";" tokens instead of chunking
    // by a fixed width.
    let semi = str(";", |_, _| "unexpected end of input".to_string(), |_, _| "expected ';'".to_string());
    let pair_then_semi = map(
        chain_with_action(vec![one_pair(), semi], |_: Vec<Pairs>| Pairs(Vec::new())),
        |s: &ParseState<Pairs, String>| Pairs(extract_pairs(s.result())),
        |s: &ParseState<Pairs, String>| s.error().cloned().unwrap_or_default(),
    );
    let p = many(pair_then_semi);
    let seed = ParseState::new_result(input, 0, vec![], Pairs(Vec::new())).unwrap();
    p.apply(&seed)
}

fn extract_pairs(tokens: &[String]) -> Vec<(String, String)> {
    // Each record is `key, "=", ...value tokens` followed by a ";"
    // delimiter; splitting on ";" itself gives exactly one record's worth of
    // tokens regardless of whether the value was bare (one token) or quoted
    // (three: opening quote, body, closing quote).
    tokens
        .split(|t| t.as_str() == ";")
        .filter(|record| !record.is_empty())
        .map(|record| {
            let key = record[0].clone();
            let value = match &record[2..] {
                [bare] => bare.clone(),
                [_open_quote, body, _close_quote] => body.clone(),
                _ => String::new(),
            };
            (key, value)
        })
        .collect()
}

#[test]
fn parses_a_sequence_of_bare_and_quoted_values() {
    let out = parse_pairs("a=1;b=\"two\";c=3;");
    assert!(out.is_result());
    assert_eq!(out.index(), "a=1;b=\"two\";c=3;".len());
    assert_eq!(
        out.data().unwrap().0,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "two".to_string()),
            ("c".to_string(), "3".to_string()),
        ]
    );
}

#[test]
fn stops_before_a_malformed_pair_without_erroring() {
    // `many` is greedy-but-safe: it stops at the first failing iteration
    // and returns the last good state rather than propagating the error.
    let out = parse_pairs("a=1;b=2;not-a-pair");
    assert!(out.is_result());
    assert_eq!(out.index(), "a=1;b=2;".len());
}

#[test]
fn until_reports_unterminated_quoted_values() {
    let value = quoted_value();
    let seed: ParseState<Pairs, String> = ParseState::new_result("\"unterminated", 0, vec![], Pairs(Vec::new())).unwrap();
    let out = value.apply(&seed);
    assert_eq!(out.error(), Some(&"unterminated string".to_string()));
}
