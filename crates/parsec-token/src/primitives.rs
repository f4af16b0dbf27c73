//! The four primitive token combinators: `str`, `regex`, `error`, and
//! `recovery` (kept alongside its dual `error` since both are one-line
//! transforms over the payload, not sequencing/backtracking constructs).

use parsec_state::{Identity, ParseState};
use regex::Regex;

use crate::token::Parser;

/// Matches when `target[index:]` starts with `literal`. Consumes
/// `literal.len()` bytes and appends it as a single token. Fails with
/// `on_eof` at end of input, `on_mismatch` on a differing prefix. Data is
/// carried through unchanged.
pub fn str<D, E>(
    literal: impl Into<String>,
    on_eof: impl Fn(&str, usize) -> E + 'static,
    on_mismatch: impl Fn(&str, usize) -> E + 'static,
) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let literal = literal.into();
    Parser::new(move |state| {
        let (idx, data) = match state {
            ParseState::Error { .. } => return state.clone(),
            ParseState::Result { index, data, .. } => (*index, data.clone()),
        };
        let target = state.target();
        if idx >= target.len() {
            return ParseState::Error {
                target: target.to_string(),
                index: idx,
                result: state.result().to_vec(),
                error: on_eof(target, idx),
            };
        }
        if target.is_char_boundary(idx) && target[idx..].starts_with(literal.as_str()) {
            let mut result = state.result().to_vec();
            result.push(literal.clone());
            ParseState::Result {
                target: target.to_string(),
                index: idx + literal.len(),
                result,
                data,
            }
        } else {
            ParseState::Error {
                target: target.to_string(),
                index: idx,
                result: state.result().to_vec(),
                error: on_mismatch(target, idx),
            }
        }
    })
}

/// Applies `pattern` anchored at the current index. On match, consumes the
/// matched length and appends the matched substring as a single token. EOF
/// and mismatch mirror `str`. The caller is responsible for anchoring the
/// pattern appropriately (e.g. with `^`) if unanchored matches elsewhere in
/// the slice should not count.
pub fn regex<D, E>(
    pattern: Regex,
    on_eof: impl Fn(&str, usize) -> E + 'static,
    on_mismatch: impl Fn(&str, usize) -> E + 'static,
) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        let (idx, data) = match state {
            ParseState::Error { .. } => return state.clone(),
            ParseState::Result { index, data, .. } => (*index, data.clone()),
        };
        let target = state.target();
        if idx >= target.len() {
            return ParseState::Error {
                target: target.to_string(),
                index: idx,
                result: state.result().to_vec(),
                error: on_eof(target, idx),
            };
        }
        if !target.is_char_boundary(idx) {
            return ParseState::Error {
                target: target.to_string(),
                index: idx,
                result: state.result().to_vec(),
                error: on_mismatch(target, idx),
            };
        }
        match pattern.find(&target[idx..]) {
            Some(m) if m.start() == 0 => {
                let matched = m.as_str().to_string();
                let mut result = state.result().to_vec();
                result.push(matched.clone());
                ParseState::Result {
                    target: target.to_string(),
                    index: idx + matched.len(),
                    result,
                    data,
                }
            }
            _ => ParseState::Error {
                target: target.to_string(),
                index: idx,
                result: state.result().to_vec(),
                error: on_mismatch(target, idx),
            },
        }
    })
}

/// Always succeeds, consuming nothing and appending nothing. Enables
/// explicit epsilon productions and serves as the identity parser for
/// `optional`/`contextual`-style composition.
pub fn empty<D, E>() -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(|state| state.clone())
}

/// If the input is an error, passes through unchanged; if a result,
/// converts it into an error at the same `index`/`result` carrying `value`
/// the mismatch unchanged.
pub fn error<D, E>(value: E) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| state.clone().into_error(value.clone()))
}

/// Dual of `error`: if the input is a result, passes through unchanged; if
/// an error, produces a result at the same `index`/`result` with data
/// `from_error(state)`.
pub fn recovery<D, E>(from_error: impl Fn(&ParseState<D, E>) -> D + 'static) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        if state.is_error() {
            let data = from_error(state);
            state.clone().into_result(data)
        } else {
            state.clone()
        }
    })
}
