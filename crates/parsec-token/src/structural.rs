//! Structural, token-only combinators. All of these (except `side_effect`)
//! short-circuit: given an error input they propagate it unchanged without
//! invoking any sub-parser.

use parsec_state::{Identity, ParseState};

use crate::token::Parser;

/// Greedy Kleene closure: apply `p` until it errors or the input is
/// exhausted; return the last successful state.
///
/// Termination is not guaranteed by `p`
/// alone; this implementation defends against a non-advancing `p` by
/// stopping once an iteration fails to increase `index`, rather than
/// looping forever.
pub fn many<D, E>(p: Parser<D, E>) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        if state.is_error() {
            return state.clone();
        }
        let mut current = state.clone();
        while current.index() < current.target().len() {
            let next = p.apply(&current);
            if next.is_error() || next.index() <= current.index() {
                break;
            }
            current = next;
        }
        current
    })
}

/// `many(p)` that additionally requires at least one token to have been
/// appended, failing with `on_empty` otherwise.
pub fn many1<D, E>(p: Parser<D, E>, on_empty: impl Fn(&str, usize) -> E + 'static) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let closure = many(p);
    Parser::new(move |state| {
        if state.is_error() {
            return state.clone();
        }
        let before = state.result().len();
        let out = closure.apply(state);
        if out.result().len() > before {
            out
        } else {
            ParseState::Error {
                target: out.target().to_string(),
                index: out.index(),
                result: out.result().to_vec(),
                error: on_empty(out.target(), out.index()),
            }
        }
    })
}

/// Apply `p`; on failure return the original state unchanged, on success
/// return `p`'s result.
pub fn optional<D, E>(p: Parser<D, E>) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        if state.is_error() {
            return state.clone();
        }
        let out = p.apply(state);
        if out.is_error() {
            state.clone()
        } else {
            out
        }
    })
}

/// Advances one character at a time, appending nothing, until `terminator`
/// succeeds at the current position (without consuming it). Produces a
/// single token equal to the skipped substring. Fails with `on_eof` if the
/// end of input is reached first.
pub fn until<D, E>(
    terminator: Parser<D, E>,
    on_eof: impl Fn(&str, usize) -> E + 'static,
) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        let data = match state {
            ParseState::Error { .. } => return state.clone(),
            ParseState::Result { data, .. } => data.clone(),
        };
        let start = state.index();
        let target = state.target().to_string();
        let len = target.len();
        let mut idx = start;
        loop {
            let probe = ParseState::Result {
                target: target.clone(),
                index: idx,
                result: Vec::new(),
                data: data.clone(),
            };
            if terminator.apply(&probe).is_result() {
                let skipped = target[start..idx].to_string();
                let mut result = state.result().to_vec();
                result.push(skipped);
                return ParseState::Result {
                    target,
                    index: idx,
                    result,
                    data,
                };
            }
            if idx >= len {
                return ParseState::Error {
                    target: target.clone(),
                    index: idx,
                    result: state.result().to_vec(),
                    error: on_eof(&target, idx),
                };
            }
            let advance = target[idx..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            idx += advance;
        }
    })
}

/// Ordered, committed choice: try each `p` against the same input state,
/// returning the first success. All errors are discarded in favour of
/// `on_all_fail`. This is the backtracking construct of the
/// token layer.
pub fn choice<D, E>(
    ps: Vec<Parser<D, E>>,
    on_all_fail: impl Fn(&str, usize) -> E + 'static,
) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        if state.is_error() {
            return state.clone();
        }
        for p in &ps {
            let out = p.apply(state);
            if out.is_result() {
                return out;
            }
        }
        ParseState::Error {
            target: state.target().to_string(),
            index: state.index(),
            result: state.result().to_vec(),
            error: on_all_fail(state.target(), state.index()),
        }
    })
}

/// Runs `probe` to obtain `s'`, computes `f(s')`, then applies that parser
/// to the *original* state — `probe`'s consumption is discarded.
pub fn lookahead<D, E>(
    probe: Parser<D, E>,
    f: impl Fn(&ParseState<D, E>) -> Parser<D, E> + 'static,
) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        if state.is_error() {
            return state.clone();
        }
        let probed = probe.apply(state);
        let next = f(&probed);
        next.apply(state)
    })
}

/// Invokes `effect(state)` and returns `state` unchanged, for externally
/// observable side effects such as logging.
pub fn side_effect<D, E>(effect: impl Fn(&ParseState<D, E>) + 'static) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        effect(state);
        state.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use parsec_state::identity::Ignored;
    use pretty_assertions::assert_eq;

    fn seed(target: &str) -> ParseState<Ignored<()>, &'static str> {
        ParseState::new_result(target, 0, vec![], Ignored(())).unwrap()
    }

    #[test]
    fn many_is_greedy_and_stops_on_first_failure() {
        let a: Parser<Ignored<()>, &'static str> = primitives::str("a", |_, _| "eof", |_, _| "mismatch");
        let p = many(a);
        let out = p.apply(&seed("aaab"));
        assert_eq!(out.result(), &["a".to_string(), "a".to_string(), "a".to_string()]);
        assert_eq!(out.index(), 3);
    }

    #[test]
    fn many_on_never_matching_parser_returns_input_unchanged() {
        let a: Parser<Ignored<()>, &'static str> = primitives::str("z", |_, _| "eof", |_, _| "mismatch");
        let p = many(a);
        let out = p.apply(&seed("aaab"));
        assert!(out.result().is_empty());
        assert_eq!(out.index(), 0);
    }

    #[test]
    fn many1_fails_on_empty_match() {
        let a: Parser<Ignored<()>, &'static str> = primitives::str("z", |_, _| "eof", |_, _| "mismatch");
        let p = many1(a, |_, _| "empty");
        let out = p.apply(&seed("aaab"));
        assert_eq!(out.error(), Some(&"empty"));
    }

    #[test]
    fn optional_is_identity_on_failure() {
        let a: Parser<Ignored<()>, &'static str> = primitives::str("z", |_, _| "eof", |_, _| "mismatch");
        let p = optional(a);
        let out = p.apply(&seed("aaab"));
        assert!(out.is_result());
        assert_eq!(out.index(), 0);
        assert!(out.result().is_empty());
    }

    #[test]
    fn until_yields_skipped_substring_without_consuming_terminator() {
        let quote: Parser<Ignored<()>, &'static str> = primitives::str("\"", |_, _| "eof", |_, _| "mismatch");
        let p = until(quote, |_, _| "eof");
        let out = p.apply(&seed("hello\"world"));
        assert_eq!(out.result(), &["hello".to_string()]);
        assert_eq!(out.index(), 5);
    }

    #[test]
    fn until_on_immediate_terminator_yields_empty_token() {
        let quote: Parser<Ignored<()>, &'static str> = primitives::str("\"", |_, _| "eof", |_, _| "mismatch");
        let p = until(quote, |_, _| "eof");
        let out = p.apply(&seed("\"world"));
        assert_eq!(out.result(), &["".to_string()]);
        assert_eq!(out.index(), 0);
    }

    #[test]
    fn until_fails_at_eof_without_terminator() {
        let quote: Parser<Ignored<()>, &'static str> = primitives::str("\"", |_, _| "eof", |_, _| "mismatch");
        let p = until(quote, |_, _| "unterminated");
        let out = p.apply(&seed("hello"));
        assert_eq!(out.error(), Some(&"unterminated"));
    }

    #[test]
    fn choice_takes_first_success() {
        let a: Parser<Ignored<()>, &'static str> = primitives::str("a", |_, _| "eof", |_, _| "mismatch");
        let b: Parser<Ignored<()>, &'static str> = primitives::str("b", |_, _| "eof", |_, _| "mismatch");
        let p = choice(vec![a, b], |_, _| "all-failed");
        let out = p.apply(&seed("bcd"));
        assert_eq!(out.result(), &["b".to_string()]);
    }

    #[test]
    fn choice_fails_with_on_all_fail_when_none_match() {
        let a: Parser<Ignored<()>, &'static str> = primitives::str("a", |_, _| "eof", |_, _| "mismatch");
        let p = choice(vec![a], |_, _| "all-failed");
        let out = p.apply(&seed("zzz"));
        assert_eq!(out.error(), Some(&"all-failed"));
    }
}
