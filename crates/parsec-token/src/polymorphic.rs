//! Combinators whose shape (map/assert/chain/contextual) is shared between
//! the token and symbol layers. This module holds the token-layer
//! renditions.

use parsec_state::{Identity, ParseState};

use crate::token::{Parser, TokenParser};

/// Applies `p`; on success replaces `data` with `mdata(state)`, on failure
/// replaces `error` with `merror(state)`. Neither `index` nor `result`
/// changes.
pub fn map<Din, Ein, D, E, D2, E2>(
    p: TokenParser<Din, Ein, D, E>,
    mdata: impl Fn(&ParseState<D, E>) -> D2 + 'static,
    merror: impl Fn(&ParseState<D, E>) -> E2 + 'static,
) -> TokenParser<Din, Ein, D2, E2>
where
    Din: Identity,
    Ein: Identity,
    D: Clone,
    E: Clone,
    D2: Clone,
    E2: Clone,
{
    TokenParser::new(move |state: &ParseState<Din, Ein>| {
        let out = p.apply(state);
        out.map_payload(|s| mdata(s), |s| merror(s))
    })
}

/// Applies `p`. On success, invokes `check(state)`; a non-`None` error
/// value converts the success into an `Error` at the same position. On
/// failure, passes through unchanged.
pub fn assert<D, E>(
    p: Parser<D, E>,
    check: impl Fn(&ParseState<D, E>) -> Option<E> + 'static,
) -> Parser<D, E>
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
            return out;
        }
        match check(&out) {
            Some(error) => out.into_error(error),
            None => out,
        }
    })
}

/// Sequences `ps` left-to-right, threading state and accumulating `result`.
/// The first error short-circuits the rest. Without an action, the final
/// state is whatever the last step produced — which is also why
/// `chain([p])` is observationally equal to `p`.
pub fn chain<D, E>(ps: Vec<Parser<D, E>>) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        if state.is_error() {
            return state.clone();
        }
        let mut current = state.clone();
        for p in &ps {
            let next = p.apply(&current);
            if next.is_error() {
                return next;
            }
            current = next;
        }
        current
    })
}

/// `chain` with an action: reconstructs the per-step data vector and
/// invokes `action` once the whole sequence has succeeded, using its
/// return value as the final data.
///
/// A backreference-map implementation is needed in languages where a
/// sequenced builder's closures alias the loop variable. Rust's ownership
/// model has no such hazard, so the data vector is simply threaded
/// explicitly through the loop instead (see `DESIGN.md`).
pub fn chain_with_action<D, E, D2>(
    ps: Vec<Parser<D, E>>,
    action: impl Fn(Vec<D>) -> D2 + 'static,
) -> TokenParser<D, E, D2, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
    D2: Clone,
{
    TokenParser::new(move |state: &ParseState<D, E>| {
        if let ParseState::Error {
            target,
            index,
            result,
            error,
        } = state.clone()
        {
            return ParseState::Error {
                target,
                index,
                result,
                error,
            };
        }

        let mut current = state.clone();
        let mut collected: Vec<D> = Vec::with_capacity(ps.len());
        for p in &ps {
            match p.apply(&current) {
                ParseState::Error {
                    target,
                    index,
                    result,
                    error,
                } => {
                    return ParseState::Error {
                        target,
                        index,
                        result,
                        error,
                    };
                }
                ParseState::Result {
                    target,
                    index,
                    result,
                    data,
                } => {
                    collected.push(data.clone());
                    current = ParseState::Result {
                        target,
                        index,
                        result,
                        data,
                    };
                }
            }
        }

        let (target, index, result) = current.into_parts();
        ParseState::Result {
            target,
            index,
            result,
            data: action(collected),
        }
    })
}

/// Syntactic sugar: builds a chain `[initial, ...steps]` where each step is
/// produced by inspecting the running state, then delegates to `chain`'s
/// sequencing semantics without an action.
pub fn contextual<D, E>(
    initial: Parser<D, E>,
    next: impl Fn(&ParseState<D, E>) -> Option<Parser<D, E>> + 'static,
) -> Parser<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    Parser::new(move |state| {
        if state.is_error() {
            return state.clone();
        }
        let mut current = initial.apply(state);
        if current.is_error() {
            return current;
        }
        while let Some(step) = next(&current) {
            let out = step.apply(&current);
            if out.is_error() {
                return out;
            }
            current = out;
        }
        current
    })
}
