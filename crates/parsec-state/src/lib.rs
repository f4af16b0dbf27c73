//! Shared parse-state and identity model underlying both the
//! token-combinator and symbol-combinator layers of `parsec`.
//!
//! This crate has no parsing logic of its own: it is the immutable value
//! every combinator passes around, plus the identity contract that makes
//! memoisation correct.

use std::fmt;

mod fault;
pub mod identity;

pub use fault::EngineFault;
pub use identity::{Identity, IdentityPolicy};

/// An immutable snapshot of parsing progress: either a successful `Result`
/// or a failed `Error`. Positions are UTF-8 byte offsets into `target`
/// (see `DESIGN.md` for why byte offsets rather than UTF-16 code units).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseState<D, E> {
    Result {
        target: String,
        index: usize,
        result: Vec<String>,
        data: D,
    },
    Error {
        target: String,
        index: usize,
        result: Vec<String>,
        error: E,
    },
}

impl<D, E> ParseState<D, E> {
    /// Builds a successful state, checking the data-model invariants below.
    pub fn new_result(
        target: impl Into<String>,
        index: usize,
        result: Vec<String>,
        data: D,
    ) -> Result<Self, EngineFault> {
        let target = target.into();
        check_invariants(&target, index, &result)?;
        Ok(ParseState::Result {
            target,
            index,
            result,
            data,
        })
    }

    /// Builds a failed state, checking the data-model invariants below.
    pub fn new_error(
        target: impl Into<String>,
        index: usize,
        result: Vec<String>,
        error: E,
    ) -> Result<Self, EngineFault> {
        let target = target.into();
        check_invariants(&target, index, &result)?;
        Ok(ParseState::Error {
            target,
            index,
            result,
            error,
        })
    }

    pub fn target(&self) -> &str {
        match self {
            ParseState::Result { target, .. } | ParseState::Error { target, .. } => target,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ParseState::Result { index, .. } | ParseState::Error { index, .. } => *index,
        }
    }

    pub fn result(&self) -> &[String] {
        match self {
            ParseState::Result { result, .. } | ParseState::Error { result, .. } => result,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ParseState::Error { .. })
    }

    pub fn is_result(&self) -> bool {
        !self.is_error()
    }

    pub fn data(&self) -> Option<&D> {
        match self {
            ParseState::Result { data, .. } => Some(data),
            ParseState::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            ParseState::Error { error, .. } => Some(error),
            ParseState::Result { .. } => None,
        }
    }

    /// Consumes `self`, dropping the payload and returning the shared
    /// `(target, index, result)` triple. Used by combinators that replace
    /// only the payload (`map`, `error`, `recovery`).
    pub fn into_parts(self) -> (String, usize, Vec<String>) {
        match self {
            ParseState::Result {
                target,
                index,
                result,
                ..
            }
            | ParseState::Error {
                target,
                index,
                result,
                ..
            } => (target, index, result),
        }
    }

    /// Converts a `Result` into an `Error` at the same position, carrying
    /// `error`. A state that is already an `Error` passes through unchanged
    /// (the dual of the `error` combinator).
    pub fn into_error(self, error: E) -> Self {
        match self {
            ParseState::Result {
                target,
                index,
                result,
                ..
            } => ParseState::Error {
                target,
                index,
                result,
                error,
            },
            existing @ ParseState::Error { .. } => existing,
        }
    }

    /// Converts an `Error` into a `Result` at the same position, carrying
    /// `data`. A state that is already a `Result` passes through unchanged
    /// (the dual of the `recovery` combinator).
    pub fn into_result(self, data: D) -> Self {
        match self {
            ParseState::Error {
                target,
                index,
                result,
                ..
            } => ParseState::Result {
                target,
                index,
                result,
                data,
            },
            existing @ ParseState::Result { .. } => existing,
        }
    }

    /// Replaces the payload depending on the current branch (the `map`
    /// combinator). `mdata`/`merror` observe the whole state (not just the old
    /// payload) because several grammars mint the new data from `result`.
    pub fn map_payload<D2, E2>(
        self,
        mdata: impl FnOnce(&Self) -> D2,
        merror: impl FnOnce(&Self) -> E2,
    ) -> ParseState<D2, E2> {
        match &self {
            ParseState::Result { .. } => {
                let data = mdata(&self);
                let (target, index, result) = self.into_parts();
                ParseState::Result {
                    target,
                    index,
                    result,
                    data,
                }
            }
            ParseState::Error { .. } => {
                let error = merror(&self);
                let (target, index, result) = self.into_parts();
                ParseState::Error {
                    target,
                    index,
                    result,
                    error,
                }
            }
        }
    }
}

impl<D: Identity, E: Identity> ParseState<D, E> {
    /// `"{target}_{index}"`, with `"_{payload.identity()}"` appended only
    /// when that identity is non-empty.
    pub fn identity(&self) -> String {
        let payload_identity = match self {
            ParseState::Result { data, .. } => data.identity(),
            ParseState::Error { error, .. } => error.identity(),
        };
        let mut id = format!("{}_{}", self.target(), self.index());
        if !payload_identity.is_empty() {
            id.push('_');
            id.push_str(&payload_identity);
        }
        id
    }
}

impl<D: fmt::Display, E: fmt::Display> fmt::Display for ParseState<D, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseState::Result { index, data, .. } => write!(f, "Result@{index}({data})"),
            ParseState::Error { index, error, .. } => write!(f, "Error@{index}({error})"),
        }
    }
}

fn check_invariants(target: &str, index: usize, result: &[String]) -> Result<(), EngineFault> {
    let len = target.len();
    if index > len {
        return Err(EngineFault::IndexOutOfBounds { index, len });
    }
    let consumed: usize = result.iter().map(|t| t.len()).sum();
    if consumed > index {
        return Err(EngineFault::ResultLongerThanIndex { consumed, index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity_omits_payload_when_empty() {
        let s: ParseState<identity::Ignored<i64>, identity::Ignored<()>> =
            ParseState::new_result("abc", 1, vec!["a".into()], identity::Ignored(0)).unwrap();
        assert_eq!(s.identity(), "abc_1");
    }

    #[test]
    fn identity_includes_payload_when_present() {
        let s: ParseState<i64, ()> =
            ParseState::new_result("abc", 1, vec!["a".into()], 7).unwrap();
        assert_eq!(s.identity(), "abc_1_7");
    }

    #[test]
    fn rejects_index_past_end() {
        let s: Result<ParseState<(), ()>, _> = ParseState::new_result("ab", 5, vec![], ());
        assert!(matches!(s, Err(EngineFault::IndexOutOfBounds { .. })));
    }

    #[test]
    fn rejects_result_longer_than_index() {
        let s: Result<ParseState<(), ()>, _> =
            ParseState::new_result("abcd", 1, vec!["abcd".into()], ());
        assert!(matches!(s, Err(EngineFault::ResultLongerThanIndex { .. })));
    }

    #[test]
    fn into_error_passes_through_existing_error() {
        let e: ParseState<(), &'static str> = ParseState::new_error("x", 0, vec![], "boom").unwrap();
        let e2 = e.clone().into_error("other");
        assert_eq!(e2.error(), Some(&"boom"));
    }

    #[test]
    fn into_result_converts_error_at_same_position() {
        let e: ParseState<i64, &'static str> = ParseState::new_error("x", 1, vec!["x".into()], "boom").unwrap();
        let r = e.into_result(9);
        assert!(r.is_result());
        assert_eq!(r.index(), 1);
        assert_eq!(r.data(), Some(&9));
    }

    #[test]
    fn display_shows_branch_index_and_payload() {
        let r: ParseState<i64, &'static str> = ParseState::new_result("x", 1, vec!["x".into()], 7).unwrap();
        assert_eq!(r.to_string(), "Result@1(7)");
        let e: ParseState<i64, &'static str> = ParseState::new_error("x", 1, vec!["x".into()], "boom").unwrap();
        assert_eq!(e.to_string(), "Error@1(boom)");
    }
}
