//! The token combinator core: a memoised state transformer.
//!
//! Each combinator wraps a raw transformer `t`. The wrapped version:
//! 1. Clears its memo the first time it sees a different `target` (the
//!    generation counter is implemented as "last seen target").
//! 2. Returns the memoised result if `state.identity()` was seen before.
//! 3. Otherwise calls `t(state)`, stores and returns the result.
//!
//! Most combinators in this crate are *endo*: they accept and return a
//! `ParseState<D, E>` of the same type (`Parser<D, E>`). `map` and
//! `chain`'s action form are the exceptions, which is why the underlying
//! struct carries independent input (`Din`/`Ein`) and output (`Dout`/`Eout`)
//! type parameters.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use parsec_state::{EngineFault, Identity, ParseState};

/// A memoised token-combinator transformer from `ParseState<Din, Ein>` to
/// `ParseState<Dout, Eout>`.
pub struct TokenParser<Din, Ein, Dout, Eout> {
    last_target: RefCell<Option<String>>,
    memo: RefCell<HashMap<String, ParseState<Dout, Eout>>>,
    transform: Rc<dyn Fn(&ParseState<Din, Ein>) -> ParseState<Dout, Eout>>,
}

/// The common case: a combinator whose input and output payload types
/// coincide (`str`, `many`, `choice`, `assert`, ...).
pub type Parser<D, E> = TokenParser<D, E, D, E>;

impl<Din, Ein, Dout, Eout> Clone for TokenParser<Din, Ein, Dout, Eout> {
    fn clone(&self) -> Self {
        // Cloning a combinator shares its transform but starts with a fresh
        // memo: two handles to the "same" grammar rule are still distinct
        // memoisation scopes unless they are the literal same `Rc`-backed
        // instance reused via `.clone()` of an `Rc<Parser<..>>` at the call
        // site, which is the pattern `lazy`/recursive grammars use.
        TokenParser {
            last_target: RefCell::new(None),
            memo: RefCell::new(HashMap::new()),
            transform: Rc::clone(&self.transform),
        }
    }
}

impl<Din, Ein, Dout, Eout> TokenParser<Din, Ein, Dout, Eout>
where
    Din: Identity,
    Ein: Identity,
    Dout: Clone,
    Eout: Clone,
{
    pub fn new(transform: impl Fn(&ParseState<Din, Ein>) -> ParseState<Dout, Eout> + 'static) -> Self {
        TokenParser {
            last_target: RefCell::new(None),
            memo: RefCell::new(HashMap::new()),
            transform: Rc::new(transform),
        }
    }

    /// Applies this combinator to `state`, consulting and updating the memo
    /// table. This is the operation every other combinator calls on its
    /// sub-parsers.
    pub fn apply(&self, state: &ParseState<Din, Ein>) -> ParseState<Dout, Eout> {
        {
            let mut last = self.last_target.borrow_mut();
            if last.as_deref() != Some(state.target()) {
                self.memo.borrow_mut().clear();
                *last = Some(state.target().to_string());
            }
        }

        let id = state.identity();
        if let Some(cached) = self.memo.borrow().get(&id) {
            return cached.clone();
        }

        let out = (self.transform)(state);
        self.memo.borrow_mut().insert(id, out.clone());
        out
    }

    /// `run(target, initialData, index)`: returns exactly one `ParseState`.
    pub fn run_at(
        &self,
        target: impl Into<String>,
        initial_data: Din,
        index: usize,
    ) -> Result<ParseState<Dout, Eout>, EngineFault> {
        let seed = ParseState::new_result(target, index, Vec::new(), initial_data)?;
        Ok(self.apply(&seed))
    }

    /// `run(target, initialData)` with `index` defaulting to 0.
    pub fn run(
        &self,
        target: impl Into<String>,
        initial_data: Din,
    ) -> Result<ParseState<Dout, Eout>, EngineFault> {
        self.run_at(target, initial_data, 0)
    }
}
