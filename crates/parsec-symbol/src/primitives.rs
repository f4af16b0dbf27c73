//! The symbol-layer primitives: lifting a token parser
//! into the symbol world, epsilon, lazy/recursive grammar definitions, and
//! unordered alternation.

use std::cell::RefCell;
use std::rc::Rc;

use parsec_state::{Identity, ParseState};
use parsec_token::Parser as TokenParser;

use crate::engine::Engine;
use crate::symbol::{Continuation, Symbol, SymbolParser};

/// Always succeeds without consuming input, publishing the input state
/// unchanged — the symbol-layer counterpart of the token layer's `empty`.
pub fn empty<D, E>() -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    SymbolParser::new(|state: ParseState<D, E>, k: Continuation<D, E>, _engine: &Rc<Engine>| {
        k(&state);
    })
}

/// Lifts a token combinator into the symbol world: runs it synchronously to
/// completion and publishes its single result once. This is
/// the seam where terminals enter a GLL grammar.
pub fn to_symbol<D, E>(token: TokenParser<D, E>) -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    SymbolParser::new(move |state: ParseState<D, E>, k: Continuation<D, E>, _engine: &Rc<Engine>| {
        let out = token.apply(&state);
        k(&out);
    })
}

/// Defers construction of the wrapped combinator until the first dispatch,
/// memoising the result of `thunk` afterwards. This is the mechanism that
/// lets a grammar rule reference itself: build a placeholder
/// `Rc<RefCell<Option<Symbol<..>>>>` cell, hand `lazy(move || match
/// cell.borrow().as_ref() { Some(rule) => rule.clone(), None => ... })` to
/// whatever production needs the recursive reference, then backfill the
/// cell once the real combinator exists (see `recursive` below for the
/// packaged form of this idiom).
pub fn lazy<D, E>(thunk: impl Fn() -> Symbol<D, E> + 'static) -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let resolved: Rc<RefCell<Option<Symbol<D, E>>>> = Rc::new(RefCell::new(None));
    SymbolParser::new(move |state: ParseState<D, E>, k: Continuation<D, E>, engine: &Rc<Engine>| {
        let inner = {
            let mut slot = resolved.borrow_mut();
            let built = match slot.take() {
                Some(existing) => existing,
                None => thunk(),
            };
            *slot = Some(Rc::clone(&built));
            built
        };
        inner.dispatch(engine, state, k);
    })
}

/// Packages the `Rc<RefCell<Option<..>>>` self-reference wiring `lazy`
/// requires for recursive grammars into a single call: `build` receives a
/// handle that behaves like the final rule (every dispatch on it forwards
/// to whatever `build` itself returns) and must return the real rule
/// definition.
///
/// ```ignore
/// let expr = recursive(|expr| {
///     chain(vec![to_symbol(digit()), expr.clone()])
/// });
/// ```
pub fn recursive<D, E>(build: impl FnOnce(Symbol<D, E>) -> Symbol<D, E>) -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let cell: Rc<RefCell<Option<Symbol<D, E>>>> = Rc::new(RefCell::new(None));
    let cell_for_handle = Rc::clone(&cell);
    // `lazy` only calls this thunk the first time `handle` is dispatched, and
    // dispatch can't happen until `build` below has returned the real rule to
    // the caller and `cell` has been filled in — so the `None` arm can't
    // actually be reached.
    let handle = lazy(move || match cell_for_handle.borrow().as_ref() {
        Some(rule) => Rc::clone(rule),
        None => unreachable!("recursive rule dispatched before its definition was assigned"),
    });
    let built = build(handle);
    *cell.borrow_mut() = Some(Rc::clone(&built));
    built
}

/// Dispatches every alternative against the same input state, for error
/// input forwarding it unchanged without trying any alternative.
/// Unlike `choice` (token-only), every alternative is explored
/// regardless of whether an earlier one succeeds — ambiguity is the point.
/// Deduplication by result identity happens automatically, since every
/// alternative publishes through this combinator's own memo entry.
pub fn alternatives<D, E>(ps: Vec<Symbol<D, E>>) -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    SymbolParser::new(move |state: ParseState<D, E>, k: Continuation<D, E>, engine: &Rc<Engine>| {
        if state.is_error() {
            k(&state);
            return;
        }
        for p in &ps {
            p.dispatch(engine, state.clone(), Rc::clone(&k));
        }
    })
}
