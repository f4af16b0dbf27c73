//! Symbol-layer renditions of the combinators shared with the token layer
//! Where the token versions transform a state synchronously
//! and return it, these forward every published result through a
//! continuation, since a symbol combinator may produce any number of
//! results per dispatch.

use std::rc::Rc;

use parsec_state::{Identity, ParseState};

use crate::engine::Engine;
use crate::symbol::{Continuation, Symbol, SymbolParser, SymbolRef};

/// Applies `p`; every published result has its `data`/`error` replaced by
/// `mdata`/`merror` depending on its branch.
pub fn map<Din, Ein, D, E, D2, E2>(
    p: SymbolRef<Din, Ein, D, E>,
    mdata: impl Fn(&ParseState<D, E>) -> D2 + 'static,
    merror: impl Fn(&ParseState<D, E>) -> E2 + 'static,
) -> SymbolRef<Din, Ein, D2, E2>
where
    Din: Identity,
    Ein: Identity,
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
    D2: Clone + Identity + 'static,
    E2: Clone + Identity + 'static,
{
    let mdata = Rc::new(mdata);
    let merror = Rc::new(merror);
    SymbolParser::new(move |state: ParseState<Din, Ein>, k: Continuation<D2, E2>, engine: &Rc<Engine>| {
        let mdata = Rc::clone(&mdata);
        let merror = Rc::clone(&merror);
        let k2: Continuation<D, E> = Rc::new(move |r: &ParseState<D, E>| {
            let mapped = r.clone().map_payload(|s| mdata(s), |s| merror(s));
            k(&mapped);
        });
        p.dispatch(engine, state, k2);
    })
}

/// Applies `p`; every non-error result is re-checked with `check`, a
/// non-`None` verdict converting it into an error at the same position.
/// Error results pass through untouched.
pub fn assert<D, E>(p: Symbol<D, E>, check: impl Fn(&ParseState<D, E>) -> Option<E> + 'static) -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let check = Rc::new(check);
    SymbolParser::new(move |state: ParseState<D, E>, k: Continuation<D, E>, engine: &Rc<Engine>| {
        let check = Rc::clone(&check);
        let k2: Continuation<D, E> = Rc::new(move |r: &ParseState<D, E>| {
            if r.is_error() {
                k(r);
                return;
            }
            match check(r) {
                Some(error) => {
                    let converted = r.clone().into_error(error);
                    k(&converted);
                }
                None => k(r),
            }
        });
        p.dispatch(engine, state, k2);
    })
}

/// Sequences `ps` left-to-right. Because each step may fan out into
/// multiple results, sequencing explores every combination: each result
/// from step `i` spawns its own continuation into step `i + 1`, carrying
/// its own copy of the accumulated data. An error result at any step
/// becomes a terminal output for that branch without invoking the
/// remaining steps.
fn chain_step<D, E, D2>(
    ps: Rc<Vec<Symbol<D, E>>>,
    i: usize,
    state: ParseState<D, E>,
    collected: Vec<D>,
    action: Rc<dyn Fn(Vec<D>) -> D2>,
    k: Continuation<D2, E>,
    engine: &Rc<Engine>,
) where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
    D2: Clone + Identity + 'static,
{
    if let ParseState::Error {
        target,
        index,
        result,
        error,
    } = state
    {
        k(&ParseState::Error {
            target,
            index,
            result,
            error,
        });
        return;
    }

    if i >= ps.len() {
        let (target, index, result) = state.into_parts();
        k(&ParseState::Result {
            target,
            index,
            result,
            data: action(collected),
        });
        return;
    }

    let ps2 = Rc::clone(&ps);
    let action2 = Rc::clone(&action);
    let k2 = Rc::clone(&k);
    let engine2 = Rc::clone(engine);
    let next_k: Continuation<D, E> = Rc::new(move |r: &ParseState<D, E>| {
        let mut branch = collected.clone();
        if let Some(data) = r.data() {
            branch.push(data.clone());
        }
        chain_step(
            Rc::clone(&ps2),
            i + 1,
            r.clone(),
            branch,
            Rc::clone(&action2),
            Rc::clone(&k2),
            &engine2,
        );
    });
    ps[i].dispatch(engine, state, next_k);
}

fn chain_step_plain<D, E>(
    ps: Rc<Vec<Symbol<D, E>>>,
    i: usize,
    state: ParseState<D, E>,
    k: Continuation<D, E>,
    engine: &Rc<Engine>,
) where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    if state.is_error() || i >= ps.len() {
        k(&state);
        return;
    }
    let ps2 = Rc::clone(&ps);
    let k2 = Rc::clone(&k);
    let engine2 = Rc::clone(engine);
    let next_k: Continuation<D, E> = Rc::new(move |r: &ParseState<D, E>| {
        chain_step_plain(Rc::clone(&ps2), i + 1, r.clone(), Rc::clone(&k2), &engine2);
    });
    ps[i].dispatch(engine, state, next_k);
}

/// `chain` with no action: the final state published is whatever the last
/// step produced, unchanged — which is also why `chain([p])` is
/// observationally equal to `p`.
pub fn chain<D, E>(ps: Vec<Symbol<D, E>>) -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let ps = Rc::new(ps);
    SymbolParser::new(move |state: ParseState<D, E>, k: Continuation<D, E>, engine: &Rc<Engine>| {
        chain_step_plain(Rc::clone(&ps), 0, state, k, engine);
    })
}

/// `chain` with an action, invoked once the whole sequence succeeds with
/// the per-step data collected in order.
pub fn chain_with_action<D, E, D2>(
    ps: Vec<Symbol<D, E>>,
    action: impl Fn(Vec<D>) -> D2 + 'static,
) -> SymbolRef<D, E, D2, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
    D2: Clone + Identity + 'static,
{
    let ps = Rc::new(ps);
    let action: Rc<dyn Fn(Vec<D>) -> D2> = Rc::new(action);
    SymbolParser::new(move |state: ParseState<D, E>, k: Continuation<D2, E>, engine: &Rc<Engine>| {
        chain_step(Rc::clone(&ps), 0, state, Vec::new(), Rc::clone(&action), k, engine);
    })
}

/// Builds a dynamic chain `[initial, ...steps]`, each step produced by
/// inspecting the running state — a generator-driven sugar over `chain`'s
/// sequencing semantics without an action.
pub fn contextual<D, E>(initial: Symbol<D, E>, next: impl Fn(&ParseState<D, E>) -> Option<Symbol<D, E>> + 'static) -> Symbol<D, E>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let next = Rc::new(next);
    SymbolParser::new(move |state: ParseState<D, E>, k: Continuation<D, E>, engine: &Rc<Engine>| {
        contextual_step(Rc::clone(&next), state, k, engine, Some(Rc::clone(&initial)));
    })
}

fn contextual_step<D, E>(
    next: Rc<dyn Fn(&ParseState<D, E>) -> Option<Symbol<D, E>>>,
    state: ParseState<D, E>,
    k: Continuation<D, E>,
    engine: &Rc<Engine>,
    forced_step: Option<Symbol<D, E>>,
) where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    if state.is_error() {
        k(&state);
        return;
    }
    let step = forced_step.or_else(|| next(&state));
    match step {
        None => k(&state),
        Some(p) => {
            let next2 = Rc::clone(&next);
            let k2 = Rc::clone(&k);
            let engine2 = Rc::clone(engine);
            let step_k: Continuation<D, E> = Rc::new(move |r: &ParseState<D, E>| {
                contextual_step(Rc::clone(&next2), r.clone(), Rc::clone(&k2), &engine2, None);
            });
            p.dispatch(engine, state, step_k);
        }
    }
}
