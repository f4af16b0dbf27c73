//! The three entry points for running a symbol grammar: an eager
//! `run` that drains every result before choosing among them, a lazy,
//! resumable `generate` that yields results as soon as they are published,
//! and `async_run`, which exists purely for API symmetry with an
//! asynchronous host — the engine itself is single-threaded and cooperative
//! throughout, so `async_run` awaits nothing but already-resolved futures.

use std::cell::RefCell;
use std::rc::Rc;

use parsec_state::{EngineFault, Identity, ParseState};

use crate::engine::Engine;
use crate::symbol::{Continuation, Symbol};

pub use crate::engine::{AmbiguityBreadth, SymbolConfig};

/// A resumable iterator over a symbol grammar's results, yielded in the
/// order they were published. Each call to `next` pops and executes
/// deferred work items from the engine's stack until either a new result
/// is available to yield or the stack is empty.
pub struct Generate<D, E> {
    engine: Rc<Engine>,
    collected: Rc<RefCell<Vec<ParseState<D, E>>>>,
    yielded: usize,
}

impl<D: Clone, E: Clone> Iterator for Generate<D, E> {
    type Item = Result<ParseState<D, E>, EngineFault>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(fault) = self.engine.fault() {
                return Some(Err(fault));
            }
            if self.collected.borrow().len() > self.yielded {
                let item = self.collected.borrow()[self.yielded].clone();
                self.yielded += 1;
                return Some(Ok(item));
            }
            match self.engine.pop_work() {
                Some(work) => {
                    work();
                }
                None => return None,
            }
        }
    }
}

/// Seeds the engine and dispatches `parser` once, collecting every
/// published result into `generate`'s backing buffer through a single
/// top-level continuation.
pub fn generate<D, E>(
    parser: &Symbol<D, E>,
    target: impl Into<String>,
    initial_data: D,
    index: usize,
    config: SymbolConfig,
) -> Result<Generate<D, E>, EngineFault>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let seed = ParseState::new_result(target, index, Vec::new(), initial_data)?;
    let engine = Engine::new(seed.target().len(), config.breadth);

    let collected: Rc<RefCell<Vec<ParseState<D, E>>>> = Rc::new(RefCell::new(Vec::new()));
    let collected_for_k = Rc::clone(&collected);
    let k: Continuation<D, E> = Rc::new(move |r: &ParseState<D, E>| {
        collected_for_k.borrow_mut().push(r.clone());
    });

    parser.dispatch(&engine, seed, k);

    Ok(Generate {
        engine,
        collected,
        yielded: 0,
    })
}

fn eager_select<D, E>(mut all: Vec<ParseState<D, E>>) -> Vec<ParseState<D, E>> {
    let Some(max_index) = all.iter().map(|s| s.index()).max() else {
        return all;
    };
    all.retain(|s| s.index() == max_index);
    let non_error: Vec<_> = all.iter().filter(|s| s.is_result()).cloned().collect();
    if non_error.is_empty() {
        all
    } else {
        non_error
    }
}

/// Drains `generate` to completion, then keeps only the results with the
/// greatest `index`, preferring non-error results among those if any exist.
pub fn run<D, E>(
    parser: &Symbol<D, E>,
    target: impl Into<String>,
    initial_data: D,
    index: usize,
    config: SymbolConfig,
) -> Result<Vec<ParseState<D, E>>, EngineFault>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let gen = generate(parser, target, initial_data, index, config)?;
    let all: Vec<ParseState<D, E>> = gen.collect::<Result<Vec<_>, _>>()?;
    Ok(eager_select(all))
}

/// Equivalent to `run`, but wraps each produced state in a resolved future
/// before collecting it. There is no real concurrency here — the engine is
/// single-threaded and cooperative end to end — this exists only so hosts
/// already built around `async`/`await` can call into the same grammar
/// without a separate synchronous entry point.
pub async fn async_run<D, E>(
    parser: &Symbol<D, E>,
    target: impl Into<String>,
    initial_data: D,
    index: usize,
    config: SymbolConfig,
) -> Result<Vec<ParseState<D, E>>, EngineFault>
where
    D: Clone + Identity + 'static,
    E: Clone + Identity + 'static,
{
    let gen = generate(parser, target, initial_data, index, config)?;
    let mut all = Vec::new();
    for item in gen {
        let state = futures::future::ready(item).await?;
        all.push(state);
    }
    Ok(eager_select(all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{alternatives, to_symbol};
    use parsec_state::identity::Ignored;
    use parsec_token::primitives as token_primitives;
    use pretty_assertions::assert_eq;

    fn lit(c: &'static str) -> Symbol<Ignored<()>, &'static str> {
        to_symbol(token_primitives::str(c, |_, _| "eof", |_, _| "mismatch"))
    }

    #[test]
    fn run_prefers_the_longest_non_error_results() {
        let p = alternatives(vec![lit("a"), lit("ab")]);
        let out = run(&p, "ab", Ignored(()), 0, SymbolConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].index(), 2);
    }

    #[test]
    fn run_falls_back_to_errors_when_nothing_succeeds() {
        let p = lit("z");
        let out = run(&p, "ab", Ignored(()), 0, SymbolConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_error());
    }

    #[test]
    fn async_run_agrees_with_the_synchronous_driver() {
        let p = alternatives(vec![lit("a"), lit("ab")]);
        let out = futures::executor::block_on(async_run(&p, "ab", Ignored(()), 0, SymbolConfig::default()))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].index(), 2);
    }

    #[test]
    fn generate_yields_results_in_publication_order() {
        // The deferred-work stack is LIFO, so the alternative pushed last
        // ("ab") is dispatched — and therefore publishes — before the one
        // pushed first ("a").
        let p = alternatives(vec![lit("a"), lit("ab")]);
        let gen = generate(&p, "ab", Ignored(()), 0, SymbolConfig::default()).unwrap();
        let all: Vec<_> = gen.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].index(), 2);
        assert_eq!(all[1].index(), 1);
    }
}
