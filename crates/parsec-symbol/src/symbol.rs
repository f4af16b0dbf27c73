//! The GLL symbol-combinator core.
//!
//! Where a token combinator's memo stores one cached `ParseState`, a symbol
//! combinator's memo stores a *set* of results plus every continuation that
//! has asked for them so far. Dispatching a symbol combinator never
//! recurses directly into its sub-parsers: it defers the actual work to the
//! engine's stack and replays results through continuations as they are
//! published. This is "localised GSS" — instead of a
//! single shared graph-structured stack, each combinator instance keeps its
//! own slice of it in `memo`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parsec_state::{EngineFault, Identity, ParseState};

use crate::engine::{AmbiguityBreadth, Engine};

/// A replayable callback: unlike a token combinator's transform, a symbol
/// continuation may be invoked many times as new ambiguous results are
/// published, so it must be `Fn`, not `FnOnce`.
pub type Continuation<D, E> = Rc<dyn Fn(&ParseState<D, E>)>;

struct MemoEntry<D, E> {
    seen: HashSet<String>,
    results: Vec<ParseState<D, E>>,
    continuations: Vec<Continuation<D, E>>,
}

impl<D, E> MemoEntry<D, E> {
    fn new(k: Continuation<D, E>) -> Self {
        MemoEntry {
            seen: HashSet::new(),
            results: Vec::new(),
            continuations: vec![k],
        }
    }
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A memoised GLL combinator from `ParseState<Din, Ein>` to however many
/// `ParseState<Dout, Eout>` results it produces.
pub struct SymbolParser<Din, Ein, Dout, Eout> {
    id: usize,
    last_target: RefCell<Option<String>>,
    memo: RefCell<HashMap<String, MemoEntry<Dout, Eout>>>,
    raw: Box<dyn Fn(ParseState<Din, Ein>, Continuation<Dout, Eout>, &Rc<Engine>)>,
}

/// A symbol combinator whose input and output payload types coincide — the
/// common case, and the only shape recursive grammars (`lazy`) can close
/// over.
pub type Symbol<D, E> = Rc<SymbolParser<D, E, D, E>>;

/// The general, type-changing shape `map` and `chain_with_action` produce.
pub type SymbolRef<Din, Ein, Dout, Eout> = Rc<SymbolParser<Din, Ein, Dout, Eout>>;

impl<Din, Ein, Dout, Eout> SymbolParser<Din, Ein, Dout, Eout>
where
    Din: Identity,
    Ein: Identity,
    Dout: Clone + Identity + 'static,
    Eout: Clone + Identity + 'static,
{
    pub fn new(
        raw: impl Fn(ParseState<Din, Ein>, Continuation<Dout, Eout>, &Rc<Engine>) + 'static,
    ) -> Rc<Self> {
        Rc::new(SymbolParser {
            id: next_id(),
            last_target: RefCell::new(None),
            memo: RefCell::new(HashMap::new()),
            raw: Box::new(raw),
        })
    }

    /// Implements the three-step dispatch algorithm:
    /// 1. clear the memo if `target` changed since the last dispatch;
    /// 2. on a memo hit, register `k` and replay every result seen so far;
    /// 3. on a memo miss, create the entry, queue the underlying work
    ///    (deduplicated by `(combinator id, state identity)` so a grammar
    ///    that reaches the same position twice before the stack drains it
    ///    doesn't schedule the same work twice), and return without
    ///    recursing.
    pub fn dispatch(self: &Rc<Self>, engine: &Rc<Engine>, state: ParseState<Din, Ein>, k: Continuation<Dout, Eout>) {
        {
            let mut last = self.last_target.borrow_mut();
            if last.as_deref() != Some(state.target()) {
                self.memo.borrow_mut().clear();
                *last = Some(state.target().to_string());
            }
        }

        let id = state.identity();

        {
            let mut memo = self.memo.borrow_mut();
            if let Some(entry) = memo.get_mut(&id) {
                entry.continuations.push(Rc::clone(&k));
                let results = entry.results.clone();
                drop(memo);
                tracing::trace!(combinator = self.id, state = %id, hits = results.len(), "symbol memo hit");
                for r in &results {
                    k(r);
                }
                return;
            }
            memo.insert(id.clone(), MemoEntry::new(Rc::clone(&k)));
        }

        let dedup_key = (self.id, id.clone());
        if engine.is_pending(&dedup_key) {
            tracing::trace!(combinator = self.id, state = %id, "symbol work already queued");
            return;
        }
        engine.mark_pending(dedup_key.clone());

        let this = Rc::clone(self);
        let engine_for_publish = Rc::clone(engine);
        let id_for_publish = id.clone();
        let inner_k: Continuation<Dout, Eout> = Rc::new(move |r: &ParseState<Dout, Eout>| {
            this.publish(&engine_for_publish, &id_for_publish, r);
        });

        let this_for_work = Rc::clone(self);
        let engine_for_work = Rc::clone(engine);
        let dedup_key_for_pop = dedup_key;
        tracing::trace!(combinator = self.id, state = %id, "symbol work queued");
        engine.push_work(Box::new(move || {
            engine_for_work.unmark_pending(&dedup_key_for_pop);
            (this_for_work.raw)(state, inner_k, &engine_for_work);
        }));
    }

    /// Publishes a result produced by `raw` into this combinator's memo
    /// entry, deduplicating by result identity and replaying it to every
    /// continuation registered so far. Enforces `MAX_AMBIGUITY_BREADTH`
    /// against the count of full-input-length results in the entry.
    fn publish(&self, engine: &Rc<Engine>, id: &str, r: &ParseState<Dout, Eout>) {
        let r_id = r.identity();
        let continuations = {
            let mut memo = self.memo.borrow_mut();
            let Some(entry) = memo.get_mut(id) else {
                return;
            };
            if !entry.seen.insert(r_id) {
                return;
            }
            entry.results.push(r.clone());
            if r.index() == engine.target_len() {
                if let AmbiguityBreadth::Limited(limit) = engine.breadth() {
                    let complete = entry
                        .results
                        .iter()
                        .filter(|s| s.index() == engine.target_len())
                        .count();
                    if complete > limit {
                        engine.record_fault(EngineFault::BreadthExceeded {
                            entry: id.to_string(),
                            limit,
                        });
                    }
                }
            }
            entry.continuations.clone()
        };
        tracing::trace!(combinator = self.id, state = %id, fanout = continuations.len(), "symbol result published");
        for c in &continuations {
            c(r);
        }
    }
}
