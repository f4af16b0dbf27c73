//! `parsec`: a generalised parser-combinator engine (see `DESIGN.md` for
//! how this crate's layers are grounded).
//!
//! Two layers share the same [`ParseState`] data model:
//!
//! - [`token`] — LL(k) recursive-descent combinators: linear time,
//!   backtracking, unbounded lookahead, no left recursion or ambiguity.
//! - [`symbol`] — GLL combinators built on continuation-passing and a
//!   deferred-work stack: handles arbitrary context-free grammars,
//!   including left- or right-recursive and ambiguous ones, in worst-case
//!   cubic time.
//!
//! `prelude` re-exports the names most grammars need from both layers
//! under one `use`.

pub use parsec_state::{identity, EngineFault, Identity, IdentityPolicy, ParseState};

pub mod token {
    pub use parsec_token::{
        assert, chain, chain_with_action, choice, contextual, empty, error, lookahead, many,
        many1, map, optional, recovery, regex, side_effect, str, until, Parser, TokenParser,
    };
}

pub mod symbol {
    pub use parsec_symbol::{
        alternatives, assert, async_run, chain, chain_with_action, contextual, empty, generate,
        lazy, map, recursive, run, to_symbol, AmbiguityBreadth, Continuation, Engine, Generate,
        Symbol, SymbolConfig, SymbolParser, SymbolRef,
    };
}

/// Common imports for defining a grammar across both layers.
pub mod prelude {
    pub use crate::identity::{Canonical, Carried, Ignored, Tagged};
    pub use crate::symbol::{
        alternatives, lazy, recursive, run as run_symbol, to_symbol, Symbol, SymbolConfig,
    };
    pub use crate::token::{choice, many, map as map_token, optional, str, Parser};
    pub use crate::{EngineFault, Identity, ParseState};
}
