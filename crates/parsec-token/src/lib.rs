//! LL(k) recursive-descent token combinators with backtracking and
//! unbounded lookahead. Linear in input size; does not handle left
//! recursion or ambiguity — for that, see `parsec-symbol`.

mod polymorphic;
pub mod primitives;
mod structural;
mod token;

pub use parsec_state::{EngineFault, Identity, IdentityPolicy, ParseState};
pub use polymorphic::{assert, chain, chain_with_action, contextual, map};
pub use primitives::{empty, error, recovery, regex, str};
pub use structural::{choice, lookahead, many, many1, optional, side_effect, until};
pub use token::{Parser, TokenParser};
