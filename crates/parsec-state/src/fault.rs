//! Engine faults: out-of-band failures that are not part of the parse
//! result. These terminate the current run.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineFault {
    #[error("state index {index} exceeds target length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("consumed result length {consumed} exceeds index {index}")]
    ResultLongerThanIndex { consumed: usize, index: usize },

    #[error("memo entry {entry:?} exceeded ambiguity breadth limit {limit}")]
    BreadthExceeded { entry: String, limit: usize },
}
