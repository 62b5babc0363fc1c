//! Error types for construction and table operations.

use crate::strategy::StrategyTag;

/// Construction was rejected; no table was created.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("no hasher configured")]
    MissingHasher,

    #[error("no key comparator configured")]
    MissingComparator,

    #[error("{hasher} hasher cannot be paired with a {comparator} comparator")]
    MismatchedStrategies {
        hasher: StrategyTag,
        comparator: StrategyTag,
    },

    /// Kept for parity with signed capacity requests; `usize` requests are
    /// substituted with the default before the search, so the safe API
    /// never returns it.
    #[error("no prime bucket count at or below {0}")]
    NoPrimeCapacity(usize),

    #[error("failed to allocate {buckets} buckets")]
    OutOfMemory { buckets: usize },
}

/// Failure of an operation on a live table. The table is left exactly as
/// it was before the call.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum TableError {
    /// Kept for parity with handle-based callers; a borrowed table is always
    /// valid, so the safe API never returns it.
    #[error("invalid argument")]
    InvalidArgument,

    #[error("entry storage exhausted")]
    OutOfMemory,

    #[error("key not found")]
    NotFound,
}
