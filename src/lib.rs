//! chain-hashmap: a single-threaded, separate-chaining hash map with a
//! fixed prime bucket count, caller-chosen hash/compare strategies, and a
//! per-table policy for who owns keys and values when entries go away.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable table whose bucket layout is fully decided
//!   by the caller's hasher and the requested capacity.
//! - Pieces:
//!   - ChainHashMap<K, V, H, C>: bucket array of chain heads over a slot
//!     arena of entries. All lookups funnel through one private `locate`
//!     walk returning the bucket, the match, and its predecessor.
//!   - KeyHasher / KeyComparator: strategy traits, monomorphized. Built-in
//!     integer and string pairs carry a `StrategyTag` so mismatched
//!     built-in pairs are rejected at construction.
//!   - Options: `FREE_KEY` / `FREE_VALUE`, fixed at construction.
//!   - TableBuilder: optional settings validated in one place.
//!
//! Constraints
//! - Bucket count is the largest prime at or below the requested capacity
//!   (137 when 2 or less) and never changes; there is no rehashing.
//! - New entries append at the tail of their chain; overwriting a key
//!   replaces the value in place.
//! - Single-threaded: no locking. The table is `Send` but not `Sync`; wrap
//!   it in a `Mutex` to share it.
//! - Reentrancy: a debug-only guard rejects strategies that call back into
//!   the table while a chain is being walked or relinked.
//!
//! Ownership
//! - The table holds keys and values by value. When an entry is destroyed
//!   (`remove`, `clear`, `teardown`), a part whose FREE option is set is
//!   dropped by the table exactly once; any other part is handed back in a
//!   [`Detached`] record. Dropping the table drops whatever it still holds.
//! - `set` on an existing key returns the replaced value; the table never
//!   drops it.
//!
//! Hash codes
//! - Hashers return a signed raw hash. The table uses its absolute value
//!   (`i32::MIN` maps to 2^31) reduced modulo the bucket count. Each entry
//!   keeps its hash, so relinking never calls the hasher again.
//!
//! Notes and non-goals
//! - Iteration order is bucket order, not insertion order.
//! - `StrHasher` samples only index 0 and power-of-two indices, so strings
//!   that differ elsewhere collide. It is kept for compatibility with
//!   existing hash codes.

mod builder;
mod chain_hash_map;
mod chain_hash_map_proptest;
mod error;
mod options;
mod prime;
mod reentrancy;
pub mod strategy;

// Public surface
pub use builder::TableBuilder;
pub use chain_hash_map::{ChainHashMap, Detached, Iter};
pub use error::{BuildError, TableError};
pub use options::Options;
pub use prime::{capacity_for, DEFAULT_CAPACITY};
pub use strategy::{
    IntComparator, IntHasher, IntKey, KeyComparator, KeyHasher, StrComparator, StrHasher,
    StrategyTag,
};
