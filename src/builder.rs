//! TableBuilder: collects construction settings and validates them once.

use crate::chain_hash_map::ChainHashMap;
use crate::error::BuildError;
use crate::options::Options;
use crate::prime::DEFAULT_CAPACITY;
use crate::strategy::{KeyComparator, KeyHasher};

/// Construction settings for a [`ChainHashMap`].
///
/// Hasher and comparator start unset; `build` fails with
/// `MissingHasher`/`MissingComparator` if either is still unset.
#[derive(Clone, Debug)]
pub struct TableBuilder<H, C> {
    hasher: Option<H>,
    comparator: Option<C>,
    capacity: usize,
    options: Options,
}

impl<H, C> Default for TableBuilder<H, C> {
    fn default() -> Self {
        Self {
            hasher: None,
            comparator: None,
            capacity: DEFAULT_CAPACITY,
            options: Options::NONE,
        }
    }
}

impl<H, C> TableBuilder<H, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hasher(mut self, hasher: H) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn comparator(mut self, comparator: C) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Requested bucket count; rounded down to a prime at build time.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build<K, V>(self) -> Result<ChainHashMap<K, V, H, C>, BuildError>
    where
        H: KeyHasher<K>,
        C: KeyComparator<K>,
    {
        let hasher = self.hasher.ok_or(BuildError::MissingHasher)?;
        let comparator = self.comparator.ok_or(BuildError::MissingComparator)?;
        ChainHashMap::new(hasher, comparator, self.capacity, self.options)
    }
}
