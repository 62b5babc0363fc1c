//! ChainHashMap: fixed prime bucket array with separately chained entries.

use crate::error::{BuildError, TableError};
use crate::options::Options;
use crate::prime::capacity_for;
use crate::reentrancy::DebugReentrancy;
use crate::strategy::{mismatched, KeyComparator, KeyHasher};
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use log::{debug, trace};
use slotmap::{DefaultKey, SlotMap};

// SlotMap stores at most 2^32 - 2 live slots.
const MAX_ENTRIES: usize = (u32::MAX - 1) as usize;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u32,
    next: Option<DefaultKey>, // next entry in the same bucket
}

impl<K, V> Entry<K, V> {
    /// Destroys the entry: parts the table owns are dropped here, the rest
    /// go back to the caller.
    fn detach(self, options: Options) -> Detached<K, V> {
        let Entry { key, value, .. } = self;
        let key = if options.frees_key() {
            drop(key);
            None
        } else {
            Some(key)
        };
        let value = if options.frees_value() {
            drop(value);
            None
        } else {
            Some(value)
        };
        Detached { key, value }
    }
}

/// What is left of an entry after the table destroyed it.
///
/// `key` is `Some` unless the table was built with `Options::FREE_KEY`;
/// `value` likewise for `Options::FREE_VALUE`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Detached<K, V> {
    pub key: Option<K>,
    pub value: Option<V>,
}

impl<K, V> Detached<K, V> {
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }
}

/// Result of walking one chain for a key.
///
/// `prev` is the entry visited just before `found`, or the chain tail when
/// nothing matched; `None` means `found` is the head or the chain is empty.
#[derive(Copy, Clone, Debug)]
struct Located {
    bucket: usize,
    hash: u32,
    found: Option<DefaultKey>,
    prev: Option<DefaultKey>,
}

/// Separate-chaining hash map with a fixed, prime number of buckets.
///
/// Entries live in a slot arena; each bucket holds the key of its first
/// entry and entries link forward to the next one in the same bucket.
/// `H` and `C` decide hashing and key equality; `Options` decides which
/// parts of a destroyed entry the table drops itself.
pub struct ChainHashMap<K, V, H, C> {
    hasher: H,
    comparator: C,
    buckets: Vec<Option<DefaultKey>>, // chain heads, fixed length
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    options: Options,
    reentrancy: DebugReentrancy,
}

impl<K, V, H, C> ChainHashMap<K, V, H, C>
where
    H: KeyHasher<K>,
    C: KeyComparator<K>,
{
    /// Creates a table with `capacity` rounded down to a prime bucket count
    /// (`DEFAULT_CAPACITY` when `capacity <= 2`).
    pub fn new(
        hasher: H,
        comparator: C,
        capacity: usize,
        options: Options,
    ) -> Result<Self, BuildError> {
        let hasher_tag = KeyHasher::<K>::tag(&hasher);
        let comparator_tag = KeyComparator::<K>::tag(&comparator);
        if mismatched(hasher_tag, comparator_tag) {
            return Err(BuildError::MismatchedStrategies {
                hasher: hasher_tag,
                comparator: comparator_tag,
            });
        }

        let bucket_count =
            capacity_for(capacity).ok_or(BuildError::NoPrimeCapacity(capacity))?;
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(bucket_count)
            .map_err(|_| BuildError::OutOfMemory {
                buckets: bucket_count,
            })?;
        buckets.resize(bucket_count, None);

        debug!(
            "created chain hash map: requested {} buckets, using {}, options {:?}",
            capacity, bucket_count, options
        );
        Ok(Self {
            hasher,
            comparator,
            buckets,
            slots: SlotMap::with_key(),
            options,
            reentrancy: DebugReentrancy::new(),
        })
    }

    /// Associates `value` with `key`.
    ///
    /// An existing entry keeps its key and chain position; its previous value
    /// is returned to the caller and never released by the table, whatever
    /// the options say. The `key` passed in is dropped in that case.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let _g = self.reentrancy.enter("set");
        let loc = self.locate(&key);

        if let Some(entry) = loc.found.and_then(|k| self.slots.get_mut(k)) {
            trace!("replacing value in bucket {}", loc.bucket);
            return Ok(Some(core::mem::replace(&mut entry.value, value)));
        }

        if self.slots.len() >= MAX_ENTRIES {
            return Err(TableError::OutOfMemory);
        }
        let k = self.slots.insert(Entry {
            key,
            value,
            hash: loc.hash,
            next: None,
        });
        match loc.prev.and_then(|p| self.slots.get_mut(p)) {
            Some(tail) => tail.next = Some(k),
            None => self.buckets[loc.bucket] = Some(k),
        }
        trace!("appended entry to bucket {}", loc.bucket);
        Ok(None)
    }
}

impl<K, V, H, C> ChainHashMap<K, V, H, C> {
    /// Number of buckets; prime and fixed for the lifetime of the table.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Number of entries chained in `bucket`; 0 for out-of-range buckets.
    pub fn chain_len(&self, bucket: usize) -> usize {
        let mut n = 0;
        let mut cur = self.buckets.get(bucket).copied().flatten();
        while let Some(entry) = cur.and_then(|k| self.slots.get(k)) {
            n += 1;
            cur = entry.next;
        }
        n
    }

    /// Destroys every entry, leaving all buckets empty and the table
    /// reusable. Returns the parts the table does not own; with both free
    /// options set the result is empty.
    pub fn clear(&mut self) -> Vec<Detached<K, V>> {
        let g = self.reentrancy.enter("clear");
        let mut old = core::mem::replace(&mut self.slots, SlotMap::with_key());
        let heads: Vec<Option<DefaultKey>> = self.buckets.iter_mut().map(|h| h.take()).collect();
        // The table is empty and consistent from here on; drops of K/V may
        // safely reach back into it.
        drop(g);

        let released = old.len();
        let mut detached = Vec::new();
        for head in heads {
            let mut cur = head;
            while let Some(entry) = cur.and_then(|k| old.remove(k)) {
                cur = entry.next;
                let parts = entry.detach(self.options);
                if !parts.is_empty() {
                    detached.push(parts);
                }
            }
        }
        debug_assert!(old.is_empty(), "entry not reachable from any bucket");
        debug!("cleared {} entries from {} buckets", released, self.buckets.len());
        detached
    }

    /// Consumes the table, releasing every entry as `clear` does.
    pub fn teardown(mut self) -> Vec<Detached<K, V>> {
        self.clear()
    }

    /// Iterates entries bucket by bucket, each chain in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            buckets: self.buckets.iter(),
            cur: None,
            remaining: self.slots.len(),
        }
    }
}

impl<K, V, H, C> ChainHashMap<K, V, H, C> {
    fn locate<Q>(&self, key: &Q) -> Located
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<Q>,
    {
        let hash = self.hasher.hash(key).unsigned_abs();
        let bucket = hash as usize % self.buckets.len();
        let mut prev = None;
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let Some(entry) = self.slots.get(k) else {
                debug_assert!(false, "dangling chain link");
                break;
            };
            if self.comparator.compare(entry.key.borrow(), key) == Ordering::Equal {
                return Located {
                    bucket,
                    hash,
                    found: Some(k),
                    prev,
                };
            }
            prev = Some(k);
            cur = entry.next;
        }
        Located {
            bucket,
            hash,
            found: None,
            prev,
        }
    }

    /// The table's hash for `key`: the hasher's raw output made non-negative.
    pub fn hash_code<Q>(&self, key: &Q) -> u32
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        let _g = self.reentrancy.enter("hash_code");
        self.hasher.hash(key).unsigned_abs()
    }

    /// Bucket `key` maps to, whether or not it is present.
    pub fn bucket_of<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        self.hash_code(key) as usize % self.buckets.len()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<Q>,
    {
        let _g = self.reentrancy.enter("get");
        let k = self.locate(key).found?;
        self.slots.get(k).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<Q>,
    {
        let _g = self.reentrancy.enter("get_mut");
        let k = self.locate(key).found?;
        self.slots.get_mut(k).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<Q>,
    {
        let _g = self.reentrancy.enter("contains_key");
        self.locate(key).found.is_some()
    }

    /// Unlinks and destroys the entry for `key`. Fails with `NotFound`,
    /// leaving the table untouched, when no entry matches.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Detached<K, V>, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<Q>,
    {
        let g = self.reentrancy.enter("remove");
        let loc = self.locate(key);
        let k = loc.found.ok_or(TableError::NotFound)?;
        let entry = self.slots.remove(k).ok_or(TableError::NotFound)?;
        match loc.prev.and_then(|p| self.slots.get_mut(p)) {
            Some(prev) => prev.next = entry.next,
            None => self.buckets[loc.bucket] = entry.next,
        }
        drop(g);

        trace!("removed entry from bucket {}", loc.bucket);
        debug_assert_eq!(entry.hash as usize % self.buckets.len(), loc.bucket);
        Ok(entry.detach(self.options))
    }
}

impl<K, V, H, C> fmt::Debug for ChainHashMap<K, V, H, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)` in bucket order.
pub struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    buckets: core::slice::Iter<'a, Option<DefaultKey>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        loop {
            if let Some(entry) = self.cur.and_then(|k| slots.get(k)) {
                self.cur = entry.next;
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
            self.cur = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, H, C> IntoIterator for &'a ChainHashMap<K, V, H, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prime::DEFAULT_CAPACITY;
    use crate::strategy::{IntComparator, IntHasher, StrComparator, StrHasher, StrategyTag};
    use std::cell::Cell;
    use std::rc::Rc;

    type IntMap = ChainHashMap<i32, i32, IntHasher, IntComparator>;
    type StrMap = ChainHashMap<String, String, StrHasher, StrComparator>;

    fn int_map(capacity: usize) -> IntMap {
        ChainHashMap::new(IntHasher, IntComparator, capacity, Options::NONE).unwrap()
    }

    /// Hasher that sends every key to the same bucket.
    #[derive(Clone, Copy, Default)]
    struct ConstHasher;
    impl KeyHasher<i32> for ConstHasher {
        fn hash(&self, _key: &i32) -> i32 {
            0
        }
    }

    /// Hasher that returns the key unchanged, negative values included.
    #[derive(Clone, Copy, Default)]
    struct SignedHasher;
    impl KeyHasher<i32> for SignedHasher {
        fn hash(&self, key: &i32) -> i32 {
            *key
        }
    }

    /// Invariant: bucket count is the largest prime at or below the request.
    #[test]
    fn bucket_count_is_prime() {
        assert_eq!(int_map(7).bucket_count(), 7);
        assert_eq!(int_map(10).bucket_count(), 7);
        assert_eq!(int_map(2).bucket_count(), DEFAULT_CAPACITY);
        assert_eq!(int_map(0).bucket_count(), DEFAULT_CAPACITY);
        let m = int_map(137);
        assert_eq!(m.bucket_count(), 137);
        assert!((0..m.bucket_count()).all(|b| m.chain_len(b) == 0));
    }

    /// Invariant: built-in strategies from different families are rejected.
    #[test]
    fn mismatched_builtin_pair_rejected() {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
        struct Both(i32);
        impl crate::strategy::IntKey for Both {
            fn as_i32(self) -> i32 {
                self.0
            }
        }
        impl AsRef<str> for Both {
            fn as_ref(&self) -> &str {
                "both"
            }
        }

        let r = ChainHashMap::<Both, (), _, _>::new(StrHasher, IntComparator, 7, Options::NONE);
        assert_eq!(
            r.err(),
            Some(BuildError::MismatchedStrategies {
                hasher: StrategyTag::String,
                comparator: StrategyTag::Integer,
            })
        );
        let r = ChainHashMap::<Both, (), _, _>::new(IntHasher, StrComparator, 7, Options::NONE);
        assert!(matches!(r, Err(BuildError::MismatchedStrategies { .. })));

        // Custom strategies are not checked.
        let custom = ChainHashMap::<i32, (), _, _>::new(ConstHasher, IntComparator, 7, Options::NONE);
        assert!(custom.is_ok());
    }

    /// Invariant: set-get-overwrite-remove on an integer table.
    #[test]
    fn int_scenario() {
        let mut m = int_map(7);
        assert_eq!(m.set(1, 1), Ok(None));
        assert_eq!(m.get(&1), Some(&1));
        assert_eq!(m.set(1, 2), Ok(Some(1)));
        assert_eq!(m.get(&1), Some(&2));
        assert!(m.remove(&1).is_ok());
        assert_eq!(m.get(&1), None);

        for i in 1..100 {
            m.set(i, i * i).unwrap();
        }
        assert_eq!(m.len(), 99);
        for i in 1..100 {
            assert_eq!(m.get(&i), Some(&(i * i)));
        }
    }

    /// Invariant: overwriting keeps the entry in place; chain length is unchanged.
    #[test]
    fn overwrite_keeps_chain_position() {
        let mut m = int_map(7);
        for k in [3, 10, 17] {
            m.set(k, 0).unwrap();
        }
        let b = m.bucket_of(&10);
        assert_eq!(m.chain_len(b), 3);
        m.set(10, 99).unwrap();
        assert_eq!(m.chain_len(b), 3);
        let order: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec![3, 10, 17]);
        assert_eq!(m.get(&10), Some(&99));
    }

    /// Invariant: overwriting any position of a shared chain succeeds and
    /// hands back the previous value.
    #[test]
    fn overwrite_in_shared_chain_never_fails() {
        let mut m: ChainHashMap<i32, i32, _, _> =
            ChainHashMap::new(ConstHasher, IntComparator, 7, Options::NONE).unwrap();
        for k in [5, 1, 9] {
            m.set(k, k).unwrap();
        }
        for k in [5, 1, 9] {
            assert_eq!(m.set(k, -k), Ok(Some(k)));
        }
        assert_eq!(m.len(), 3);
        assert_eq!(m.chain_len(0), 3);
        let values: Vec<i32> = m.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![-5, -1, -9]);
    }

    /// Invariant: new entries append at the chain tail.
    #[test]
    fn chain_preserves_insertion_order() {
        let mut m: ChainHashMap<i32, &str, _, _> =
            ChainHashMap::new(ConstHasher, IntComparator, 7, Options::NONE).unwrap();
        m.set(5, "a").unwrap();
        m.set(1, "b").unwrap();
        m.set(9, "c").unwrap();
        assert_eq!(m.chain_len(0), 3);
        let keys: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![5, 1, 9]);
    }

    /// Invariant: removing head, middle, or tail relinks the remaining chain.
    #[test]
    fn remove_relinks_predecessor() {
        for victim in [5, 1, 9] {
            let mut m: ChainHashMap<i32, i32, _, _> =
                ChainHashMap::new(ConstHasher, IntComparator, 7, Options::NONE).unwrap();
            for k in [5, 1, 9] {
                m.set(k, k * 10).unwrap();
            }
            m.remove(&victim).unwrap();
            assert_eq!(m.chain_len(0), 2);
            for k in [5, 1, 9] {
                let expected = if k == victim { None } else { Some(k * 10) };
                assert_eq!(m.get(&k).copied(), expected);
            }
            // The remaining chain still accepts appends.
            m.set(42, 420).unwrap();
            assert_eq!(m.chain_len(0), 3);
            assert_eq!(m.get(&42), Some(&420));
        }
    }

    /// Invariant: removing an absent key fails with NotFound and changes nothing.
    #[test]
    fn remove_missing_is_not_found() {
        let mut m = int_map(7);
        m.set(1, 1).unwrap();
        m.set(8, 8).unwrap();
        assert_eq!(m.remove(&15), Err(TableError::NotFound));
        assert_eq!(m.len(), 2);
        assert_eq!(m.chain_len(1), 2);
        assert_eq!(int_map(7).remove(&1), Err(TableError::NotFound));
    }

    /// Invariant: clear empties every bucket and the table stays usable.
    #[test]
    fn clear_then_reuse() {
        let mut m = int_map(11);
        for i in 0..50 {
            m.set(i, -i).unwrap();
        }
        let detached = m.clear();
        assert_eq!(detached.len(), 50);
        assert!(m.is_empty());
        assert!((0..m.bucket_count()).all(|b| m.chain_len(b) == 0));
        assert!((0..50).all(|i| m.get(&i).is_none()));

        m.set(3, 4).unwrap();
        assert_eq!(m.get(&3), Some(&4));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: hash codes are non-negative whatever the raw hash is.
    #[test]
    fn hash_code_is_normalized() {
        let m: ChainHashMap<i32, (), _, _> =
            ChainHashMap::new(SignedHasher, IntComparator, 7, Options::NONE).unwrap();
        assert_eq!(m.hash_code(&-5), 5);
        assert_eq!(m.hash_code(&5), 5);
        assert_eq!(m.hash_code(&i32::MIN), 1u32 << 31);
        assert_eq!(m.bucket_of(&-5), 5);
    }

    /// Invariant: a string hash with bit 31 set is folded, not reinterpreted.
    #[test]
    fn long_string_hash_is_folded() {
        let mut m: StrMap =
            ChainHashMap::new(StrHasher, StrComparator, 137, Options::NONE).unwrap();
        let key = "z".repeat(17);
        assert_eq!(m.hash_code(key.as_str()), 685_785_664);
        assert_eq!(m.bucket_of(key.as_str()), 106);
        m.set(key.clone(), "v".to_string()).unwrap();
        assert_eq!(m.chain_len(106), 1);
        assert_eq!(m.get(key.as_str()).map(String::as_str), Some("v"));
    }

    /// Invariant: negative keys hash into range and are found again.
    #[test]
    fn negative_keys_round_trip() {
        let mut m: ChainHashMap<i32, i32, _, _> =
            ChainHashMap::new(SignedHasher, IntComparator, 7, Options::NONE).unwrap();
        for k in [-1, 1, i32::MIN, i32::MAX, -7, 0] {
            m.set(k, k / 2).unwrap();
        }
        for k in [-1, 1, i32::MIN, i32::MAX, -7, 0] {
            assert_eq!(m.get(&k), Some(&(k / 2)));
        }
        // -1 and 1 share a bucket but remain distinct entries.
        assert_eq!(m.bucket_of(&-1), m.bucket_of(&1));
        assert_eq!(m.len(), 6);
    }

    /// Invariant: String tables accept `&str` lookups.
    #[test]
    fn borrowed_str_lookup() {
        let options = Options::FREE_KEY | Options::FREE_VALUE;
        let mut m: StrMap = ChainHashMap::new(StrHasher, StrComparator, 137, options).unwrap();
        m.set("str19".to_string(), "361".to_string()).unwrap();
        m.set("str49".to_string(), "2401".to_string()).unwrap();
        // Colliding keys land in the same chain yet resolve separately.
        assert_eq!(m.bucket_of("str19"), m.bucket_of("str49"));
        assert_eq!(m.get("str19").map(String::as_str), Some("361"));
        assert_eq!(m.get("str49").map(String::as_str), Some("2401"));
        assert!(m.contains_key("str49"));
        assert!(!m.contains_key("str99"));
    }

    /// Invariant: get_mut updates are visible to later lookups.
    #[test]
    fn get_mut_updates_value() {
        let mut m = int_map(7);
        m.set(4, 16).unwrap();
        *m.get_mut(&4).unwrap() += 1;
        assert_eq!(m.get(&4), Some(&17));
        assert!(m.get_mut(&5).is_none());
    }

    /// Invariant: the free options decide which parts come back to the caller.
    #[test]
    fn detached_parts_follow_options() {
        let cases = [
            (Options::NONE, true, true),
            (Options::FREE_KEY, false, true),
            (Options::FREE_VALUE, true, false),
            (Options::FREE_KEY | Options::FREE_VALUE, false, false),
        ];
        for (options, key_back, value_back) in cases {
            let mut m: StrMap = ChainHashMap::new(StrHasher, StrComparator, 7, options).unwrap();
            m.set("k".to_string(), "v".to_string()).unwrap();
            let d = m.remove("k").unwrap();
            assert_eq!(d.key.is_some(), key_back, "{:?}", options);
            assert_eq!(d.value.is_some(), value_back, "{:?}", options);
            if key_back {
                assert_eq!(d.key.as_deref(), Some("k"));
            }
        }
    }

    /// Invariant: the value replaced by `set` is returned, never dropped by the
    /// table, even with FREE_VALUE.
    #[test]
    fn overwrite_returns_old_value_under_free_value() {
        let drops = Rc::new(Cell::new(0));
        struct Probe(Rc<Cell<usize>>);
        impl Drop for Probe {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut m: ChainHashMap<i32, Probe, _, _> =
            ChainHashMap::new(IntHasher, IntComparator, 7, Options::FREE_KEY | Options::FREE_VALUE)
                .unwrap();
        m.set(1, Probe(drops.clone())).unwrap();
        let old = m.set(1, Probe(drops.clone())).unwrap();
        assert_eq!(drops.get(), 0);
        assert!(old.is_some());
        drop(old);
        assert_eq!(drops.get(), 1);
        assert!(m.teardown().is_empty());
        assert_eq!(drops.get(), 2);
    }

    /// Invariant: iteration yields every entry once and reports an exact length.
    #[test]
    fn iter_visits_all_entries() {
        let mut m = int_map(13);
        for i in 0..40 {
            m.set(i, i + 1).unwrap();
        }
        let it = m.iter();
        assert_eq!(it.len(), 40);
        let mut seen: Vec<i32> = (&m)
            .into_iter()
            .map(|(k, v)| {
                assert_eq!(*v, k + 1);
                *k
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
        let dbg = format!("{:?}", int_map(3));
        assert_eq!(dbg, "{}");
    }

    /// Invariant (debug-only): a comparator that reaches back into the table
    /// during a chain walk panics instead of reading a half-updated chain.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_comparator() {
        type Map = ChainHashMap<i32, i32, IntHasher, Reentrant>;

        struct Reentrant {
            map: Rc<Cell<*const Map>>,
        }
        impl KeyComparator<i32> for Reentrant {
            fn compare(&self, a: &i32, b: &i32) -> Ordering {
                let p = self.map.get();
                if !p.is_null() {
                    // Re-enter the table while it is walking a chain.
                    unsafe {
                        let _ = (*p).contains_key(&0);
                    }
                }
                a.cmp(b)
            }
        }

        let slot = Rc::new(Cell::new(core::ptr::null()));
        let mut m: Map = ChainHashMap::new(
            IntHasher,
            Reentrant { map: slot.clone() },
            7,
            Options::NONE,
        )
        .unwrap();
        m.set(1, 1).unwrap();
        slot.set(&m as *const Map);

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.get(&1);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
        slot.set(core::ptr::null());
    }
    /// Invariant (debug-only): a hasher that calls back into the table is
    /// reported with both the outer and the nested operation.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_hasher() {
        type Map = ChainHashMap<i32, i32, Reentrant, IntComparator>;

        struct Reentrant {
            map: Rc<Cell<*const Map>>,
        }
        impl KeyHasher<i32> for Reentrant {
            fn hash(&self, key: &i32) -> i32 {
                let p = self.map.get();
                if !p.is_null() {
                    unsafe {
                        let _ = (*p).hash_code(&0);
                    }
                }
                *key
            }
        }

        let slot = Rc::new(Cell::new(core::ptr::null()));
        let mut m: Map = ChainHashMap::new(
            Reentrant { map: slot.clone() },
            IntComparator,
            7,
            Options::NONE,
        )
        .unwrap();
        m.set(1, 1).unwrap();
        slot.set(&m as *const Map);

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.contains_key(&1);
        }));
        slot.set(core::ptr::null());
        let payload = res.expect_err("expected reentrancy to panic in debug builds");
        let msg = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .unwrap_or_default();
        assert!(msg.contains("`hash_code`"), "{}", msg);
        assert!(msg.contains("`contains_key`"), "{}", msg);

        // The guard is released by unwinding; the table is usable again.
        assert_eq!(m.get(&1), Some(&1));
    }
}
