#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can use
// small custom strategies next to the built-in ones.

use crate::chain_hash_map::ChainHashMap;
use crate::error::TableError;
use crate::options::Options;
use crate::strategy::{KeyHasher, StrComparator, StrHasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Set(usize, i32),
    Get(usize),
    Contains(String),
    Remove(usize),
    Bump(usize, i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            2 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
            2 => idx.clone().prop_map(Op::Remove),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Sends every key to the same bucket.
#[derive(Clone, Copy, Default)]
struct ConstHasher;
impl KeyHasher<str> for ConstHasher {
    fn hash(&self, _key: &str) -> i32 {
        -1
    }
}
impl KeyHasher<String> for ConstHasher {
    fn hash(&self, _key: &String) -> i32 {
        -1
    }
}

// State-machine equivalence against std::collections::HashMap:
// - `set` returns the previous value iff the key was present.
// - `get`/`contains_key` agree with the model, including borrowed `&str`.
// - `remove` of an absent key is NotFound and leaves `len` unchanged.
// - `clear` empties the table; later sets behave normally.
// - Chain lengths always sum to `len`; `bucket_of` stays in range.
fn run_state_machine<H>(
    mut sut: ChainHashMap<String, i32, H, StrComparator>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: KeyHasher<String> + KeyHasher<str>,
{
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Set(i, v) => {
                let k = pool[i].clone();
                let prev = sut.set(k.clone(), v).expect("set succeeds");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.get(k.as_str()), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let before = sut.len();
                match (sut.remove(k), model.remove(k)) {
                    (Ok(d), Some(mv)) => {
                        prop_assert_eq!(d.key.as_ref(), Some(k));
                        prop_assert_eq!(d.value, Some(mv));
                        prop_assert_eq!(sut.len(), before - 1);
                        prop_assert!(sut.get(k).is_none());
                    }
                    (Err(TableError::NotFound), None) => {
                        prop_assert_eq!(sut.len(), before);
                    }
                    (s, m) => prop_assert!(false, "diverged: {:?} vs {:?}", s, m),
                }
            }
            Op::Bump(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "diverged: {:?} vs {:?}", s, m),
                }
            }
            Op::Clear => {
                let detached = sut.clear();
                prop_assert_eq!(detached.len(), model.len());
                model.clear();
                prop_assert!(sut.is_empty());
            }
            Op::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let chained: usize = (0..sut.bucket_count()).map(|b| sut.chain_len(b)).sum();
        prop_assert_eq!(chained, sut.len());
        for k in model.keys() {
            let b = sut.bucket_of(k.as_str());
            prop_assert!(b < sut.bucket_count());
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), capacity in 0usize..40) {
        let sut = ChainHashMap::new(StrHasher, StrComparator, capacity, Options::NONE)
            .expect("valid construction");
        run_state_machine(sut, &pool, ops)?;
    }

    // Same invariants with every key in one chain, which stresses head,
    // middle and tail unlinking.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainHashMap::new(ConstHasher, StrComparator, 7, Options::NONE)
            .expect("valid construction");
        run_state_machine(sut, &pool, ops)?;
    }

    #[test]
    fn prop_bucket_count_is_prime_and_bounded(capacity in 0usize..5000) {
        let sut = ChainHashMap::<i32, i32, _, _>::new(
            crate::strategy::IntHasher,
            crate::strategy::IntComparator,
            capacity,
            Options::NONE,
        )
        .expect("valid construction");
        let n = sut.bucket_count();
        prop_assert!((2..n).take_while(|d| d * d <= n).all(|d| n % d != 0));
        if capacity > 2 {
            prop_assert!(n <= capacity);
            let composite = |m: usize| (2..m).any(|d| d * d <= m && m % d == 0);
            prop_assert!(((n + 1)..=capacity).all(composite));
        } else {
            prop_assert_eq!(n, crate::prime::DEFAULT_CAPACITY);
        }
    }

    #[test]
    fn prop_hash_code_non_negative(key in any::<i32>()) {
        struct Raw;
        impl KeyHasher<i32> for Raw {
            fn hash(&self, key: &i32) -> i32 {
                *key
            }
        }
        let sut = ChainHashMap::<i32, (), _, _>::new(
            Raw,
            crate::strategy::IntComparator,
            7,
            Options::NONE,
        )
        .expect("valid construction");
        prop_assert_eq!(sut.hash_code(&key), key.unsigned_abs());
        prop_assert!(sut.bucket_of(&key) < 7);
    }
}
