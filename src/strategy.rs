//! Pluggable hashing and key comparison.
//!
//! A table is parameterized by one `KeyHasher` and one `KeyComparator`.
//! Both are plain values, usually zero-sized, so calls monomorphize and
//! no dynamic dispatch is involved.

use core::cmp::Ordering;
use core::fmt;

/// Identifies which family a strategy belongs to.
///
/// Only the built-in strategies report a non-`Custom` tag. Construction
/// rejects a table whose hasher and comparator carry two different
/// built-in tags; anything involving `Custom` is accepted as-is.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StrategyTag {
    Integer,
    String,
    Custom,
}

impl StrategyTag {
    pub fn is_builtin(self) -> bool {
        !matches!(self, StrategyTag::Custom)
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyTag::Integer => "integer",
            StrategyTag::String => "string",
            StrategyTag::Custom => "custom",
        })
    }
}

/// Maps a key to a raw hash. The raw value may be negative; the table
/// normalizes it before reducing it to a bucket index.
///
/// Keys that compare equal must hash equally, including across borrowed
/// forms (`String` vs `str`).
pub trait KeyHasher<Q: ?Sized> {
    fn hash(&self, key: &Q) -> i32;

    fn tag(&self) -> StrategyTag {
        StrategyTag::Custom
    }
}

/// Decides key equality. Only `Ordering::Equal` is consulted by the table;
/// the ordering itself is never used for placement.
pub trait KeyComparator<Q: ?Sized> {
    fn compare(&self, a: &Q, b: &Q) -> Ordering;

    fn tag(&self) -> StrategyTag {
        StrategyTag::Custom
    }
}

/// Integer-like keys usable with `IntHasher` and `IntComparator`.
///
/// `as_i32` reinterprets (or truncates) the bit pattern; no mixing is
/// applied.
pub trait IntKey: Copy + Ord {
    fn as_i32(self) -> i32;
}

macro_rules! int_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntKey for $t {
                #[inline]
                fn as_i32(self) -> i32 {
                    self as i32
                }
            }
        )*
    };
}

int_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Identity hash for integer keys.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IntHasher;

impl<Q: IntKey> KeyHasher<Q> for IntHasher {
    #[inline]
    fn hash(&self, key: &Q) -> i32 {
        key.as_i32()
    }

    fn tag(&self) -> StrategyTag {
        StrategyTag::Integer
    }
}

/// Three-way numeric comparison for integer keys. Unlike a subtraction
/// based comparator this cannot wrap for keys far apart.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IntComparator;

impl<Q: IntKey> KeyComparator<Q> for IntComparator {
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        a.cmp(b)
    }

    fn tag(&self) -> StrategyTag {
        StrategyTag::Integer
    }
}

/// Polynomial string hash (`h = 31 * h + byte`) that only samples the
/// bytes at index 0 and at power-of-two indices (1, 2, 4, 8, ...).
///
/// Strings that agree on every sampled position collide even when they
/// differ elsewhere, e.g. `"str19"` and `"str49"`. Kept as-is so hash codes
/// match existing tables built with this function.
///
/// The wrapped `u32` sum is returned as `i32`, so a sum with bit 31 set
/// reads as negative and the table folds it with `unsigned_abs`. Long
/// strings therefore land in a different bucket than an unsigned-only
/// reduction of the same sum would pick: `"z".repeat(17)` sums to
/// 3609181632, which the table normalizes to 685785664.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StrHasher;

impl StrHasher {
    pub fn hash_str(s: &str) -> i32 {
        let mut hash: u32 = 0;
        let mut exp: usize = 1;
        for (i, &b) in s.as_bytes().iter().enumerate() {
            if i == 0 || i == exp {
                hash = hash.wrapping_mul(31).wrapping_add(u32::from(b));
                if i != 0 {
                    exp <<= 1;
                }
            }
        }
        hash as i32
    }
}

impl<Q: AsRef<str> + ?Sized> KeyHasher<Q> for StrHasher {
    #[inline]
    fn hash(&self, key: &Q) -> i32 {
        Self::hash_str(key.as_ref())
    }

    fn tag(&self) -> StrategyTag {
        StrategyTag::String
    }
}

/// Byte-wise lexicographic comparison over the whole string.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StrComparator;

impl<Q: AsRef<str> + ?Sized> KeyComparator<Q> for StrComparator {
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        a.as_ref().as_bytes().cmp(b.as_ref().as_bytes())
    }

    fn tag(&self) -> StrategyTag {
        StrategyTag::String
    }
}

/// Returns true when `hasher` and `comparator` are built-in strategies
/// from different families.
pub(crate) fn mismatched(hasher: StrategyTag, comparator: StrategyTag) -> bool {
    hasher.is_builtin() && comparator.is_builtin() && hasher != comparator
}
