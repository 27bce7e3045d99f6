//! Customization contract: the hash, ordering and default-value hooks
//! every container is parameterized by.
//!
//! Duplication and release are not hooks here; they are `Clone` and
//! `Drop` on the key and value types.

use core::cmp::Ordering;
use core::hash::{BuildHasherDefault, Hasher};

/// Classic djb2 string hash (`hash * 33 + byte`, seeded with 5381).
///
/// Strings feed their bytes plus a `0xff` terminator through `Hash`, so
/// the result differs from the textbook value by one extra round; it is
/// still a pure function of the key contents.
#[derive(Clone, Copy, Debug)]
pub struct Djb2Hasher {
    hash: u64,
}

impl Default for Djb2Hasher {
    fn default() -> Self {
        Djb2Hasher { hash: 5381 }
    }
}

impl Hasher for Djb2Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut h = self.hash;
        for &b in bytes {
            h = (h << 5).wrapping_add(h).wrapping_add(u64::from(b));
        }
        self.hash = h;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Default `BuildHasher` for `Dict` and `Set`.
pub type Djb2State = BuildHasherDefault<Djb2Hasher>;

/// Synthesizes the value inserted by `get_or_insert_default`.
pub type DefaultValue<V> = fn() -> V;

/// Total order used by `RbTree` to place and find keys.
pub trait KeyOrder<Q: ?Sized> {
    fn compare(&self, a: &Q, b: &Q) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<Q> KeyOrder<Q> for NaturalOrder
where
    Q: ?Sized + Ord,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        a.cmp(b)
    }
}

impl<Q, F> KeyOrder<Q> for F
where
    Q: ?Sized,
    F: Fn(&Q, &Q) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::{BuildHasher, Hash};

    /// Invariant: raw byte input follows the djb2 recurrence exactly.
    #[test]
    fn djb2_matches_reference_values() {
        let mut h = Djb2Hasher::default();
        assert_eq!(h.finish(), 5381);
        h.write(b"a");
        assert_eq!(h.finish(), 5381 * 33 + 97);
        h.write(b"b");
        assert_eq!(h.finish(), (5381 * 33 + 97) * 33 + 98);
    }

    /// Invariant: equal keys hash equally through the `BuildHasher`.
    #[test]
    fn state_is_deterministic() {
        let s = Djb2State::default();
        assert_eq!(s.hash_one("xffff"), s.hash_one(&"xffff".to_string()));
        assert_ne!(s.hash_one("a"), s.hash_one("b"));

        let mut h = s.build_hasher();
        "a".hash(&mut h);
        assert_eq!(h.finish(), s.hash_one("a"));
    }

    #[test]
    fn orders() {
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(NaturalOrder.compare("b", "a"), Ordering::Greater);
        let rev = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(rev.compare(&1, &2), Ordering::Greater);
    }
}
