//! Set: keys-only table (`RawTable<K, ()>`) and set algebra.
//!
//! The copying operators orient themselves around the larger operand:
//! `union` and `symmetric_difference` start from a copy of the larger set
//! and fold in the smaller one, `intersection` walks the smaller set and
//! probes the larger, so membership tests are bounded by the smaller size.
//! Passing the same set as both operands short-circuits.
//!
//! In-place operators take `&mut self` and `&other`, so a set can never be
//! its own right-hand operand there.

use crate::error::Result;
use crate::hashing::Djb2State;
use crate::iter::SetIter;
use crate::raw_table::RawTable;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

pub struct Set<K, S = Djb2State> {
    table: RawTable<K, ()>,
    hasher: S,
}

/// `(larger, smaller)`; the left operand wins ties.
fn bigger_smaller<'a, K, S>(
    a: &'a Set<K, S>,
    b: &'a Set<K, S>,
) -> (&'a Set<K, S>, &'a Set<K, S>) {
    if a.len() >= b.len() {
        (a, b)
    } else {
        (b, a)
    }
}

impl<K> Set<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Djb2State::default())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, Djb2State::default())
    }
}

impl<K> Default for Set<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> Set<K, S> {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Cursor over members in slot order.
    pub fn iter(&self) -> SetIter<'_, K> {
        SetIter::new(&self.table)
    }
}

impl<K, S> Set<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Set {
            table: RawTable::new(),
            hasher,
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self> {
        Ok(Set {
            table: RawTable::with_capacity(capacity)?,
            hasher,
        })
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.table.find(hash, |k| k.borrow() == key).is_some()
    }

    /// Insert a copy of `key` unless an equal member exists; no resize
    /// check. Returns whether the set grew.
    fn insert_hashed<Q>(&mut self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + ToOwned<Owned = K>,
    {
        let i = self.table.find_slot(hash, |k| k.borrow() == key);
        if self.table.slot(i).is_occupied() {
            return false;
        }
        self.table.insert_at(i, hash, || key.to_owned(), ());
        true
    }

    /// Add a copy of `key`. Re-adding a member is a no-op returning
    /// `Ok(false)`.
    pub fn add<Q>(&mut self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        self.table.ensure_vacancy()?;
        let hash = self.make_hash(key);
        let added = self.insert_hashed(hash, key);
        self.table.maybe_grow()?;
        Ok(added)
    }

    /// Move `key` in; dropped if an equal member already exists.
    pub fn add_owned(&mut self, key: K) -> Result<bool> {
        self.table.ensure_vacancy()?;
        let hash = self.make_hash(&key);
        let i = self.table.find_slot(hash, |k| *k == key);
        if self.table.slot(i).is_occupied() {
            return Ok(false);
        }
        self.table.insert_at(i, hash, || key, ());
        self.table.maybe_grow()?;
        Ok(true)
    }

    /// Add a copy of every key in `keys`; duplicates are ignored.
    pub fn add_from<'a, Q, I>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Q>,
        K: Borrow<Q>,
        Q: 'a + ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        for key in keys {
            self.add(key)?;
        }
        Ok(())
    }

    /// Remove a member that must be present.
    pub fn delete<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        assert!(
            self.discard(key),
            "Set::delete called with a key that is not a member"
        );
    }

    /// Remove `key` if it is a member; returns whether it was.
    pub fn discard<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.take(key).is_some()
    }

    /// Remove and return the stored member equal to `key`.
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let i = self.table.find_slot(hash, |k| k.borrow() == key);
        self.table.take_at(i).map(|e| e.key)
    }

    /// Independent, tombstone-free copy.
    pub fn copy(&self) -> Result<Self>
    where
        K: Clone,
        S: Clone,
    {
        Ok(Set {
            table: self.table.try_clone()?,
            hasher: self.hasher.clone(),
        })
    }

    fn empty_like(&self) -> Self
    where
        S: Clone,
    {
        Set::with_hasher(self.hasher.clone())
    }

    /// Is every member of `self` also in `other`?
    pub fn is_subset<S2>(&self, other: &Set<K, S2>) -> bool
    where
        S2: BuildHasher,
    {
        let same = core::ptr::eq(
            self as *const Self as *const (),
            other as *const Set<K, S2> as *const (),
        );
        if same {
            return true;
        }
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|k| other.contains(k))
    }

    /// Is every member of `other` also in `self`?
    pub fn is_superset<S2>(&self, other: &Set<K, S2>) -> bool
    where
        S2: BuildHasher,
    {
        other.is_subset(self)
    }

    // ---- copying operators ----

    /// `self ∪ other` as a new set.
    pub fn union(&self, other: &Self) -> Result<Self>
    where
        K: Clone,
        S: Clone,
    {
        let (big, small) = bigger_smaller(self, other);
        let mut result = big.copy()?;
        if core::ptr::eq(big, small) || small.is_empty() {
            return Ok(result);
        }
        result.table.reserve_for(small.len())?;
        for key in small.iter() {
            let hash = result.make_hash(key);
            result.insert_hashed(hash, key);
        }
        result.table.maybe_grow()?;
        Ok(result)
    }

    /// `self ∩ other` as a new set.
    pub fn intersection(&self, other: &Self) -> Result<Self>
    where
        K: Clone,
        S: Clone,
    {
        if core::ptr::eq(self, other) {
            return self.copy();
        }
        let (big, small) = bigger_smaller(self, other);
        let mut result = Set::with_capacity_and_hasher(small.len(), small.hasher.clone())?;
        for entry in small.table.entries() {
            if big.contains(&entry.key) {
                // Same hasher as `small`, so the stored hash carries over.
                result.table.insert_clean(entry.clone());
            }
        }
        Ok(result)
    }

    /// `self - other` as a new set.
    pub fn difference(&self, other: &Self) -> Result<Self>
    where
        K: Clone,
        S: Clone,
    {
        if core::ptr::eq(self, other) {
            return Ok(self.empty_like());
        }
        if other.is_empty() {
            return self.copy();
        }
        let mut result = Set::with_capacity_and_hasher(self.len(), self.hasher.clone())?;
        let mut unmatched = other.len();
        for entry in self.table.entries() {
            // Once every member of `other` has been matched, the rest pass.
            if unmatched == 0 || !other.contains(&entry.key) {
                result.table.insert_clean(entry.clone());
            } else {
                unmatched -= 1;
            }
        }
        Ok(result)
    }

    /// `self ∆ other` as a new set.
    pub fn symmetric_difference(&self, other: &Self) -> Result<Self>
    where
        K: Clone,
        S: Clone,
    {
        if core::ptr::eq(self, other) {
            return Ok(self.empty_like());
        }
        let (big, small) = bigger_smaller(self, other);
        let mut result = big.copy()?;
        result.symmetric_difference_with(small)?;
        Ok(result)
    }

    // ---- in-place operators ----

    /// `self |= other`.
    pub fn update<S2>(&mut self, other: &Set<K, S2>) -> Result<()>
    where
        K: Clone,
    {
        if other.is_empty() {
            return Ok(());
        }
        self.table.reserve_for(other.len())?;
        for key in other.iter() {
            let hash = self.make_hash(key);
            self.insert_hashed(hash, key);
        }
        self.table.maybe_grow()
    }

    /// Alias of [`Set::update`].
    pub fn union_with<S2>(&mut self, other: &Set<K, S2>) -> Result<()>
    where
        K: Clone,
    {
        self.update(other)
    }

    /// `self &= other`: drop members missing from `other`.
    pub fn intersect_with<S2>(&mut self, other: &Set<K, S2>)
    where
        S2: BuildHasher,
    {
        if other.is_empty() {
            self.clear();
            return;
        }
        let mut unmatched = other.len();
        for i in 0..self.table.capacity() {
            let keep = match self.table.slot(i).entry() {
                // With every member of `other` matched, the rest must go.
                Some(e) => unmatched > 0 && other.contains(&e.key),
                None => continue,
            };
            if keep {
                unmatched -= 1;
            } else {
                self.table.take_at(i);
            }
        }
    }

    /// `self -= other`: drop members present in `other`.
    pub fn difference_with<S2>(&mut self, other: &Set<K, S2>)
    where
        S2: BuildHasher,
    {
        if other.is_empty() {
            return;
        }
        let mut unmatched = other.len();
        for i in 0..self.table.capacity() {
            let hit = match self.table.slot(i).entry() {
                Some(e) => other.contains(&e.key),
                None => continue,
            };
            if hit {
                self.table.take_at(i);
                unmatched -= 1;
                if unmatched == 0 {
                    break;
                }
            }
        }
    }

    /// `self ^= other`: toggle every member of `other`.
    pub fn symmetric_difference_with<S2>(&mut self, other: &Set<K, S2>) -> Result<()>
    where
        K: Clone,
    {
        if other.is_empty() {
            return Ok(());
        }
        self.table.reserve_for(other.len())?;
        for key in other.iter() {
            let hash = self.make_hash(key);
            let i = self.table.find_slot(hash, |k| k == key);
            if self.table.slot(i).is_occupied() {
                self.table.take_at(i);
            } else {
                self.table.insert_at(i, hash, || key.clone(), ());
            }
        }
        self.table.maybe_grow()
    }
}

impl<K, S> PartialEq for Set<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Same members, regardless of slot layout or identity.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl<K, S> Eq for Set<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

impl<'a, K, S> IntoIterator for &'a Set<K, S> {
    type Item = &'a K;
    type IntoIter = SetIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, S> fmt::Debug for Set<K, S>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set_of(keys: &[&str]) -> Set<String> {
        let mut s = Set::new();
        s.add_from(keys.iter().copied()).unwrap();
        s
    }

    fn sorted(s: &Set<String>) -> Vec<&str> {
        let b: BTreeSet<&str> = s.iter().map(String::as_str).collect();
        b.into_iter().collect()
    }

    /// Invariant: duplicate adds are no-ops and report `false`.
    #[test]
    fn add_dedups() {
        let mut s: Set<String> = Set::new();
        assert!(s.add("a").unwrap());
        assert!(!s.add("a").unwrap());
        assert!(!s.add_owned("a".to_string()).unwrap());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn abracadabra() {
        let a = set_of(&["a", "b", "r", "a", "c", "a", "d", "a", "b", "r", "a"]);
        assert_eq!(sorted(&a), vec!["a", "b", "c", "d", "r"]);
        let b = set_of(&["a", "l", "a", "c", "a", "z", "a", "m"]);
        assert_eq!(sorted(&b), vec!["a", "c", "l", "m", "z"]);
        let u = a.union(&b).unwrap();
        assert_eq!(u.len(), 8);
        assert_eq!(sorted(&u), vec!["a", "b", "c", "d", "l", "m", "r", "z"]);
        assert_eq!(sorted(&a.intersection(&b).unwrap()), vec!["a", "c"]);
        assert_eq!(sorted(&a.difference(&b).unwrap()), vec!["b", "d", "r"]);
        assert_eq!(
            sorted(&a.symmetric_difference(&b).unwrap()),
            vec!["b", "d", "l", "m", "r", "z"]
        );
    }

    /// Invariant: operating on the same set twice short-circuits.
    #[test]
    fn self_aliasing() {
        let a = set_of(&["x", "y"]);
        assert_eq!(a.union(&a).unwrap(), a);
        assert_eq!(a.intersection(&a).unwrap(), a);
        assert!(a.difference(&a).unwrap().is_empty());
        assert!(a.symmetric_difference(&a).unwrap().is_empty());
        assert!(a.is_subset(&a));
    }

    #[test]
    fn in_place_operators() {
        let b = set_of(&["b", "c", "d"]);

        let mut s = set_of(&["a", "b", "c"]);
        s.update(&b).unwrap();
        assert_eq!(sorted(&s), vec!["a", "b", "c", "d"]);

        let mut s = set_of(&["a", "b", "c"]);
        s.intersect_with(&b);
        assert_eq!(sorted(&s), vec!["b", "c"]);

        let mut s = set_of(&["a", "b", "c"]);
        s.difference_with(&b);
        assert_eq!(sorted(&s), vec!["a"]);

        let mut s = set_of(&["a", "b", "c"]);
        s.symmetric_difference_with(&b).unwrap();
        assert_eq!(sorted(&s), vec!["a", "d"]);
    }

    /// Invariant: intersecting with an empty set empties; subtracting an
    /// empty set changes nothing.
    #[test]
    fn empty_operands() {
        let empty: Set<String> = Set::new();
        let mut s = set_of(&["a", "b"]);
        s.difference_with(&empty);
        assert_eq!(s.len(), 2);
        s.symmetric_difference_with(&empty).unwrap();
        assert_eq!(s.len(), 2);
        s.intersect_with(&empty);
        assert!(s.is_empty());
        assert!(empty.is_subset(&s));
    }

    #[test]
    fn subset_superset() {
        let small = set_of(&["a", "b"]);
        let big = set_of(&["a", "b", "c"]);
        assert!(small.is_subset(&big));
        assert!(big.is_superset(&small));
        assert!(!big.is_subset(&small));
        assert!(!small.is_superset(&big));
    }

    /// Invariant: equality ignores slot layout (tombstones, capacity).
    #[test]
    fn equality_by_members() {
        let mut a = set_of(&["a", "b", "c", "d", "e", "f", "g"]);
        for k in ["d", "e", "f", "g"] {
            a.delete(k);
        }
        let b = set_of(&["c", "b", "a"]);
        assert_ne!(a.capacity(), b.capacity());
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "not a member")]
    fn delete_missing_panics() {
        let mut s = set_of(&["a"]);
        s.delete("b");
    }

    #[test]
    fn discard_and_take() {
        let mut s = set_of(&["a"]);
        assert!(!s.discard("b"));
        assert_eq!(s.take("a"), Some("a".to_string()));
        assert!(s.is_empty());
        assert_eq!(s.tombstones(), 1);
    }
}
