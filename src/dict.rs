//! Dict: open-addressing hash map over `RawTable`.

use crate::error::Result;
use crate::hashing::{DefaultValue, Djb2State};
use crate::iter::{Iter, IterMut};
use crate::raw_table::{RawTable, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

/// Hash map with perturbation probing and tombstone deletion.
///
/// Each operation family comes in two flavors. Copy-style methods (`set`,
/// `add`, `replace`) take the key and value by reference and clone what
/// they keep. Owning methods (`set_owned`, `add_owned`, `replace_owned`,
/// `take`) move the caller's objects in or out instead.
///
/// `add`, `replace`, `delete` and `take` are preconditioned on the key
/// being absent or present; violating that is a caller bug and panics.
pub struct Dict<K, V, S = Djb2State> {
    table: RawTable<K, V>,
    hasher: S,
    default_value: DefaultValue<V>,
}

#[inline]
fn key_eq<K, Q>(q: &Q) -> impl Fn(&K) -> bool + '_
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    move |k| k.borrow() == q
}

impl<K, V> Dict<K, V>
where
    K: Eq + Hash,
    V: Default,
{
    /// Empty dict using the inline table, djb2 hashing and `V::default`.
    pub fn new() -> Self {
        Self::with_hasher(Djb2State::default())
    }

    /// Dict sized to hold `capacity` entries without resizing.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, Djb2State::default())
    }
}

impl<K, V> Default for Dict<K, V>
where
    K: Eq + Hash,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Dict<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self
    where
        V: Default,
    {
        Dict {
            table: RawTable::new(),
            hasher,
            default_value: V::default,
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self>
    where
        V: Default,
    {
        Self::with_options(capacity, hasher, V::default)
    }

    /// Fully customized constructor: capacity hint, hasher and the factory
    /// `get_or_insert_default` uses to synthesize missing values.
    pub fn with_options(capacity: usize, hasher: S, default_value: DefaultValue<V>) -> Result<Self> {
        Ok(Dict {
            table: RawTable::with_capacity(capacity)?,
            hasher,
            default_value,
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.table.find(hash, key_eq(key)).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.table.find_mut(hash, key_eq(key)).map(|e| &mut e.value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.table.find(hash, key_eq(key)).map(|e| (&e.key, &e.value))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).is_some()
    }

    /// Upsert a copy of `value`; the key is cloned only when it is new.
    pub fn set<Q>(&mut self, key: &Q, value: &V) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        V: Clone,
    {
        self.table.ensure_vacancy()?;
        let hash = self.make_hash(key);
        let i = self.table.find_slot(hash, key_eq(key));
        let old = self.table.insert_at(i, hash, || key.to_owned(), value.clone());
        drop(old);
        self.table.maybe_grow()
    }

    /// Upsert by moving `key` and `value` in. When the key is already
    /// present the passed key is dropped and the old value returned.
    pub fn set_owned(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.table.ensure_vacancy()?;
        let hash = self.make_hash(&key);
        let i = self.table.find_slot(hash, key_eq(&key));
        let old = self.table.insert_at(i, hash, || key, value);
        if old.is_none() {
            self.table.maybe_grow()?;
        }
        Ok(old)
    }

    /// Insert a copy of a key that must not be present.
    pub fn add<Q>(&mut self, key: &Q, value: &V) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        V: Clone,
    {
        self.table.ensure_vacancy()?;
        let hash = self.make_hash(key);
        let i = self.table.find_slot(hash, key_eq(key));
        assert!(
            !self.table.slot(i).is_occupied(),
            "Dict::add called with a key that is already present"
        );
        self.table.insert_at(i, hash, || key.to_owned(), value.clone());
        self.table.maybe_grow()
    }

    /// Move in a key that must not be present.
    pub fn add_owned(&mut self, key: K, value: V) -> Result<()> {
        self.table.ensure_vacancy()?;
        let hash = self.make_hash(&key);
        let i = self.table.find_slot(hash, key_eq(&key));
        assert!(
            !self.table.slot(i).is_occupied(),
            "Dict::add_owned called with a key that is already present"
        );
        self.table.insert_at(i, hash, || key, value);
        self.table.maybe_grow()
    }

    /// Overwrite the value of a present key with a copy of `value`,
    /// returning the previous value.
    pub fn replace<Q>(&mut self, key: &Q, value: &V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.replace_owned(key, value.clone())
    }

    /// Overwrite the value of a present key by moving `value` in.
    pub fn replace_owned<Q>(&mut self, key: &Q, value: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.get_mut(key) {
            Some(slot) => core::mem::replace(slot, value),
            None => panic!("Dict::replace called with a key that is not present"),
        }
    }

    /// Value for `key`, inserting the default factory's value first when
    /// the key is missing.
    pub fn get_or_insert_default<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        self.table.ensure_vacancy()?;
        let hash = self.make_hash(key);
        let mut i = self.table.find_slot(hash, key_eq(key));
        if !self.table.slot(i).is_occupied() {
            let value = (self.default_value)();
            self.table.insert_at(i, hash, || key.to_owned(), value);
            if self.table.needs_resize() {
                self.table.maybe_grow()?;
                // The entry moved into the rebuilt table, which has no tombstones.
                i = self.table.find_slot_clean(hash, key_eq(key));
            }
        }
        match self.table.slot_mut(i) {
            Slot::Occupied(e) => Ok(&mut e.value),
            _ => unreachable!("slot {i} holds the key just located or inserted"),
        }
    }

    /// Remove a present key, dropping it and its value.
    pub fn delete<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        drop(self.take(key));
    }

    /// Remove a present key and hand back ownership of the pair.
    pub fn take<Q>(&mut self, key: &Q) -> (K, V)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.remove_entry(key) {
            Some(kv) => kv,
            None => panic!("Dict::delete called with a key that is not present"),
        }
    }

    /// Remove `key` if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let i = self.table.find_slot(hash, key_eq(key));
        self.table.take_at(i).map(|e| (e.key, e.value))
    }

    /// Copy every entry of `other` into `self`, overwriting values of keys
    /// present in both. The table is grown once up front.
    pub fn update<S2>(&mut self, other: &Dict<K, V, S2>) -> Result<()>
    where
        K: Clone,
        V: Clone,
    {
        if other.is_empty() {
            return Ok(());
        }
        self.table.reserve_for(other.len())?;
        for entry in other.table.entries() {
            let hash = self.make_hash(&entry.key);
            let i = self.table.find_slot(hash, |k| *k == entry.key);
            self.table
                .insert_at(i, hash, || entry.key.clone(), entry.value.clone());
        }
        self.table.maybe_grow()
    }

    /// Independent copy with no tombstones, sized to the live entries.
    pub fn copy(&self) -> Result<Self>
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        Ok(Dict {
            table: self.table.try_clone()?,
            hasher: self.hasher.clone(),
            default_value: self.default_value,
        })
    }

    /// Entries sorted by value, largest first. Ties come out in no
    /// particular order.
    pub fn entries_by_value_desc(&self) -> Vec<(&K, &V)>
    where
        V: Ord,
    {
        let mut snapshot: Vec<(&K, &V)> = self.iter().collect();
        snapshot.sort_unstable_by(|a, b| b.1.cmp(a.1));
        snapshot
    }
}

impl<K, V, S> Dict<K, V, S> {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of slots in the current table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Deleted slots not yet reclaimed by a resize.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Drop every entry and return to the inline table.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Cursor over live entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.table)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.table)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dict<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Debug for Dict<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
