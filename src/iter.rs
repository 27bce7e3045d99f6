//! Cursors over table slots.
//!
//! A cursor walks the slot array front to back, skipping empty and
//! tombstone slots, and stops as soon as it has produced as many entries
//! as the table held when the cursor was created. `restart` rewinds it to
//! the first slot. The cursor borrows its table, so the table cannot be
//! resized underneath it.

use crate::raw_table::{Entry, RawTable, Slot};
use core::iter::FusedIterator;

/// Restartable cursor over the live entries of a `Dict`.
pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    pos: usize,
    remaining: usize,
    total: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(table: &'a RawTable<K, V>) -> Self {
        Iter {
            slots: table.slots(),
            pos: 0,
            remaining: table.len(),
            total: table.len(),
        }
    }

    /// Rewind to the first slot.
    pub fn restart(&mut self) {
        self.pos = 0;
        self.remaining = self.total;
    }

    fn next_entry(&mut self) -> Option<&'a Entry<K, V>> {
        while self.remaining > 0 {
            let slot = self.slots.get(self.pos)?;
            self.pos += 1;
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some(e);
            }
        }
        None
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|e| (&e.key, &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Mutable iterator over the live entries of a `Dict`.
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(table: &'a mut RawTable<K, V>) -> Self {
        let remaining = table.len();
        IterMut {
            slots: table.slots_mut().iter_mut(),
            remaining,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Restartable cursor over the members of a `Set`.
pub struct SetIter<'a, K> {
    inner: Iter<'a, K, ()>,
}

impl<'a, K> SetIter<'a, K> {
    pub(crate) fn new(table: &'a RawTable<K, ()>) -> Self {
        SetIter {
            inner: Iter::new(table),
        }
    }

    /// Rewind to the first slot.
    pub fn restart(&mut self) {
        self.inner.restart();
    }
}

impl<'a, K> Clone for SetIter<'a, K> {
    fn clone(&self) -> Self {
        SetIter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> Iterator for SetIter<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_entry().map(|e| &e.key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for SetIter<'_, K> {}
impl<K> FusedIterator for SetIter<'_, K> {}
