//! RawTable: the open-addressing slot array shared by `Dict` and `Set`.
//!
//! Slots are a three-state enum (empty, tombstone, occupied). Collisions
//! are resolved with perturbation probing: the first probe is
//! `hash & mask`; every further probe is `i = 5*i + perturb + 1` with
//! `perturb` starting at the full hash and shifted right by 5 after each
//! step, so high hash bits feed the sequence until they decay, after which
//! the recurrence alone visits every slot of the power-of-two table.
//!
//! Invariants
//! - `mask + 1` is a power of two and at least `MINSIZE`.
//! - `fill` counts occupied + tombstone slots, `used` counts occupied;
//!   `fill >= used`.
//! - At least one slot is always empty, so every probe walk terminates.
//! - Tables of `MINSIZE` slots live inline; larger ones are heap-backed.

use crate::error::{Result, TableError};
use core::mem;
use smallvec::SmallVec;

/// Slot count of the smallest (inline) table.
pub(crate) const MINSIZE: usize = 8;

const PERTURB_SHIFT: u32 = 5;

/// Above this many live entries growth doubles instead of quadrupling.
const LARGE_TABLE: usize = 50_000;

pub(crate) type Slots<K, V> = SmallVec<[Slot<K, V>; MINSIZE]>;

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(Entry<K, V>),
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<&mut Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }
}

/// Position within a probe sequence.
#[derive(Clone, Copy, Debug)]
struct Probe {
    pos: usize,
    perturb: usize,
    mask: usize,
}

impl Probe {
    #[inline]
    fn new(hash: u64, mask: usize) -> Self {
        let h = hash as usize;
        Probe {
            pos: h & mask,
            perturb: h,
            mask,
        }
    }

    #[inline]
    fn advance(&mut self) {
        self.pos = (self.pos << 2)
            .wrapping_add(self.pos)
            .wrapping_add(self.perturb)
            .wrapping_add(1)
            & self.mask;
        self.perturb >>= PERTURB_SHIFT;
    }
}

/// Smallest power-of-two slot count that holds `entries` below the 2/3
/// load limit.
fn slots_for(entries: usize) -> Result<usize> {
    let overflow = TableError::CapacityOverflow { requested: entries };
    let load = entries.checked_mul(3).ok_or(overflow.clone())?;
    let mut size = MINSIZE;
    while size.checked_mul(2).ok_or(overflow.clone())? <= load {
        size = size.checked_mul(2).ok_or(overflow.clone())?;
    }
    Ok(size)
}

fn inline_slots<K, V>() -> Slots<K, V> {
    (0..MINSIZE).map(|_| Slot::Empty).collect()
}

fn alloc_slots<K, V>(size: usize) -> Result<Slots<K, V>> {
    let mut slots = Slots::new();
    slots
        .try_reserve_exact(size)
        .map_err(|e| TableError::from_alloc(e, size))?;
    slots.extend((0..size).map(|_| Slot::Empty));
    Ok(slots)
}

pub(crate) struct RawTable<K, V> {
    fill: usize,
    used: usize,
    mask: usize,
    slots: Slots<K, V>,
}

impl<K, V> RawTable<K, V> {
    pub(crate) fn new() -> Self {
        RawTable {
            fill: 0,
            used: 0,
            mask: MINSIZE - 1,
            slots: inline_slots(),
        }
    }

    /// Table sized so `entries` insertions never trigger a resize.
    pub(crate) fn with_capacity(entries: usize) -> Result<Self> {
        let size = slots_for(entries)?;
        if size == MINSIZE {
            return Ok(Self::new());
        }
        Ok(RawTable {
            fill: 0,
            used: 0,
            mask: size - 1,
            slots: alloc_slots(size)?,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.used
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.mask + 1
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.fill - self.used
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<K, V>] {
        &mut self.slots
    }

    #[inline]
    pub(crate) fn slot(&self, i: usize) -> &Slot<K, V> {
        &self.slots[i]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, i: usize) -> &mut Slot<K, V> {
        &mut self.slots[i]
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.slots.iter().filter_map(Slot::entry)
    }

    /// Locate `hash`/`eq` along its probe sequence.
    ///
    /// Returns the occupied slot holding an equal key, or else the first
    /// tombstone passed on the way, or else the empty slot that ended the
    /// walk. Either way the returned index is where the key lives or would
    /// be inserted.
    pub(crate) fn find_slot<F>(&self, hash: u64, mut eq: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut probe = Probe::new(hash, self.mask);
        let mut freeslot = None;
        loop {
            match &self.slots[probe.pos] {
                Slot::Empty => return freeslot.unwrap_or(probe.pos),
                Slot::Tombstone => {
                    if freeslot.is_none() {
                        freeslot = Some(probe.pos);
                    }
                }
                Slot::Occupied(e) => {
                    if e.hash == hash && eq(&e.key) {
                        return probe.pos;
                    }
                }
            }
            probe.advance();
        }
    }

    /// `find_slot` for tables known to hold no tombstones.
    pub(crate) fn find_slot_clean<F>(&self, hash: u64, mut eq: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        debug_assert_eq!(self.fill, self.used);
        let mut probe = Probe::new(hash, self.mask);
        loop {
            match &self.slots[probe.pos] {
                Slot::Occupied(e) if !(e.hash == hash && eq(&e.key)) => probe.advance(),
                _ => return probe.pos,
            }
        }
    }

    pub(crate) fn find<F>(&self, hash: u64, eq: F) -> Option<&Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        self.slots[self.find_slot(hash, eq)].entry()
    }

    pub(crate) fn find_mut<F>(&mut self, hash: u64, eq: F) -> Option<&mut Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let i = self.find_slot(hash, eq);
        self.slots[i].entry_mut()
    }

    /// Install into slot `i` as located by `find_slot`.
    ///
    /// An occupied slot keeps its key and swaps in `value`, handing the old
    /// value back. A vacant slot receives `key()` and `value`; `fill` only
    /// grows when the slot was empty rather than a reused tombstone.
    pub(crate) fn insert_at<F>(&mut self, i: usize, hash: u64, key: F, value: V) -> Option<V>
    where
        F: FnOnce() -> K,
    {
        if let Slot::Occupied(e) = &mut self.slots[i] {
            return Some(mem::replace(&mut e.value, value));
        }
        if matches!(self.slots[i], Slot::Empty) {
            self.fill += 1;
        }
        self.slots[i] = Slot::Occupied(Entry {
            hash,
            key: key(),
            value,
        });
        self.used += 1;
        None
    }

    /// Insert an entry whose key is absent into a table without
    /// tombstones; takes the first empty slot on the probe sequence.
    pub(crate) fn insert_clean(&mut self, entry: Entry<K, V>) {
        let mut probe = Probe::new(entry.hash, self.mask);
        while !matches!(self.slots[probe.pos], Slot::Empty) {
            probe.advance();
        }
        self.slots[probe.pos] = Slot::Occupied(entry);
        self.fill += 1;
        self.used += 1;
    }

    /// Turn occupied slot `i` into a tombstone and return its entry.
    /// `fill` is unchanged; non-occupied slots are left alone.
    pub(crate) fn take_at(&mut self, i: usize) -> Option<Entry<K, V>> {
        if !self.slots[i].is_occupied() {
            return None;
        }
        match mem::replace(&mut self.slots[i], Slot::Tombstone) {
            Slot::Occupied(e) => {
                self.used -= 1;
                Some(e)
            }
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn needs_resize(&self) -> bool {
        self.fill.saturating_mul(3) >= self.capacity().saturating_mul(2)
    }

    /// Resize if the last insertion crossed the load limit.
    pub(crate) fn maybe_grow(&mut self) -> Result<()> {
        if !self.needs_resize() {
            return Ok(());
        }
        let factor = if self.used > LARGE_TABLE { 2 } else { 4 };
        self.resize(self.used.saturating_mul(factor))
    }

    /// Make sure the next insertion cannot consume the last empty slot.
    ///
    /// Only fires when earlier growth failed; a healthy table stays below
    /// 2/3 load.
    pub(crate) fn ensure_vacancy(&mut self) -> Result<()> {
        if self.fill + 1 < self.capacity() {
            return Ok(());
        }
        self.resize(self.used.saturating_add(1).saturating_mul(4))
    }

    /// Pre-size for `additional` insertions so a bulk operation does not
    /// resize incrementally.
    pub(crate) fn reserve_for(&mut self, additional: usize) -> Result<()> {
        let load = self.fill.saturating_add(additional).saturating_mul(3);
        if load < self.capacity().saturating_mul(2) {
            return Ok(());
        }
        log::debug!(
            "pre-sizing table of {} slots for {} incoming entries",
            self.capacity(),
            additional
        );
        self.resize(self.used.saturating_add(additional).saturating_mul(2))
    }

    /// Rebuild into the smallest power-of-two table strictly larger than
    /// `minused`, dropping every tombstone on the way.
    pub(crate) fn resize(&mut self, minused: usize) -> Result<()> {
        let mut size = MINSIZE;
        while size <= minused {
            size = size
                .checked_mul(2)
                .ok_or(TableError::CapacityOverflow { requested: minused })?;
        }

        if size == MINSIZE && !self.slots.spilled() && self.fill == self.used {
            log::trace!("inline table has no tombstones; resize skipped");
            return Ok(());
        }

        let fresh = if size == MINSIZE {
            inline_slots()
        } else {
            alloc_slots(size)?
        };
        log::debug!(
            "resizing table {} -> {} slots ({} live, {} tombstones reclaimed)",
            self.capacity(),
            size,
            self.used,
            self.tombstones()
        );

        let old = mem::replace(&mut self.slots, fresh);
        let used = self.used;
        self.mask = size - 1;
        self.fill = 0;
        self.used = 0;
        for slot in old {
            if let Slot::Occupied(entry) = slot {
                self.insert_clean(entry);
            }
        }
        debug_assert_eq!(self.used, used);
        Ok(())
    }

    /// Drop every entry and fall back to the inline table.
    pub(crate) fn clear(&mut self) {
        if self.fill == 0 && !self.slots.spilled() {
            return;
        }
        log::trace!(
            "clearing table of {} slots ({} live)",
            self.capacity(),
            self.used
        );
        let old = mem::replace(&mut self.slots, inline_slots());
        self.mask = MINSIZE - 1;
        self.fill = 0;
        self.used = 0;
        drop(old);
    }

    /// Tombstone-free copy sized to the live entry count.
    pub(crate) fn try_clone(&self) -> Result<Self>
    where
        K: Clone,
        V: Clone,
    {
        let mut copy = Self::with_capacity(self.used)?;
        for entry in self.entries() {
            copy.insert_clean(entry.clone());
        }
        Ok(copy)
    }

    #[cfg(test)]
    pub(crate) fn fill(&self) -> usize {
        self.fill
    }

    #[cfg(test)]
    pub(crate) fn is_inline(&self) -> bool {
        !self.slots.spilled()
    }
}
