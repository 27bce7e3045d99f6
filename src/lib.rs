//! opendict: an open-addressing `Dict` and `Set` with perturbation
//! probing, plus an arena-backed red-black `RbTree`, all sharing one
//! customization contract.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep probe sequences correct across insertions, tombstoned
//!   deletions and resizes, while letting callers plug in hashing,
//!   ordering and default-value strategies.
//! - Layers:
//!   - RawTable<K, V>: slot array, probe sequence, tombstone-aware search,
//!     insert-by-slot, resize. Knows nothing about hashers or borrowing.
//!   - Dict<K, V, S> / Set<K, S>: public APIs over RawTable. They hash
//!     keys with `S`, decide when to grow, and expose copy-style (`&Q`,
//!     clone on insert) and move-style (`*_owned`) operation twins.
//!   - RbTree<K, V, C>: independent ordered map over a `SlotMap` arena
//!     with a black sentinel node.
//!
//! Table invariants
//! - Capacity is a power of two, at least 8 slots. Tables of 8 slots are
//!   stored inline; larger tables are heap-allocated.
//! - `fill` (occupied + tombstones) < capacity at all times, so every
//!   probe walk reaches an empty slot.
//! - After an insertion that brings `fill` to 2/3 of capacity the table
//!   is rebuilt for `used * 4` entries (`used * 2` above 50 000 live
//!   entries). Rebuilding drops all tombstones, which is the only way a
//!   table shrinks.
//! - Each entry stores its `u64` hash; resizing and cloning reuse it and
//!   never call `K: Hash` again.
//!
//! Failure model
//! - Growth is fallible: allocation failure or size overflow surfaces as
//!   `TableError` from every operation that may resize. A failed growth
//!   leaves the table consistent at its old size; an entry inserted just
//!   before the failed growth stays in place.
//! - Precondition violations (adding a present key, replacing or
//!   deleting an absent one) panic. Each has a non-panicking sibling
//!   (`set`, `remove`, `discard`).
//! - The tree allocates per node through its arena and does not report
//!   allocation failure.
//!
//! Iteration
//! - `Dict` and `Set` iterate in slot order. Cursors borrow the container,
//!   so structural mutation while a cursor is alive is rejected at
//!   compile time; `restart` rewinds a cursor to the first slot.
//! - `RbTree` iterates in key order.
//!
//! Notes and non-goals
//! - Single-threaded containers; no interior mutability.
//! - No ordering guarantee for hash containers beyond slot order.
//! - Diagnostics go through the `log` facade; the crate installs no
//!   logger.

pub mod dict;
mod dict_proptest;
pub mod error;
pub mod hashing;
pub mod iter;
mod raw_table;
pub mod rb_tree;
mod rb_tree_proptest;
pub mod set;

// Public surface
pub use dict::Dict;
pub use error::{Result, TableError};
pub use hashing::{DefaultValue, Djb2Hasher, Djb2State, KeyOrder, NaturalOrder};
pub use iter::{Iter, IterMut, SetIter};
pub use rb_tree::{Handle, RbTree};
pub use set::Set;
