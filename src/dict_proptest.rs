#![cfg(test)]

// Property tests for Dict kept inside the crate so they can inspect the
// raw table's fill/used accounting.

use crate::dict::Dict;
use core::hash::BuildHasher;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations: indices shrink to earlier keys, pool length
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    SetOwned(usize, i32),
    Add(usize, i32),
    Replace(usize, i32),
    Delete(usize),
    Remove(usize),
    Bump(usize, i32),
    Contains(String),
    Clear,
    Iterate,
    Copy,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::SetOwned(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Add(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
            3 => idx.clone().prop_map(OpI::Delete),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => (idx.clone(), -5i32..5).prop_map(|(i, d)| OpI::Bump(i, d)),
            2 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Copy),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn snapshot<S>(d: &Dict<Key, i32, S>) -> BTreeMap<Key, i32> {
    d.iter().map(|(k, v)| (k.clone(), *v)).collect()
}

// Invariants exercised across random operation sequences:
// - get/contains parity with the model for every key after each op.
// - `set` overwrites, `add` only inserts absent keys, `replace` keeps len.
// - `delete`/`remove` leave tombstones that never hide later keys.
// - `get_or_insert_default` inserts the default exactly once.
// - Iteration yields each live entry once; `copy` is equal and
//   tombstone-free.
// - Table accounting: capacity is a power of two >= 8, at least one slot
//   stays empty, and `len` matches the model.
fn run_scenario<S>(
    mut sut: Dict<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Set(i, v) => {
                sut.set(&Key(pool[i].clone()), &v).unwrap();
                model.insert(Key(pool[i].clone()), v);
            }
            OpI::SetOwned(i, v) => {
                let k = Key(pool[i].clone());
                let old = sut.set_owned(k.clone(), v).unwrap();
                prop_assert_eq!(old, model.insert(k, v));
            }
            OpI::Add(i, v) => {
                let k = Key(pool[i].clone());
                if !model.contains_key(&k) {
                    sut.add_owned(k.clone(), v).unwrap();
                    model.insert(k, v);
                }
            }
            OpI::Replace(i, v) => {
                let k = Key(pool[i].clone());
                if let Some(mv) = model.get_mut(&k) {
                    let before = sut.len();
                    let old = sut.replace(pool[i].as_str(), &v);
                    prop_assert_eq!(old, *mv);
                    prop_assert_eq!(sut.len(), before);
                    *mv = v;
                }
            }
            OpI::Delete(i) => {
                let k = Key(pool[i].clone());
                if model.remove(&k).is_some() {
                    sut.delete(pool[i].as_str());
                }
                prop_assert!(!sut.contains_key(pool[i].as_str()));
            }
            OpI::Remove(i) => {
                let got = sut.remove(pool[i].as_str());
                prop_assert_eq!(got, model.remove(pool[i].as_str()));
            }
            OpI::Bump(i, d) => {
                let slot = sut.get_or_insert_default(&Key(pool[i].clone())).unwrap();
                *slot = slot.saturating_add(d);
                let mv = model.entry(Key(pool[i].clone())).or_insert(0);
                *mv = mv.saturating_add(d);
                prop_assert_eq!(sut.get(pool[i].as_str()), Some(&*mv));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(s.as_str()));
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), 8);
            }
            OpI::Iterate => {
                let m: BTreeMap<Key, i32> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(snapshot(&sut), m);
                prop_assert_eq!(sut.iter().len(), model.len());
            }
            OpI::Copy => {
                let c = sut.copy().unwrap();
                prop_assert_eq!(c.tombstones(), 0);
                prop_assert_eq!(snapshot(&c), snapshot(&sut));
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity().is_power_of_two() && sut.capacity() >= 8);
        prop_assert!(sut.len() + sut.tombstones() < sut.capacity());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k.0.as_str()), Some(v));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(Dict::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key shares one probe
// chain, so equality resolution and tombstone skipping carry the load.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(Dict::with_hasher(ConstBuildHasher), &pool, ops)?;
    }

    // Property: a capacity hint of n admits n fresh keys without resizing.
    #[test]
    fn prop_capacity_hint_avoids_resize(n in 0usize..400) {
        let mut d: Dict<u32, u32> = Dict::with_capacity(n).unwrap();
        let cap = d.capacity();
        for k in 0..n as u32 {
            d.set_owned(k, k).unwrap();
        }
        prop_assert_eq!(d.capacity(), cap);
        prop_assert_eq!(d.len(), n);
    }
}
