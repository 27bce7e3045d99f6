#![cfg(test)]

// Property tests for RbTree; in-crate so they can run the red-black
// invariant checker after every operation.

use crate::rb_tree::{Handle, RbTree};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
enum Op {
    Set(u16, i32),
    Add(u16, i32),
    Replace(u16, i32),
    Remove(u16),
    Delete(u16),
    Bump(u16),
    Find(u16),
    Clear,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    // Small key space so deletes hit live keys often.
    let key = 0u16..64;
    let op = prop_oneof![
        4 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
        2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Add(k, v)),
        1 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Replace(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Delete),
        2 => key.clone().prop_map(Op::Bump),
        2 => key.clone().prop_map(Op::Find),
        1 => Just(Op::Clear),
    ];
    proptest::collection::vec(op, 1..200)
}

// Property: state-machine equivalence against BTreeMap.
// - After every op the tree passes the red-black checks: black root, no
//   red-red edge, equal black height on every path, ascending in-order
//   keys, consistent parent links, clean sentinel.
// - In-order iteration matches the model exactly; min/max agree.
// - Handles of live entries stay valid and keep pointing at their key
//   across unrelated inserts and deletes; removed handles go stale.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_btreemap(ops in arb_ops()) {
        let mut sut: RbTree<u16, i32> = RbTree::new();
        let mut model: BTreeMap<u16, i32> = BTreeMap::new();
        let mut live: HashMap<u16, Handle> = HashMap::new();
        let mut stale: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    let h = sut.set(&k, &v);
                    if let Some(&prev) = live.get(&k) {
                        prop_assert_eq!(prev, h, "overwrite must keep the node");
                    }
                    live.insert(k, h);
                    model.insert(k, v);
                }
                Op::Add(k, v) => {
                    if !model.contains_key(&k) {
                        live.insert(k, sut.add_owned(k, v));
                        model.insert(k, v);
                    }
                }
                Op::Replace(k, v) => {
                    let old = sut.replace(&k, &v);
                    prop_assert_eq!(old, model.get(&k).copied());
                    if let Some(mv) = model.get_mut(&k) {
                        *mv = v;
                    }
                }
                Op::Remove(k) => {
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                    if let Some(h) = live.remove(&k) {
                        stale.push(h);
                    }
                }
                Op::Delete(k) => {
                    if model.remove(&k).is_some() {
                        sut.delete(&k);
                        stale.extend(live.remove(&k));
                    }
                }
                Op::Bump(k) => {
                    *sut.get_or_insert_default(&k) += 1;
                    *model.entry(k).or_insert(0) += 1;
                    if let Some(h) = sut.find(&k) {
                        live.insert(k, h);
                    }
                }
                Op::Find(k) => {
                    prop_assert_eq!(sut.find(&k), live.get(&k).copied());
                    prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    stale.extend(live.drain().map(|(_, h)| h));
                }
            }

            sut.check_invariants();
            prop_assert_eq!(sut.len(), model.len());
            let got: Vec<(u16, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
            let want: Vec<(u16, i32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(got, want);
            prop_assert_eq!(
                sut.min(None).and_then(|h| h.key(&sut)),
                model.keys().next()
            );
            prop_assert_eq!(
                sut.max(None).and_then(|h| h.key(&sut)),
                model.keys().next_back()
            );
            for (k, h) in &live {
                prop_assert_eq!(h.key(&sut), Some(k));
            }
            for h in &stale {
                prop_assert!(h.value(&sut).is_none());
            }
        }
    }

    // Property: pre-order and post-order each visit the same key set as
    // in-order, and both agree on which node is the root.
    #[test]
    fn prop_walks_cover_all_keys(keys in proptest::collection::btree_set(any::<i32>(), 0..300)) {
        let mut t: RbTree<i32, ()> = RbTree::new();
        for &k in &keys {
            t.set_owned(k, ());
        }
        let mut pre = Vec::new();
        t.walk_preorder(|k, _| pre.push(*k));
        let mut post = Vec::new();
        t.walk_postorder(|k, _| post.push(*k));
        let mut ino = Vec::new();
        t.walk_inorder(|k, _| ino.push(*k));

        let want: Vec<i32> = keys.iter().copied().collect();
        prop_assert_eq!(&ino, &want);
        // Root is first in pre-order and last in post-order.
        prop_assert_eq!(pre.first(), post.last());
        pre.sort_unstable();
        post.sort_unstable();
        prop_assert_eq!(&pre, &want);
        prop_assert_eq!(&post, &want);
    }
}
