//! RbTree: ordered map on a red-black tree stored in a slot arena.
//!
//! Nodes live in a `SlotMap` and link to each other by `NodeId`. A single
//! black sentinel node stands in for every missing child and for the
//! root's parent, so rotations and fixups never branch on "no node". The
//! sentinel's parent link is scratch space during deletion, exactly as in
//! the textbook algorithm, and is reset afterwards.
//!
//! Removing a node with two children moves its in-order successor node
//! into its place, so a `Handle` to any surviving entry stays valid across
//! every insert and delete.
//!
//! Traversals use an explicit stack instead of recursion. A red-black tree
//! with `n` nodes has height at most `2 * log2(n + 1)`, and `n` cannot
//! exceed `usize::MAX`, so `2 * usize::BITS` entries always suffice.

use crate::hashing::{DefaultValue, KeyOrder, NaturalOrder};
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::mem;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    struct NodeId;
}

/// Upper bound on tree height for any node count addressable by `usize`.
const MAX_HEIGHT: usize = 2 * usize::BITS as usize;

type NodeStack = SmallVec<[NodeId; MAX_HEIGHT]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug)]
struct Node<K, V> {
    color: Color,
    parent: NodeId,
    left: NodeId,
    right: NodeId,
    /// `None` only for the sentinel.
    entry: Option<(K, V)>,
}

/// Stable reference to a tree entry. Goes stale once the entry is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(NodeId);

impl Handle {
    pub fn key<'a, K, V, C>(&self, tree: &'a RbTree<K, V, C>) -> Option<&'a K> {
        tree.handle_entry(*self).map(|(k, _)| k)
    }

    pub fn value<'a, K, V, C>(&self, tree: &'a RbTree<K, V, C>) -> Option<&'a V> {
        tree.handle_entry(*self).map(|(_, v)| v)
    }

    pub fn value_mut<'a, K, V, C>(&self, tree: &'a mut RbTree<K, V, C>) -> Option<&'a mut V> {
        tree.handle_value_mut(*self)
    }
}

/// Where a key lives, or the parent and side it would hang from.
enum Seek {
    Found(NodeId),
    Vacant(NodeId, Ordering),
}

pub struct RbTree<K, V, C = NaturalOrder> {
    nodes: SlotMap<NodeId, Node<K, V>>,
    nil: NodeId,
    root: NodeId,
    order: C,
    default_value: DefaultValue<V>,
}

impl<K, V> RbTree<K, V>
where
    V: Default,
{
    pub fn new() -> Self {
        Self::with_order(NaturalOrder)
    }
}

impl<K, V> Default for RbTree<K, V>
where
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RbTree<K, V, C> {
    pub fn with_order(order: C) -> Self
    where
        V: Default,
    {
        Self::with_options(order, V::default)
    }

    /// Tree with a custom key order and default-value factory.
    pub fn with_options(order: C, default_value: DefaultValue<V>) -> Self {
        let mut nodes = SlotMap::with_key();
        let nil = nodes.insert_with_key(|id| Node {
            color: Color::Black,
            parent: id,
            left: id,
            right: id,
            entry: None,
        });
        RbTree {
            nodes,
            nil,
            root: nil,
            order,
            default_value,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root == self.nil
    }

    pub fn order(&self) -> &C {
        &self.order
    }

    /// Drop every entry; the sentinel survives.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        log::trace!("clearing tree of {} nodes", self.len());
        let nil = self.nil;
        self.nodes.retain(|id, _| id == nil);
        self.root = nil;
    }

    // ---- arena plumbing ----

    #[inline]
    fn color(&self, x: NodeId) -> Color {
        self.nodes[x].color
    }

    #[inline]
    fn parent(&self, x: NodeId) -> NodeId {
        self.nodes[x].parent
    }

    #[inline]
    fn left(&self, x: NodeId) -> NodeId {
        self.nodes[x].left
    }

    #[inline]
    fn right(&self, x: NodeId) -> NodeId {
        self.nodes[x].right
    }

    #[inline]
    fn set_color(&mut self, x: NodeId, c: Color) {
        self.nodes[x].color = c;
    }

    #[inline]
    fn set_parent(&mut self, x: NodeId, p: NodeId) {
        self.nodes[x].parent = p;
    }

    #[inline]
    fn set_left(&mut self, x: NodeId, l: NodeId) {
        self.nodes[x].left = l;
    }

    #[inline]
    fn set_right(&mut self, x: NodeId, r: NodeId) {
        self.nodes[x].right = r;
    }

    fn entry_of(&self, x: NodeId) -> (&K, &V) {
        match &self.nodes[x].entry {
            Some((k, v)) => (k, v),
            None => unreachable!("sentinel has no entry"),
        }
    }

    fn value_mut_of(&mut self, x: NodeId) -> &mut V {
        match &mut self.nodes[x].entry {
            Some((_, v)) => v,
            None => unreachable!("sentinel has no entry"),
        }
    }

    /// Live, non-sentinel node behind `h`.
    fn live(&self, h: Handle) -> Option<NodeId> {
        (h.0 != self.nil && self.nodes.contains_key(h.0)).then_some(h.0)
    }

    fn handle_entry(&self, h: Handle) -> Option<(&K, &V)> {
        let (k, v) = self.nodes.get(h.0)?.entry.as_ref()?;
        Some((k, v))
    }

    fn handle_value_mut(&mut self, h: Handle) -> Option<&mut V> {
        let (_, v) = self.nodes.get_mut(h.0)?.entry.as_mut()?;
        Some(v)
    }

    fn subtree_min(&self, mut x: NodeId) -> NodeId {
        while self.left(x) != self.nil {
            x = self.left(x);
        }
        x
    }

    fn subtree_max(&self, mut x: NodeId) -> NodeId {
        while self.right(x) != self.nil {
            x = self.right(x);
        }
        x
    }

    // ---- structure ----

    fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x);
        let yl = self.left(y);
        self.set_right(x, yl);
        if yl != self.nil {
            self.set_parent(yl, x);
        }
        let xp = self.parent(x);
        self.set_parent(y, xp);
        if xp == self.nil {
            self.root = y;
        } else if x == self.left(xp) {
            self.set_left(xp, y);
        } else {
            self.set_right(xp, y);
        }
        self.set_left(y, x);
        self.set_parent(x, y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let y = self.left(x);
        let yr = self.right(y);
        self.set_left(x, yr);
        if yr != self.nil {
            self.set_parent(yr, x);
        }
        let xp = self.parent(x);
        self.set_parent(y, xp);
        if xp == self.nil {
            self.root = y;
        } else if x == self.right(xp) {
            self.set_right(xp, y);
        } else {
            self.set_left(xp, y);
        }
        self.set_right(y, x);
        self.set_parent(x, y);
    }

    /// Hang a new red leaf under `parent` on `side` and rebalance.
    fn attach(&mut self, parent: NodeId, side: Ordering, key: K, value: V) -> NodeId {
        let nil = self.nil;
        let z = self.nodes.insert(Node {
            color: Color::Red,
            parent,
            left: nil,
            right: nil,
            entry: Some((key, value)),
        });
        if parent == nil {
            self.root = z;
        } else if side == Ordering::Less {
            self.set_left(parent, z);
        } else {
            self.set_right(parent, z);
        }
        self.insert_fixup(z);
        z
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            let g = self.parent(p);
            if p == self.left(g) {
                let uncle = self.right(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.right(p) {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.left(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Put subtree `v` where subtree `u` hangs. `v` may be the sentinel,
    /// whose parent is then set for the delete fixup.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let up = self.parent(u);
        if up == self.nil {
            self.root = v;
        } else if u == self.left(up) {
            self.set_left(up, v);
        } else {
            self.set_right(up, v);
        }
        self.set_parent(v, up);
    }

    /// Unlink `z`, rebalance, and hand back its entry.
    fn delete_node(&mut self, z: NodeId) -> (K, V) {
        let nil = self.nil;
        let mut removed_color = self.color(z);
        let x;
        if self.left(z) == nil {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z) == nil {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            let y = self.subtree_min(self.right(z));
            removed_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                self.set_parent(x, y);
            } else {
                self.transplant(y, x);
                let zr = self.right(z);
                self.set_right(y, zr);
                self.set_parent(zr, y);
            }
            self.transplant(z, y);
            let zl = self.left(z);
            self.set_left(y, zl);
            self.set_parent(zl, y);
            let zc = self.color(z);
            self.set_color(y, zc);
        }
        if removed_color == Color::Black {
            self.delete_fixup(x);
        }
        self.set_parent(nil, nil);

        match self.nodes.remove(z).and_then(|n| n.entry) {
            Some(entry) => entry,
            None => unreachable!("deleted node was not live"),
        }
    }

    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let p = self.parent(x);
            if x == self.left(p) {
                let mut w = self.right(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = self.right(self.parent(x));
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        let wl = self.left(w);
                        self.set_color(wl, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(self.parent(x));
                    }
                    let p = self.parent(x);
                    let pc = self.color(p);
                    self.set_color(w, pc);
                    self.set_color(p, Color::Black);
                    let wr = self.right(w);
                    self.set_color(wr, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = self.left(self.parent(x));
                }
                if self.color(self.right(w)) == Color::Black
                    && self.color(self.left(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        let wr = self.right(w);
                        self.set_color(wr, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(self.parent(x));
                    }
                    let p = self.parent(x);
                    let pc = self.color(p);
                    self.set_color(w, pc);
                    self.set_color(p, Color::Black);
                    let wl = self.left(w);
                    self.set_color(wl, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
    }

    // ---- ordered access ----

    /// Smallest entry of the subtree rooted at `from`, or of the whole
    /// tree. `None` when that subtree is empty or `from` is stale.
    pub fn min(&self, from: Option<Handle>) -> Option<Handle> {
        let start = match from {
            Some(h) => self.live(h)?,
            None => self.root,
        };
        (start != self.nil).then(|| Handle(self.subtree_min(start)))
    }

    /// Largest entry of the subtree rooted at `from`, or of the whole tree.
    pub fn max(&self, from: Option<Handle>) -> Option<Handle> {
        let start = match from {
            Some(h) => self.live(h)?,
            None => self.root,
        };
        (start != self.nil).then(|| Handle(self.subtree_max(start)))
    }

    /// Ascending in-order iterator.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        let mut it = Iter {
            tree: self,
            stack: NodeStack::new(),
            remaining: self.len(),
        };
        it.push_left_spine(self.root);
        it
    }

    pub fn walk_preorder<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        if self.is_empty() {
            return;
        }
        let mut stack = NodeStack::new();
        stack.push(self.root);
        while let Some(x) = stack.pop() {
            let (k, v) = self.entry_of(x);
            visit(k, v);
            if self.right(x) != self.nil {
                stack.push(self.right(x));
            }
            if self.left(x) != self.nil {
                stack.push(self.left(x));
            }
        }
    }

    pub fn walk_inorder<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.iter() {
            visit(k, v);
        }
    }

    pub fn walk_postorder<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        let mut stack = NodeStack::new();
        let mut x = self.root;
        let mut last = self.nil;
        loop {
            while x != self.nil {
                stack.push(x);
                x = self.left(x);
            }
            let Some(&top) = stack.last() else { break };
            let r = self.right(top);
            if r != self.nil && r != last {
                x = r;
            } else {
                let (k, v) = self.entry_of(top);
                visit(k, v);
                last = top;
                stack.pop();
            }
        }
    }
}

impl<K, V, C> RbTree<K, V, C> {
    fn seek<Q>(&self, key: &Q) -> Seek
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        let mut parent = self.nil;
        let mut side = Ordering::Equal;
        let mut x = self.root;
        while x != self.nil {
            side = self.order.compare(key, self.entry_of(x).0.borrow());
            match side {
                Ordering::Less => {
                    parent = x;
                    x = self.left(x);
                }
                Ordering::Greater => {
                    parent = x;
                    x = self.right(x);
                }
                Ordering::Equal => return Seek::Found(x),
            }
        }
        Seek::Vacant(parent, side)
    }

    fn find_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        match self.seek(key) {
            Seek::Found(x) => Some(x),
            Seek::Vacant(..) => None,
        }
    }

    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        self.find_node(key).map(Handle)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        self.find_node(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        self.find_node(key).map(|x| self.entry_of(x).1)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        self.find_node(key).map(|x| self.entry_of(x))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        let x = self.find_node(key)?;
        Some(self.value_mut_of(x))
    }

    /// Insert or overwrite with copies of `key` and `value`.
    pub fn set<Q>(&mut self, key: &Q, value: &V) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + ToOwned<Owned = K>,
        V: Clone,
        C: KeyOrder<Q>,
    {
        match self.seek(key) {
            Seek::Found(x) => {
                *self.value_mut_of(x) = value.clone();
                Handle(x)
            }
            Seek::Vacant(parent, side) => {
                Handle(self.attach(parent, side, key.to_owned(), value.clone()))
            }
        }
    }

    /// Move `key` and `value` in; an existing entry keeps its key and
    /// returns the old value.
    pub fn set_owned(&mut self, key: K, value: V) -> Option<V>
    where
        C: KeyOrder<K>,
    {
        match self.seek(&key) {
            Seek::Found(x) => Some(mem::replace(self.value_mut_of(x), value)),
            Seek::Vacant(parent, side) => {
                self.attach(parent, side, key, value);
                None
            }
        }
    }

    /// Insert copies of a key that must be absent.
    pub fn add<Q>(&mut self, key: &Q, value: &V) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + ToOwned<Owned = K>,
        V: Clone,
        C: KeyOrder<Q>,
    {
        match self.seek(key) {
            Seek::Found(_) => panic!("RbTree::add called with a key that is already present"),
            Seek::Vacant(parent, side) => {
                Handle(self.attach(parent, side, key.to_owned(), value.clone()))
            }
        }
    }

    pub fn add_owned(&mut self, key: K, value: V) -> Handle
    where
        C: KeyOrder<K>,
    {
        match self.seek(&key) {
            Seek::Found(_) => panic!("RbTree::add called with a key that is already present"),
            Seek::Vacant(parent, side) => Handle(self.attach(parent, side, key, value)),
        }
    }

    /// Overwrite the value of a present key with a copy of `value`.
    /// Absent keys leave the tree untouched and return `None`.
    pub fn replace<Q>(&mut self, key: &Q, value: &V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        V: Clone,
        C: KeyOrder<Q>,
    {
        let x = self.find_node(key)?;
        Some(mem::replace(self.value_mut_of(x), value.clone()))
    }

    /// Move `value` into a present key. `Err` returns `value` when the key
    /// is absent.
    pub fn replace_owned<Q>(&mut self, key: &Q, value: V) -> Result<V, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        match self.find_node(key) {
            Some(x) => Ok(mem::replace(self.value_mut_of(x), value)),
            None => Err(value),
        }
    }

    /// Value for `key`, inserting the default-value factory's output first
    /// if the key is absent.
    pub fn get_or_insert_default<Q>(&mut self, key: &Q) -> &mut V
    where
        K: Borrow<Q>,
        Q: ?Sized + ToOwned<Owned = K>,
        C: KeyOrder<Q>,
    {
        let x = match self.seek(key) {
            Seek::Found(x) => x,
            Seek::Vacant(parent, side) => {
                let value = (self.default_value)();
                self.attach(parent, side, key.to_owned(), value)
            }
        };
        self.value_mut_of(x)
    }

    /// Remove a key that must be present.
    pub fn delete<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        self.take(key);
    }

    /// Remove a key that must be present and hand its entry back.
    pub fn take<Q>(&mut self, key: &Q) -> (K, V)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        match self.remove_entry(key) {
            Some(entry) => entry,
            None => panic!("RbTree::delete called with a key that is not present"),
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: KeyOrder<Q>,
    {
        let z = self.find_node(key)?;
        Some(self.delete_node(z))
    }
}

#[cfg(test)]
impl<K, V, C> RbTree<K, V, C>
where
    C: KeyOrder<K>,
{
    /// Assert every red-black and ordering invariant; returns the black
    /// height.
    pub(crate) fn check_invariants(&self) -> usize {
        assert_eq!(self.color(self.nil), Color::Black, "sentinel turned red");
        assert_eq!(self.parent(self.nil), self.nil, "sentinel parent left dirty");
        assert_eq!(self.color(self.root), Color::Black, "root is red");
        let height = self.check_subtree(self.root, self.nil);
        let keys: Vec<&K> = self.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), self.len());
        for pair in keys.windows(2) {
            assert_eq!(
                self.order.compare(pair[0], pair[1]),
                Ordering::Less,
                "in-order keys not strictly ascending"
            );
        }
        height
    }

    fn check_subtree(&self, x: NodeId, parent: NodeId) -> usize {
        if x == self.nil {
            return 1;
        }
        assert_eq!(self.parent(x), parent, "broken parent link");
        if self.color(x) == Color::Red {
            assert_eq!(self.color(self.left(x)), Color::Black, "red node with red child");
            assert_eq!(self.color(self.right(x)), Color::Black, "red node with red child");
        }
        let l = self.check_subtree(self.left(x), x);
        let r = self.check_subtree(self.right(x), x);
        assert_eq!(l, r, "unequal black heights");
        l + usize::from(self.color(x) == Color::Black)
    }
}

/// Ascending iterator over `(&K, &V)`.
pub struct Iter<'a, K, V, C> {
    tree: &'a RbTree<K, V, C>,
    stack: NodeStack,
    remaining: usize,
}

impl<'a, K, V, C> Iter<'a, K, V, C> {
    fn push_left_spine(&mut self, mut x: NodeId) {
        while x != self.tree.nil {
            self.stack.push(x);
            x = self.tree.left(x);
        }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        self.push_left_spine(self.tree.right(x));
        self.remaining -= 1;
        Some(self.tree.entry_of(x))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {}

impl<'a, K, V, C> IntoIterator for &'a RbTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> fmt::Debug for RbTree<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[i32]) -> RbTree<i32, i32> {
        let mut t = RbTree::new();
        for &k in keys {
            t.set_owned(k, k * 10);
            t.check_invariants();
        }
        t
    }

    fn keys(t: &RbTree<i32, i32>) -> Vec<i32> {
        t.iter().map(|(k, _)| *k).collect()
    }

    /// Invariant: sequential inserts stay balanced and ordered.
    #[test]
    fn ascending_inserts_stay_balanced() {
        let t = tree_of(&(0..1000).collect::<Vec<_>>());
        assert_eq!(t.len(), 1000);
        let bh = t.check_invariants();
        // Height <= 2 * black height; 2 * log2(1001) < 20.
        assert!(bh <= 11, "black height {bh}");
        assert_eq!(keys(&t), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn set_overwrites_and_add_rejects() {
        let mut t: RbTree<String, i32> = RbTree::new();
        let h = t.set("k", &1);
        assert_eq!(t.set("k", &2), h);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("k"), Some(&2));
        assert_eq!(t.set_owned("k".to_string(), 3), Some(2));
        t.add("j", &0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    #[should_panic(expected = "already present")]
    fn add_present_key_panics() {
        let mut t: RbTree<String, i32> = RbTree::new();
        t.add("k", &1);
        t.add("k", &2);
    }

    #[test]
    #[should_panic(expected = "not present")]
    fn delete_absent_key_panics() {
        let mut t = tree_of(&[1, 2]);
        t.delete(&3);
    }

    /// Invariant: updating an absent key is a no-op reported as `None`.
    #[test]
    fn replace_only_updates_present_keys() {
        let mut t = tree_of(&[1]);
        assert_eq!(t.replace(&1, &7), Some(10));
        assert_eq!(t.replace(&2, &7), None);
        assert_eq!(t.replace_owned(&2, 9), Err(9));
        assert_eq!(t.replace_owned(&1, 9), Ok(7));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: every deletion case (leaf, one child, two children)
    /// keeps the tree valid.
    #[test]
    fn deletes_preserve_invariants() {
        let all: Vec<i32> = (0..200).map(|i| (i * 37) % 200).collect();
        let mut t = tree_of(&all);
        for k in (0..200).filter(|k| k % 3 == 0) {
            t.delete(&k);
            t.check_invariants();
        }
        let expected: Vec<i32> = (0..200).filter(|k| k % 3 != 0).collect();
        assert_eq!(keys(&t), expected);
        for k in expected {
            assert_eq!(t.remove(&k), Some(k * 10));
            t.check_invariants();
        }
        assert!(t.is_empty());
    }

    /// Invariant: handles of surviving entries stay valid across deletes,
    /// including when the successor node is relocated.
    #[test]
    fn handles_survive_other_deletes() {
        let mut t = tree_of(&[50, 30, 70, 20, 40, 60, 80]);
        let h60 = t.find(&60).unwrap();
        let h50 = t.find(&50).unwrap();
        t.delete(&50);
        assert_eq!(h60.key(&t), Some(&60));
        assert_eq!(h50.key(&t), None);
        *h60.value_mut(&mut t).unwrap() += 1;
        assert_eq!(t.get(&60), Some(&601));
        t.check_invariants();
    }

    #[test]
    fn min_max() {
        let t = tree_of(&[5, 3, 8, 1, 4, 9]);
        assert_eq!(t.min(None).and_then(|h| h.key(&t)), Some(&1));
        assert_eq!(t.max(None).and_then(|h| h.key(&t)), Some(&9));
        let empty: RbTree<i32, i32> = RbTree::new();
        assert_eq!(empty.min(None), None);
    }

    #[test]
    fn traversal_orders() {
        // 2 is the root with children 1 and 3.
        let t = tree_of(&[2, 1, 3]);
        let mut pre = Vec::new();
        t.walk_preorder(|k, _| pre.push(*k));
        let mut ino = Vec::new();
        t.walk_inorder(|k, _| ino.push(*k));
        let mut post = Vec::new();
        t.walk_postorder(|k, _| post.push(*k));
        assert_eq!(pre, vec![2, 1, 3]);
        assert_eq!(ino, vec![1, 2, 3]);
        assert_eq!(post, vec![1, 3, 2]);
    }

    /// Invariant: each traversal visits every node exactly once.
    #[test]
    fn traversals_visit_everything() {
        let t = tree_of(&(0..257).rev().collect::<Vec<_>>());
        let mut pre = 0;
        t.walk_preorder(|_, _| pre += 1);
        let mut post = Vec::new();
        t.walk_postorder(|k, _| post.push(*k));
        assert_eq!(pre, 257);
        post.sort_unstable();
        assert_eq!(post, (0..257).collect::<Vec<_>>());
    }

    #[test]
    fn default_factory_and_custom_order() {
        let mut t: RbTree<i32, i32, _> =
            RbTree::with_options(|a: &i32, b: &i32| b.cmp(a), || 100);
        *t.get_or_insert_default(&1) += 1;
        *t.get_or_insert_default(&1) += 1;
        t.get_or_insert_default(&5);
        assert_eq!(t.get(&1), Some(&102));
        let ks: Vec<i32> = t.iter().map(|(k, _)| *k).collect();
        assert_eq!(ks, vec![5, 1]);
        t.check_invariants();
    }

    /// Invariant: clearing leaves a valid, empty, reusable tree.
    #[test]
    fn clear_twice() {
        let mut t = tree_of(&[1, 2, 3]);
        t.clear();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        t.check_invariants();
        t.set_owned(4, 40);
        assert_eq!(keys(&t), vec![4]);
    }

    #[test]
    fn debug_format() {
        let t = tree_of(&[2, 1]);
        assert_eq!(format!("{t:?}"), "{1: 10, 2: 20}");
    }
}
