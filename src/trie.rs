//! The container: root, element count, and the five core algorithms
//! (insert, exact match, closest match, match-all, clone).
//!
//! Grounded in the teacher's top-level store type (`TreeBitMap` /
//! `local_vec::store::Store` in `src/local_vec/store.rs`), which likewise
//! pairs a root pointer with a running element count and descends the
//! tree iteratively, tracking a parent reference on the stack so a split
//! can redirect the pointer that led to the node being split (Design
//! Note 9) instead of needing back-pointers.

use std::cell::Cell;
use std::rc::Rc;

use log::trace;

use crate::arena::Arena;
use crate::error::{TrieError, TrieResult};
use crate::list::MatchList;
use crate::merge::MergeUpdate;
use crate::node::Node;
use crate::prefix::{extract_bits, first_mismatch, prefix_create, Prefix};

/// A binary radix trie over arbitrary bit-string keys, specialized for
/// longest-prefix matching of IPv4/IPv6 CIDR ranges (§1-§3).
///
/// Not thread-safe (§1 Non-goals): a `Trie` borrows its `Arena` and uses
/// `Cell`/`RefCell` internally, so it is neither `Sync` nor safely usable
/// from more than one thread without external synchronization.
pub struct Trie<'a, T> {
    arena: &'a Arena,
    root: Cell<Option<&'a Node<'a, T>>>,
    count: Cell<usize>,
    on_evict: Option<Rc<dyn Fn(&T)>>,
}

impl<'a, T> Trie<'a, T> {
    /// An empty trie allocating out of `arena`.
    pub fn new(arena: &'a Arena) -> Self {
        Trie {
            arena,
            root: Cell::new(None),
            count: Cell::new(0),
            on_evict: None,
        }
    }

    /// An empty trie that invokes `on_evict` immediately before a stored
    /// payload is displaced by an overwriting insert — the spec's
    /// `free_cb` (§3, §4.3 Case B).
    pub fn with_evict_hook(arena: &'a Arena, on_evict: Rc<dyn Fn(&T)>) -> Self {
        Trie {
            arena,
            root: Cell::new(None),
            count: Cell::new(0),
            on_evict: Some(on_evict),
        }
    }

    /// Number of distinct keys currently holding a payload.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    fn apply_update(&self, node: &Node<'a, T>, data: T)
    where
        T: MergeUpdate,
    {
        let mut slot = node.data.borrow_mut();
        match slot.take() {
            Some(mut existing) => {
                if let Some(hook) = &self.on_evict {
                    hook(&existing);
                }
                existing.merge_update(data);
                *slot = Some(existing);
            }
            None => {
                *slot = Some(data);
                self.count.set(self.count.get() + 1);
            }
        }
    }

    /// Inserts `data` at `key`, per §4.3.
    ///
    /// Idempotent on key: inserting the same key twice never creates a
    /// duplicate node, and leaves `count` unchanged on the second
    /// insert (only the payload updates, via [`MergeUpdate`]).
    pub fn insert(&self, key: Prefix<'a>, data: T) -> TrieResult<()>
    where
        T: MergeUpdate,
    {
        if key.is_empty() {
            return Err(TrieError::InvalidArg);
        }

        let Some(root) = self.root.get() else {
            let leaf = self.arena.alloc(Node::with_edge_and_data(key, Some(data)))?;
            self.root.set(Some(leaf));
            self.count.set(self.count.get() + 1);
            trace!("insert: new root, {} bits", key.len());
            return Ok(());
        };

        let mut node = root;
        let mut parent: Option<(&'a Node<'a, T>, bool)> = None;
        let mut consumed: u16 = 0;

        loop {
            let edge = node.edge;
            let edge_len = edge.len();
            let key_rem = key.len() - consumed;
            let common = first_mismatch(&edge, 0, &key, consumed);

            if common == edge_len && common == key_rem {
                trace!("insert: case B (exact) at {consumed} bits consumed");
                self.apply_update(node, data);
                return Ok(());
            }

            if common == edge_len {
                // Case A: edge is a proper prefix of the remaining key.
                trace!("insert: case A, consuming {edge_len} edge bits");
                consumed += edge_len;
                let b = key.bit_at(consumed);
                match node.child(b) {
                    Some(child) => {
                        parent = Some((node, b));
                        node = child;
                        continue;
                    }
                    None => {
                        let suffix = extract_bits(self.arena, &key, consumed, key.len())?;
                        let leaf =
                            self.arena.alloc(Node::with_edge_and_data(suffix, Some(data)))?;
                        node.set_child(b, leaf);
                        self.count.set(self.count.get() + 1);
                        return Ok(());
                    }
                }
            }

            // common < edge_len: the edge and the remaining key diverge
            // somewhere inside this edge. Split at `common`.
            //
            // Every fallible allocation runs first; `node` itself is not
            // touched until all of them have succeeded, so a mid-split
            // `AllocFailed` leaves `node` exactly as it was (§4.8: a split
            // must be transactional, never observed half-done).
            let i_edge = extract_bits(self.arena, &edge, 0, common)?;
            let m_edge = extract_bits(self.arena, &edge, common, edge_len)?;
            let m = self.arena.alloc(Node::with_edge_and_data(m_edge, None))?;

            let interior: &'a Node<'a, T> = if common == key_rem {
                // Case D: the remaining key is a proper prefix of the edge.
                trace!("insert: case D, split at {common}");
                let i_node = self
                    .arena
                    .alloc(Node::with_edge_and_data(i_edge, Some(data)))?;
                i_node.set_child(m_edge.bit_at(0), m);
                i_node
            } else {
                // Case C: edge and remaining key diverge mid-edge.
                trace!("insert: case C, split at {common}");
                let l_edge = extract_bits(self.arena, &key, consumed + common, key.len())?;
                let l = self.arena.alloc(Node::with_edge_and_data(l_edge, Some(data)))?;
                let i_node = self.arena.alloc(Node::with_edge_and_data(i_edge, None))?;
                i_node.set_child(m_edge.bit_at(0), m);
                i_node.set_child(l_edge.bit_at(0), l);
                i_node
            };

            // Every allocation above succeeded: commit by moving node's
            // state into `m` and splicing `interior` in. Nothing below can
            // fail, so this is the only point where `node` is mutated.
            m.zero.set(node.zero.get());
            m.one.set(node.one.get());
            *m.data.borrow_mut() = node.data.borrow_mut().take();
            debug_assert!(m.is_well_formed());
            debug_assert!(interior.is_well_formed());

            match parent {
                Some((p, slot)) => p.set_child(slot, interior),
                None => self.root.set(Some(interior)),
            }
            self.count.set(self.count.get() + 1);
            return Ok(());
        }
    }

    /// Exact-prefix match (§4.4): succeeds only at the node whose
    /// concatenated edges equal `key` exactly and which carries data.
    pub fn match_exact(&self, key: &Prefix<'a>) -> TrieResult<T>
    where
        T: Clone,
    {
        let Some(mut node) = self.root.get() else {
            return Err(TrieError::NotFound);
        };
        let mut consumed: u16 = 0;

        loop {
            let edge = node.edge;
            let edge_len = edge.len();
            let common = first_mismatch(&edge, 0, key, consumed);
            if common != edge_len {
                return Err(TrieError::NotFound);
            }
            consumed += edge_len;
            if consumed == key.len() {
                return node.data.borrow().clone().ok_or(TrieError::NotFound);
            }
            let b = key.bit_at(consumed);
            match node.child(b) {
                Some(child) => node = child,
                None => return Err(TrieError::NotFound),
            }
        }
    }

    /// Closest-match / longest-prefix match (§4.5): the deepest
    /// data-bearing ancestor whose edges are a bit-prefix of `key`.
    pub fn match_closest(&self, key: &Prefix<'a>) -> TrieResult<T>
    where
        T: Clone,
    {
        let Some(mut node) = self.root.get() else {
            return Err(TrieError::NotFound);
        };
        let mut consumed: u16 = 0;
        let mut best: Option<T> = None;

        loop {
            let edge = node.edge;
            let edge_len = edge.len();
            let common = first_mismatch(&edge, 0, key, consumed);
            if common != edge_len {
                break;
            }
            consumed += edge_len;
            if let Some(d) = node.data.borrow().clone() {
                best = Some(d);
            }
            if consumed >= key.len() {
                break;
            }
            let b = key.bit_at(consumed);
            match node.child(b) {
                Some(child) => node = child,
                None => break,
            }
        }

        best.ok_or(TrieError::NotFound)
    }

    /// Returns every stored payload whose key is extensionally matched by
    /// `key`, interpreted as a network prefix (§4.6).
    pub fn match_all(&self, key: &Prefix<'a>) -> TrieResult<MatchList<T>>
    where
        T: Clone,
    {
        let Some(mut node) = self.root.get() else {
            return if key.is_empty() {
                Ok(MatchList::new())
            } else {
                Err(TrieError::NotFound)
            };
        };
        let mut consumed: u16 = 0;

        loop {
            let edge = node.edge;
            let edge_len = edge.len();
            let key_rem = key.len() - consumed;
            let common = first_mismatch(&edge, 0, key, consumed);

            if common < key_rem && common < edge_len {
                return Err(TrieError::NotFound);
            }

            if common == key_rem {
                let mut out = MatchList::new();
                collect_subtree(node, &mut out);
                return Ok(out);
            }

            // common == edge_len < key_rem: fully consumed this edge.
            consumed += edge_len;
            let b = key.bit_at(consumed);
            match node.child(b) {
                Some(child) => node = child,
                None => return Err(TrieError::NotFound),
            }
        }
    }

    /// Produces a structurally identical trie allocated entirely in
    /// `dst_arena` (§4.7). `src` may be dropped afterwards without
    /// affecting the clone.
    pub fn clone_into<'b>(&self, dst_arena: &'b Arena) -> TrieResult<Trie<'b, T>>
    where
        T: Clone,
    {
        let new_root = match self.root.get() {
            Some(r) => Some(clone_node(dst_arena, r)?),
            None => None,
        };
        Ok(Trie {
            arena: dst_arena,
            root: Cell::new(new_root),
            count: Cell::new(self.count.get()),
            on_evict: self.on_evict.clone(),
        })
    }

    /// A depth-first, indented dump of every stored key and payload.
    /// Stands in for the spec's `print_cb`: idiomatic Rust asks for a
    /// trait bound (`T: Debug`) on the one method that needs it instead
    /// of a callback stored on every trie (Design Note 9).
    pub fn dump(&self) -> String
    where
        T: std::fmt::Debug,
    {
        let mut out = String::new();
        if let Some(root) = self.root.get() {
            dump_node(root, 0, &mut out);
        }
        out
    }
}

fn collect_subtree<'a, T: Clone>(node: &'a Node<'a, T>, out: &mut MatchList<T>) {
    if let Some(d) = node.data.borrow().clone() {
        out.push(d);
    }
    if let Some(z) = node.zero.get() {
        collect_subtree(z, out);
    }
    if let Some(o) = node.one.get() {
        collect_subtree(o, out);
    }
}

fn clone_node<'a, 'b, T: Clone>(
    dst: &'b Arena,
    src: &'a Node<'a, T>,
) -> TrieResult<&'b Node<'b, T>> {
    let edge = src.edge;
    let nbytes = (edge.len() as usize + 7) / 8;
    let new_edge = prefix_create(dst, &edge.as_bytes()[..nbytes], edge.len())?;
    let data = src.data.borrow().clone();
    let new_node = dst.alloc(Node::with_edge_and_data(new_edge, data))?;
    if let Some(z) = src.zero.get() {
        new_node.zero.set(Some(clone_node(dst, z)?));
    }
    if let Some(o) = src.one.get() {
        new_node.one.set(Some(clone_node(dst, o)?));
    }
    Ok(new_node)
}

fn dump_node<T: std::fmt::Debug>(node: &Node<'_, T>, depth: usize, out: &mut String) {
    use std::fmt::Write;
    let indent = "  ".repeat(depth);
    let _ = match &*node.data.borrow() {
        Some(d) => writeln!(out, "{indent}edge len={} data={:?}", node.edge.len(), d),
        None => writeln!(out, "{indent}edge len={}", node.edge.len()),
    };
    if let Some(z) = node.zero.get() {
        dump_node(z, depth + 1, out);
    }
    if let Some(o) = node.one.get() {
        dump_node(o, depth + 1, out);
    }
}
