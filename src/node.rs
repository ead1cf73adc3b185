//! Trie vertices.
//!
//! A non-root node is reached from its parent by consuming `edge`'s bits;
//! the first bit of `edge` always matches the child slot it was reached
//! through (§3, Node invariant 2). Children are arena references behind
//! `Cell` rather than `&mut` — the classic bump-arena-tree shape (Design
//! Note 9: "arena + pointers... Splits are performed by the descent
//! routine, which retains the parent pointer on the stack"): `bumpalo`
//! hands out `&'a mut T` only at the moment of allocation, so once a node
//! is wired into the tree it is only ever touched through shared
//! references, and `Cell`/`RefCell` provide the interior mutability
//! needed to attach children or replace a payload later.

use std::cell::{Cell, RefCell};

use crate::prefix::Prefix;

pub struct Node<'a, T> {
    pub(crate) edge: Prefix<'a>,
    pub(crate) zero: Cell<Option<&'a Node<'a, T>>>,
    pub(crate) one: Cell<Option<&'a Node<'a, T>>>,
    pub(crate) data: RefCell<Option<T>>,
}

impl<'a, T> Node<'a, T> {
    /// Constructs a node directly, the way every node in the trie is
    /// actually built: `edge` and an optional initial payload are known
    /// up front, so there's no need to mutate `edge` in place afterwards
    /// (it never changes once a node exists — splits replace a node
    /// wholesale rather than editing its edge).
    pub(crate) fn with_edge_and_data(edge: Prefix<'a>, data: Option<T>) -> Self {
        Node {
            edge,
            zero: Cell::new(None),
            one: Cell::new(None),
            data: RefCell::new(data),
        }
    }

    pub(crate) fn child(&self, bit: bool) -> Option<&'a Node<'a, T>> {
        if bit {
            self.one.get()
        } else {
            self.zero.get()
        }
    }

    pub(crate) fn set_child(&self, bit: bool, node: &'a Node<'a, T>) {
        if bit {
            self.one.set(Some(node));
        } else {
            self.zero.set(Some(node));
        }
    }

    /// A node with neither children nor data must never exist (§3,
    /// invariant 3); exposed so `trie.rs` can assert it in tests and
    /// debug builds rather than just in prose.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.zero.get().is_some() || self.one.get().is_some() || self.data.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn fresh_node_has_no_children_or_data() {
        let arena = Arena::new();
        let edge = Prefix::from_raw(&[], 0);
        let n: &Node<'_, u32> = arena.alloc(Node::with_edge_and_data(edge, None)).unwrap();
        assert!(n.zero.get().is_none());
        assert!(n.one.get().is_none());
        assert!(n.data.borrow().is_none());
        assert!(!n.is_well_formed());
    }

    #[test]
    fn node_with_data_is_well_formed() {
        let arena = Arena::new();
        let edge = Prefix::from_raw(&[], 0);
        let n: &Node<'_, u32> = arena
            .alloc(Node::with_edge_and_data(edge, Some(7)))
            .unwrap();
        assert!(n.is_well_formed());
    }
}
