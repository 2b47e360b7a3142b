// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-target listener storage.
//!
//! Each event type owns a singly linked list of [`ListenerNode`]s in insertion order.
//! Lists tolerate mutation while a [`Cursor`] walks them:
//!
//! - Removal unlinks a node from its predecessor and marks it `REMOVED`, but leaves the
//!   node's own `next` link untouched. A cursor parked on a removed node still reaches
//!   every later live node, and skips nodes that carry the flag.
//! - Every node carries a sequence number. A cursor stops at the first node whose number
//!   is at or past the value captured when it was created, so nodes appended during a
//!   walk are not visited by it.
//!
//! Lists are created on first insertion and kept when they become empty.

use core::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::listener::Listener;
use crate::signal::{AbortSignal, AlgorithmId};
use crate::types::{EventType, ListenerKind};

bitflags::bitflags! {
    /// Per-entry flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub(crate) struct ListenerFlags: u8 {
        /// Remove before the first invocation.
        const ONCE = 1 << 0;
        /// `preventDefault()` is ignored during invocation.
        const PASSIVE = 1 << 1;
        /// No longer in the list.
        const REMOVED = 1 << 2;
    }
}

/// One registration.
pub(crate) struct ListenerNode {
    listener: Listener,
    kind: ListenerKind,
    seq: u64,
    flags: Cell<ListenerFlags>,
    signal: RefCell<Option<(AbortSignal, AlgorithmId)>>,
    next: RefCell<Option<Rc<Self>>>,
}

impl ListenerNode {
    pub(crate) fn listener(&self) -> &Listener {
        &self.listener
    }

    pub(crate) fn kind(&self) -> ListenerKind {
        self.kind
    }

    pub(crate) fn is_once(&self) -> bool {
        self.flags.get().contains(ListenerFlags::ONCE)
    }

    pub(crate) fn is_passive(&self) -> bool {
        self.flags.get().contains(ListenerFlags::PASSIVE)
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.flags.get().contains(ListenerFlags::REMOVED)
    }

    fn matches(&self, listener: &Listener, kind: ListenerKind) -> bool {
        self.kind == kind && self.listener.same(listener)
    }

    fn next(&self) -> Option<Rc<Self>> {
        self.next.borrow().clone()
    }

    /// Records the abort subscription that removes this entry.
    pub(crate) fn set_signal(&self, signal: AbortSignal, id: AlgorithmId) {
        *self.signal.borrow_mut() = Some((signal, id));
    }

    /// Returns `true` if this entry is subscribed to `signal`.
    pub(crate) fn has_signal(&self, signal: &AbortSignal) -> bool {
        self.signal
            .borrow()
            .as_ref()
            .is_some_and(|(s, _)| s.ptr_eq(signal))
    }

    /// Drops the abort subscription, if any.
    pub(crate) fn release_signal(&self) {
        let subscription = self.signal.borrow_mut().take();
        if let Some((signal, id)) = subscription {
            signal.remove_algorithm(id);
        }
    }
}

impl core::fmt::Debug for ListenerNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerNode")
            .field("kind", &self.kind)
            .field("seq", &self.seq)
            .field("flags", &self.flags.get())
            .finish_non_exhaustive()
    }
}

impl Drop for ListenerNode {
    // Unlink iteratively so long chains do not recurse on drop.
    fn drop(&mut self) {
        let mut next = self.next.get_mut().take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.next.get_mut().take(),
                Err(_) => break,
            }
        }
    }
}

#[derive(Debug, Default)]
struct ListenerList {
    head: Option<Rc<ListenerNode>>,
    tail: Option<Rc<ListenerNode>>,
    len: usize,
}

impl ListenerList {
    fn iter(&self) -> impl Iterator<Item = Rc<ListenerNode>> {
        core::iter::successors(self.head.clone(), |node| node.next())
    }

    fn find(&self, listener: &Listener, kind: ListenerKind) -> Option<Rc<ListenerNode>> {
        self.iter().find(|node| node.matches(listener, kind))
    }

    fn push(&mut self, node: Rc<ListenerNode>) {
        match self.tail.replace(node.clone()) {
            Some(tail) => *tail.next.borrow_mut() = Some(node),
            None => self.head = Some(node),
        }
        self.len += 1;
    }

    fn unlink_where(
        &mut self,
        mut pred: impl FnMut(&ListenerNode) -> bool,
    ) -> Option<Rc<ListenerNode>> {
        let mut prev: Option<Rc<ListenerNode>> = None;
        let mut cur = self.head.clone();
        while let Some(node) = cur {
            if pred(&node) {
                let next = node.next();
                if next.is_none() {
                    self.tail = prev.clone();
                }
                match &prev {
                    Some(prev) => *prev.next.borrow_mut() = next,
                    None => self.head = next,
                }
                node.flags.set(node.flags.get() | ListenerFlags::REMOVED);
                self.len -= 1;
                return Some(node);
            }
            cur = node.next();
            prev = Some(node);
        }
        None
    }
}

/// Walks one list as it was when the cursor was created.
#[derive(Debug)]
pub(crate) struct Cursor {
    head: Option<Rc<ListenerNode>>,
    last: Option<Rc<ListenerNode>>,
    limit: u64,
}

impl Iterator for Cursor {
    type Item = Rc<ListenerNode>;

    fn next(&mut self) -> Option<Self::Item> {
        // The successor is read only now, after the previous entry has run.
        let mut candidate = match self.last.take() {
            Some(last) => last.next(),
            None => self.head.take(),
        };
        while let Some(node) = candidate {
            if node.seq >= self.limit {
                return None;
            }
            if !node.is_removed() {
                self.last = Some(node.clone());
                return Some(node);
            }
            candidate = node.next();
        }
        None
    }
}

/// All listener lists of one target.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    lists: HashMap<EventType, ListenerList>,
    next_seq: u64,
}

impl Registry {
    pub(crate) fn find(
        &self,
        ty: &str,
        listener: &Listener,
        kind: ListenerKind,
    ) -> Option<Rc<ListenerNode>> {
        self.lists.get(ty)?.find(listener, kind)
    }

    /// Appends a new entry. The caller has already checked for duplicates.
    pub(crate) fn insert(
        &mut self,
        ty: EventType,
        listener: Listener,
        kind: ListenerKind,
        flags: ListenerFlags,
    ) -> Rc<ListenerNode> {
        let node = Rc::new(ListenerNode {
            listener,
            kind,
            seq: self.next_seq,
            flags: Cell::new(flags - ListenerFlags::REMOVED),
            signal: RefCell::new(None),
            next: RefCell::new(None),
        });
        self.next_seq += 1;
        self.lists.entry(ty).or_default().push(node.clone());
        node
    }

    /// Unlinks the first entry matching `(listener, kind)`.
    pub(crate) fn remove(
        &mut self,
        ty: &str,
        listener: &Listener,
        kind: ListenerKind,
    ) -> Option<Rc<ListenerNode>> {
        self.lists
            .get_mut(ty)?
            .unlink_where(|node| node.matches(listener, kind))
    }

    /// Unlinks `node` if it is still in the list for `ty`.
    pub(crate) fn remove_node(&mut self, ty: &str, node: &Rc<ListenerNode>) -> bool {
        if node.is_removed() {
            return false;
        }
        self.lists
            .get_mut(ty)
            .and_then(|list| list.unlink_where(|n| core::ptr::eq(n, &**node)))
            .is_some()
    }

    /// A cursor over the current entries for `ty`, or `None` if no list was ever created.
    pub(crate) fn cursor(&self, ty: &str) -> Option<Cursor> {
        let list = self.lists.get(ty)?;
        Some(Cursor {
            head: list.head.clone(),
            last: None,
            limit: self.next_seq,
        })
    }

    /// Number of live entries for `ty`, or across all types.
    pub(crate) fn count(&self, ty: Option<&str>) -> usize {
        match ty {
            Some(ty) => self.lists.get(ty).map_or(0, |list| list.len),
            None => self.lists.values().map(|list| list.len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::Callback;

    fn listener() -> Listener {
        Listener::Function(Callback::new(|_| Ok(())))
    }

    fn seqs(cursor: Cursor) -> Vec<u64> {
        cursor.map(|node| node.seq).collect()
    }

    #[test]
    fn insertion_order_across_kinds() {
        let mut reg = Registry::default();
        let a = listener();
        reg.insert("foo".into(), a.clone(), ListenerKind::Bubble, ListenerFlags::empty());
        reg.insert("foo".into(), a.clone(), ListenerKind::Capture, ListenerFlags::empty());
        reg.insert("foo".into(), listener(), ListenerKind::Bubble, ListenerFlags::empty());
        let order: Vec<_> = reg.cursor("foo").unwrap().map(|n| n.kind()).collect();
        assert_eq!(
            order,
            [ListenerKind::Bubble, ListenerKind::Capture, ListenerKind::Bubble]
        );
        assert_eq!(reg.count(Some("foo")), 3);
        assert_eq!(reg.count(None), 3);
    }

    #[test]
    fn removal_keeps_cursor_on_track() {
        let mut reg = Registry::default();
        let ls: Vec<_> = (0..4).map(|_| listener()).collect();
        for l in &ls {
            reg.insert("foo".into(), l.clone(), ListenerKind::Bubble, ListenerFlags::empty());
        }
        let mut cursor = reg.cursor("foo").unwrap();
        let first = cursor.next().unwrap();
        assert_eq!(first.seq, 0);
        // Remove the current entry and its successor while parked on the current one.
        assert!(reg.remove("foo", &ls[0], ListenerKind::Bubble).is_some());
        assert!(reg.remove("foo", &ls[1], ListenerKind::Bubble).is_some());
        assert_eq!(seqs(cursor), [2, 3]);
        assert_eq!(reg.count(Some("foo")), 2);
    }

    #[test]
    fn appended_entries_are_not_visited() {
        let mut reg = Registry::default();
        reg.insert("foo".into(), listener(), ListenerKind::Bubble, ListenerFlags::empty());
        reg.insert("foo".into(), listener(), ListenerKind::Bubble, ListenerFlags::empty());
        let mut cursor = reg.cursor("foo").unwrap();
        assert!(cursor.next().is_some());
        reg.insert("foo".into(), listener(), ListenerKind::Bubble, ListenerFlags::empty());
        assert_eq!(seqs(cursor), [1]);
        assert_eq!(seqs(reg.cursor("foo").unwrap()), [0, 1, 2]);
    }

    #[test]
    fn empty_lists_persist() {
        let mut reg = Registry::default();
        assert!(reg.cursor("foo").is_none());
        let l = listener();
        let node = reg.insert("foo".into(), l.clone(), ListenerKind::Bubble, ListenerFlags::ONCE);
        assert!(node.is_once());
        assert!(reg.remove_node("foo", &node));
        assert!(node.is_removed());
        assert!(!reg.remove_node("foo", &node), "already unlinked");
        assert!(reg.find("foo", &l, ListenerKind::Bubble).is_none());
        assert_eq!(reg.count(Some("foo")), 0);
        assert!(reg.cursor("foo").is_some(), "the list outlives its last entry");
    }

    #[test]
    fn long_chains_drop_without_recursion() {
        let mut reg = Registry::default();
        let f = listener();
        for _ in 0..100_000 {
            reg.insert("foo".into(), f.clone(), ListenerKind::Bubble, ListenerFlags::empty());
        }
        drop(reg);
    }
}
