//! Vertical scroll position and linked scrolling
//!
//! Each view owns an `Rc<ScrollState>`. Views that scroll together share a
//! [`ScrollGroup`], which only holds weak references, so a view that goes
//! away without unlinking leaves nothing dangling.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a view within scroll groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ViewId(u64);

impl ViewId {
    pub fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Scroll position in virtual lines
#[derive(Debug, Default)]
pub struct ScrollState {
    yoff: Cell<u64>,
    yoff_max: Cell<u64>,
    /// Set when a peer moved this view; cleared by `take_changed`
    changed: Cell<bool>,
}

impl ScrollState {
    pub fn yoff(&self) -> u64 {
        self.yoff.get()
    }

    pub fn yoff_max(&self) -> u64 {
        self.yoff_max.get()
    }

    /// Update the limit, pulling the position back inside it
    pub(crate) fn set_max(&self, max: u64) {
        self.yoff_max.set(max);
        if self.yoff.get() > max {
            self.yoff.set(max);
        }
    }

    /// Set the position, clamped to the limit. Returns whether it moved.
    pub(crate) fn set_yoff(&self, line: u64) -> bool {
        let line = line.min(self.yoff_max.get());
        let moved = line != self.yoff.get();
        self.yoff.set(line);
        moved
    }

    pub fn take_changed(&self) -> bool {
        self.changed.replace(false)
    }
}

/// Registry of views whose vertical scroll positions are kept in step
#[derive(Debug, Clone, Default)]
pub struct ScrollGroup {
    members: Rc<RefCell<Vec<(ViewId, Weak<ScrollState>)>>>,
}

impl ScrollGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, id: ViewId, state: &Rc<ScrollState>) {
        self.members.borrow_mut().push((id, Rc::downgrade(state)));
    }

    /// Insert `id` right after `anchor`, or at the end when `anchor` is not a member
    pub fn insert_after(&self, anchor: ViewId, id: ViewId, state: &Rc<ScrollState>) {
        let mut members = self.members.borrow_mut();
        members.retain(|(member, _)| *member != id);
        let at = members
            .iter()
            .position(|(member, _)| *member == anchor)
            .map_or(members.len(), |i| i + 1);
        members.insert(at, (id, Rc::downgrade(state)));
    }

    pub fn remove(&self, id: ViewId) -> bool {
        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|(member, _)| *member != id);
        members.len() != before
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.members.borrow().iter().any(|(member, _)| *member == id)
    }

    /// Live members in link order
    pub fn members(&self) -> Vec<ViewId> {
        self.members
            .borrow()
            .iter()
            .filter(|(_, state)| state.strong_count() > 0)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &ScrollGroup) -> bool {
        Rc::ptr_eq(&self.members, &other.members)
    }

    /// Move every member except `origin` to `line` (clamped per member).
    /// Each peer is visited exactly once. Returns how many were notified.
    pub fn broadcast(&self, origin: ViewId, line: u64) -> usize {
        let peers: Vec<Rc<ScrollState>> = {
            let mut members = self.members.borrow_mut();
            members.retain(|(_, state)| state.strong_count() > 0);
            members
                .iter()
                .filter(|(id, _)| *id != origin)
                .filter_map(|(_, state)| state.upgrade())
                .collect()
        };

        for peer in &peers {
            if peer.set_yoff(line) {
                peer.changed.set(true);
            }
        }
        tracing::trace!("Scroll broadcast to {} peers: line {}", peers.len(), line);
        peers.len()
    }
}
