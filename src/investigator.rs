/*
 * Copyright (c) 2024, 2025 The matchflow developers
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! Incidence cursors and the handle-based cursor pool.
//!
//! An [`Investigator`] is a resettable cursor over one node's incidence
//! ring. Unlike [`incidences`](crate::traits::GraphTopology::incidences) it
//! does not borrow the graph; every stepping method takes the graph as an
//! argument, so several cursors on different nodes can be interleaved while
//! the caller retains use of the graph in between.
//!
//! [`InvestigatorPool`] hands out cursors by numeric handle for callers
//! that manage cursor lifetimes dynamically. The pool grows monotonically,
//! closed slots are recycled, and only
//! [`release_all`](InvestigatorPool::release_all) shrinks it.

use crate::error::{Error, Result};
use crate::traits::{Arc, GraphTopology, Node};

/// A resettable cursor over one node's incidence ring.
#[derive(Clone, Debug)]
pub struct Investigator {
    first: Option<Arc>,
    cur: Option<Arc>,
}

impl Investigator {
    /// Create a cursor positioned at the first incidence of `v`.
    pub fn new<G: GraphTopology>(g: &G, v: Node) -> Self {
        let first = g.first(v);
        Investigator { first, cur: first }
    }

    /// Rewind the cursor to the first incidence of `v`.
    pub fn reset<G: GraphTopology>(&mut self, g: &G, v: Node) {
        self.first = g.first(v);
        self.cur = self.first;
    }

    /// Whether an unread incidence remains.
    pub fn active(&self) -> bool {
        self.cur.is_some()
    }

    /// Return the current incidence without advancing.
    pub fn peek(&self) -> Option<Arc> {
        self.cur
    }

    /// Return the current incidence and advance past it.
    pub fn read<G: GraphTopology>(&mut self, g: &G) -> Option<Arc> {
        let a = self.cur?;
        let r = g.right(a);
        self.cur = if Some(r) == self.first { None } else { Some(r) };
        Some(a)
    }
}

/// A numeric handle naming a pooled [`Investigator`].
pub type InvestigatorHandle = usize;

/// A pool of investigators addressed by handle.
#[derive(Default)]
pub struct InvestigatorPool {
    slots: Vec<Option<Investigator>>,
    free: Vec<usize>,
}

impl InvestigatorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cursor on the incidences of `v` and return its handle.
    ///
    /// Closed slots are reused before the pool grows.
    pub fn investigate<G: GraphTopology>(&mut self, g: &G, v: Node) -> InvestigatorHandle {
        let inv = Investigator::new(g, v);
        if let Some(h) = self.free.pop() {
            self.slots[h] = Some(inv);
            h
        } else {
            self.slots.push(Some(inv));
            self.slots.len() - 1
        }
    }

    fn slot(&self, h: InvestigatorHandle) -> Result<&Investigator> {
        self.slots
            .get(h)
            .and_then(|s| s.as_ref())
            .ok_or(Error::Rejected("no open investigator for this handle"))
    }

    fn slot_mut(&mut self, h: InvestigatorHandle) -> Result<&mut Investigator> {
        self.slots
            .get_mut(h)
            .and_then(|s| s.as_mut())
            .ok_or(Error::Rejected("no open investigator for this handle"))
    }

    pub fn reset<G: GraphTopology>(
        &mut self,
        h: InvestigatorHandle,
        g: &G,
        v: Node,
    ) -> Result<()> {
        self.slot_mut(h)?.reset(g, v);
        Ok(())
    }

    pub fn active(&self, h: InvestigatorHandle) -> Result<bool> {
        Ok(self.slot(h)?.active())
    }

    pub fn peek(&self, h: InvestigatorHandle) -> Result<Option<Arc>> {
        Ok(self.slot(h)?.peek())
    }

    pub fn read<G: GraphTopology>(
        &mut self,
        h: InvestigatorHandle,
        g: &G,
    ) -> Result<Option<Arc>> {
        Ok(self.slot_mut(h)?.read(g))
    }

    /// Close the cursor behind `h`, making the slot reusable.
    ///
    /// Closing a handle twice is rejected.
    pub fn close(&mut self, h: InvestigatorHandle) -> Result<()> {
        match self.slots.get_mut(h) {
            Some(slot @ Some(_)) => {
                *slot = None;
                self.free.push(h);
                Ok(())
            }
            _ => Err(Error::Rejected("no open investigator for this handle")),
        }
    }

    /// Close all cursors and shrink the pool.
    pub fn release_all(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Investigator, InvestigatorPool};
    use crate::classes;
    use crate::traits::{GraphTopology, Node};

    #[test]
    fn test_cursor_walk() {
        let g = classes::star(4);
        let mut inv = Investigator::new(&g, Node::new(0));
        let mut seen = vec![];
        while inv.active() {
            let a = inv.peek();
            assert_eq!(inv.read(&g), a);
            seen.push(a.unwrap());
        }
        assert_eq!(inv.read(&g), None);
        assert_eq!(seen.len(), 4);
        let ring: Vec<_> = g.incidences(Node::new(0)).collect();
        assert_eq!(seen, ring);

        inv.reset(&g, Node::new(1));
        assert_eq!(inv.read(&g).map(|a| a.pair()), Some(0));
        assert!(!inv.active());
    }

    #[test]
    fn test_pool_handles() {
        let g = classes::path(3);
        let mut pool = InvestigatorPool::new();
        let h1 = pool.investigate(&g, Node::new(1));
        let h2 = pool.investigate(&g, Node::new(0));
        assert_ne!(h1, h2);

        // interleaved reads on independent cursors
        let a = pool.read(h1, &g).unwrap();
        assert!(a.is_some());
        let b = pool.read(h2, &g).unwrap();
        assert!(b.is_some());
        assert!(pool.read(h2, &g).unwrap().is_none());
        assert!(pool.read(h1, &g).unwrap().is_some());

        pool.close(h2).unwrap();
        assert!(pool.close(h2).is_err());
        assert!(pool.active(h2).is_err());

        // the freed slot is reused
        let h3 = pool.investigate(&g, Node::new(2));
        assert_eq!(h3, h2);

        pool.release_all();
        assert!(pool.active(h1).is_err());
    }
}
