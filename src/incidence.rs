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

//! Raw incidence-list storage.
//!
//! This is the index-level substrate under the sparse graph backend. It
//! knows nothing about attributes or partitions; it maintains, per arc
//! half, the start node and the successor in the start node's circular
//! incidence ring, plus each node's entry point into its ring.
//!
//! Array layout per arc pair `k`: half `2k` is the forward direction,
//! half `2k + 1` the backward direction. A cancelled pair keeps its slots
//! but has the start nodes of both halves set to [`NO_INDEX`] until a
//! compaction pass reclaims the slots.
//!
//! The reverse (`left`) pointers are derived data: they are built in one
//! pass on first use and dropped again by any structural mutation.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Sentinel index meaning "no node", "no arc" or "cancelled".
pub(crate) const NO_INDEX: u32 = u32::MAX;

/// Circular singly-linked incidence rings over flat arrays.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub(crate) struct IncidenceStore {
    /// Start node per arc half, `NO_INDEX` for cancelled pairs.
    sn: Vec<u32>,
    /// Ring successor per arc half.
    right: Vec<u32>,
    /// Entry into each node's ring, `NO_INDEX` for isolated nodes.
    first: Vec<u32>,
    /// Lazily built ring predecessors.
    #[cfg_attr(feature = "serialize", serde(skip))]
    left: Option<Vec<u32>>,
}

impl IncidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize, m: usize) -> Self {
        IncidenceStore {
            sn: Vec::with_capacity(2 * m),
            right: Vec::with_capacity(2 * m),
            first: Vec::with_capacity(n),
            left: None,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.first.len()
    }

    pub fn num_pairs(&self) -> usize {
        self.sn.len() / 2
    }

    /// Start node of half `h`, `NO_INDEX` if the pair is cancelled.
    pub fn start(&self, h: u32) -> u32 {
        self.sn[h as usize]
    }

    pub fn first_of(&self, v: u32) -> u32 {
        self.first[v as usize]
    }

    pub fn right_of(&self, h: u32) -> u32 {
        self.right[h as usize]
    }

    /// Ring predecessor of half `h`.
    ///
    /// The first call after a mutation rebuilds the reverse map in one
    /// pass over all halves; subsequent calls are O(1).
    pub fn left_of(&mut self, h: u32) -> u32 {
        if self.left.is_none() {
            let mut left = vec![NO_INDEX; self.sn.len()];
            for i in 0..self.sn.len() {
                if self.sn[i] != NO_INDEX {
                    left[self.right[i] as usize] = i as u32;
                }
            }
            self.left = Some(left);
        }
        self.left.as_ref().unwrap()[h as usize]
    }

    pub fn is_cancelled(&self, pair: u32) -> bool {
        self.sn[(2 * pair) as usize] == NO_INDEX
    }

    fn touch(&mut self) {
        self.left = None;
    }

    pub fn insert_node(&mut self) -> u32 {
        self.first.push(NO_INDEX);
        self.first.len() as u32 - 1
    }

    /// Remove the last node, which must be isolated.
    pub fn pop_node(&mut self) {
        debug_assert_eq!(self.first.last(), Some(&NO_INDEX));
        self.first.pop();
    }

    /// Append a new arc pair joining `u` and `v` and return its pair index.
    ///
    /// Both halves are spliced in right after their node's current first
    /// incidence, so rings grow without any walk.
    pub fn insert_arc(&mut self, u: u32, v: u32) -> u32 {
        let h = self.sn.len() as u32;
        self.sn.push(u);
        self.sn.push(v);
        self.right.push(NO_INDEX);
        self.right.push(NO_INDEX);
        self.link(h, u);
        self.link(h + 1, v);
        self.touch();
        h >> 1
    }

    fn link(&mut self, h: u32, v: u32) {
        let f = self.first[v as usize];
        if f == NO_INDEX {
            self.first[v as usize] = h;
            self.right[h as usize] = h;
        } else {
            self.right[h as usize] = self.right[f as usize];
            self.right[f as usize] = h;
        }
    }

    /// Splice both halves of `pair` out of their rings and mark the pair
    /// cancelled. The slots stay allocated until a compaction pass.
    pub fn cancel_arc(&mut self, pair: u32) {
        let h = 2 * pair;
        self.unlink(h);
        self.unlink(h + 1);
        self.sn[h as usize] = NO_INDEX;
        self.sn[(h + 1) as usize] = NO_INDEX;
        self.touch();
    }

    fn unlink(&mut self, h: u32) {
        let v = self.sn[h as usize] as usize;
        if self.right[h as usize] == h {
            self.first[v] = NO_INDEX;
        } else {
            let mut p = h;
            while self.right[p as usize] != h {
                p = self.right[p as usize];
            }
            self.right[p as usize] = self.right[h as usize];
            if self.first[v] == h {
                self.first[v] = self.right[h as usize];
            }
        }
    }

    /// Exchange the identities of the pairs of halves `x` and `y`: `x`
    /// takes `y`'s place in the index space and vice versa, with the
    /// reverse halves following along. Neighboring ring pointers and
    /// `first` entries are relinked.
    ///
    /// Returns whether the implicit orientation of the pairs flipped,
    /// i.e. whether a forward half was exchanged with a backward one.
    pub fn swap_arcs(&mut self, x: u32, y: u32) -> bool {
        if x == y {
            return false;
        }
        debug_assert_ne!(x >> 1, y >> 1);
        let ids = [x, x ^ 1, y, y ^ 1];
        let map = |h: u32| -> u32 {
            if h == x {
                y
            } else if h == y {
                x
            } else if h == (x ^ 1) {
                y ^ 1
            } else if h == (y ^ 1) {
                x ^ 1
            } else {
                h
            }
        };

        // Snapshot rows, external predecessors and first-pointer hits
        // before touching anything.
        let old_sn = [
            self.sn[ids[0] as usize],
            self.sn[ids[1] as usize],
            self.sn[ids[2] as usize],
            self.sn[ids[3] as usize],
        ];
        let old_right = [
            self.right[ids[0] as usize],
            self.right[ids[1] as usize],
            self.right[ids[2] as usize],
            self.right[ids[3] as usize],
        ];
        let mut preds = [NO_INDEX; 4];
        let mut first_hits = [NO_INDEX; 4];
        for i in 0..4 {
            let h = ids[i];
            let v = old_sn[i];
            if v == NO_INDEX {
                continue;
            }
            let mut p = h;
            while self.right[p as usize] != h {
                p = self.right[p as usize];
            }
            preds[i] = p;
            if self.first[v as usize] == h {
                first_hits[i] = v;
            }
        }

        // Move the four rows to their mapped slots, remapping successors.
        for i in 0..4 {
            let m = map(ids[i]) as usize;
            self.sn[m] = old_sn[i];
            self.right[m] = if old_sn[i] == NO_INDEX {
                old_right[i]
            } else {
                map(old_right[i])
            };
        }

        // Relink predecessors outside the moved set.
        for i in 0..4 {
            let p = preds[i];
            if p != NO_INDEX && !ids.contains(&p) {
                self.right[p as usize] = map(ids[i]);
            }
        }
        for i in 0..4 {
            let v = first_hits[i];
            if v != NO_INDEX {
                self.first[v as usize] = map(ids[i]);
            }
        }

        self.touch();
        (x ^ y) & 1 == 1
    }

    /// Exchange the identities of nodes `u` and `v`.
    pub fn swap_nodes(&mut self, u: u32, v: u32) {
        if u == v {
            return;
        }
        // Relabel the start nodes around both rings, then swap the ring
        // entry points.
        for w in [u, v].iter().cloned() {
            let f = self.first[w as usize];
            if f == NO_INDEX {
                continue;
            }
            let other = u + v - w;
            let mut h = f;
            loop {
                self.sn[h as usize] = other;
                h = self.right[h as usize];
                if h == f {
                    break;
                }
            }
        }
        self.first.swap(u as usize, v as usize);
        // sn now labels u's old ring with v and vice versa, but first was
        // swapped too, so each entry point matches its relabeled ring.
        self.touch();
    }

    /// Move all incidences of `v` to `u`, leaving `v` isolated.
    pub fn merge_rings(&mut self, u: u32, v: u32) {
        let fv = self.first[v as usize];
        if fv == NO_INDEX {
            return;
        }
        let mut h = fv;
        loop {
            self.sn[h as usize] = u;
            h = self.right[h as usize];
            if h == fv {
                break;
            }
        }
        let fu = self.first[u as usize];
        if fu == NO_INDEX {
            self.first[u as usize] = fv;
        } else {
            // Splice v's ring in after u's first incidence.
            let mut lv = fv;
            while self.right[lv as usize] != fv {
                lv = self.right[lv as usize];
            }
            self.right[lv as usize] = self.right[fu as usize];
            self.right[fu as usize] = fv;
        }
        self.first[v as usize] = NO_INDEX;
        self.touch();
    }

    /// Drop all pairs with index `>= pairs`, which must all be cancelled.
    pub fn truncate_arcs(&mut self, pairs: usize) {
        debug_assert!(self.sn[2 * pairs..].iter().all(|&s| s == NO_INDEX));
        self.sn.truncate(2 * pairs);
        self.right.truncate(2 * pairs);
        self.touch();
    }
}
