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

//! The sparse incidence-list graph backend.
//!
//! [`SparseDigraph`] composes the raw incidence store with the attribute
//! pools and layout data, and provides the full node/arc lifecycle:
//! insertion, cancellation, compacting deletion, contraction and node
//! identification. Node and arc pair indices stay dense; a deletion
//! relabels at most one other index (the formerly last one).
//!
//! Adjacency queries and degree sums are served from lazily built caches.
//! All lazy rebuilds happen behind `&mut self`, so a shared reference is
//! genuinely read-only; there is no interior mutability. The graph is not
//! safe for concurrent mutation.
//!
//! `F` is the flow scalar (capacities, subgraph multiplicities, demands),
//! `C` the cost scalar (lengths, potentials, distances).

use crate::attributes::Attribute;
use crate::error::{Error, Result};
use crate::incidence::{IncidenceStore, NO_INDEX};
use crate::num::traits::NumAssign;
use crate::traits::{Arc, GraphAttributes, GraphTopology, Indexable, Node, Orientation};

use std::collections::HashMap;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// How [`SparseDigraph::adjacency`] locates an arc between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdjacencyMethod {
    /// Build (once) and query a hash table over all arc halves. Amortizes
    /// against repeated queries; invalidated by structural change.
    Matrix,
    /// Walk the incidence ring of the first endpoint, O(degree).
    Search,
}

fn magnitude<F: NumAssign + Ord + Copy>(x: F) -> F {
    if x < F::zero() {
        F::zero() - x
    } else {
        x
    }
}

/// A mutable graph over circular incidence lists.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serialize",
    serde(bound(
        serialize = "F: serde::Serialize, C: serde::Serialize",
        deserialize = "F: serde::Deserialize<'de>, C: serde::Deserialize<'de>"
    ))
)]
#[derive(Clone, Debug)]
pub struct SparseDigraph<F = i32, C = i32> {
    inc: IncidenceStore,

    // arc pools, indexed by pair
    ucap: Attribute<F>,
    lcap: Attribute<F>,
    sub: Attribute<F>,
    length: Attribute<C>,
    orientation: Attribute<Orientation>,
    edge_colour: Attribute<u32>,
    ctrl: Attribute<Vec<(f64, f64)>>,

    // node pools
    demand: Attribute<F>,
    node_colour: Attribute<u32>,
    pi: Attribute<C>,
    pred: Attribute<u32>,
    dist: Attribute<C>,
    coord_x: Attribute<f64>,
    coord_y: Attribute<f64>,

    exterior: Option<Arc>,

    #[cfg_attr(feature = "serialize", serde(skip))]
    adj: Option<HashMap<(u32, u32), u32>>,
    #[cfg_attr(feature = "serialize", serde(skip))]
    degs: Option<Vec<F>>,
    #[cfg_attr(feature = "serialize", serde(skip))]
    indegs: Option<Vec<F>>,
    #[cfg_attr(feature = "serialize", serde(skip))]
    outdegs: Option<Vec<F>>,
}

impl<F, C> Default for SparseDigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F, C> SparseDigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    pub fn new() -> Self {
        Self::from_store(IncidenceStore::new())
    }

    /// Create an empty graph with reserved space for `n` nodes and `m`
    /// arc pairs.
    pub fn with_capacity(n: usize, m: usize) -> Self {
        Self::from_store(IncidenceStore::with_capacity(n, m))
    }

    fn from_store(inc: IncidenceStore) -> Self {
        SparseDigraph {
            inc,
            ucap: Attribute::Unset,
            lcap: Attribute::Unset,
            sub: Attribute::Unset,
            length: Attribute::Unset,
            orientation: Attribute::Unset,
            edge_colour: Attribute::Unset,
            ctrl: Attribute::Unset,
            demand: Attribute::Unset,
            node_colour: Attribute::Unset,
            pi: Attribute::Unset,
            pred: Attribute::Unset,
            dist: Attribute::Unset,
            coord_x: Attribute::Unset,
            coord_y: Attribute::Unset,
            exterior: None,
            adj: None,
            degs: None,
            indegs: None,
            outdegs: None,
        }
    }

    fn check_node(&self, v: Node) -> Result<()> {
        if v.index() < self.inc.num_nodes() {
            Ok(())
        } else {
            Err(Error::NoSuchNode(v.index()))
        }
    }

    fn check_arc(&self, a: Arc) -> Result<()> {
        if a.pair() < self.inc.num_pairs() {
            Ok(())
        } else {
            Err(Error::NoSuchArc(a.index()))
        }
    }

    fn invalidate_adj(&mut self) {
        self.adj = None;
    }

    fn invalidate_degrees(&mut self) {
        self.degs = None;
        self.indegs = None;
        self.outdegs = None;
    }

    /// Append a new node and return it.
    pub fn insert_node(&mut self) -> Node {
        let n = self.inc.num_nodes();
        self.inc.insert_node();
        self.demand.push(F::zero(), n, F::zero());
        self.node_colour.push(NO_INDEX, n, NO_INDEX);
        self.pi.push(C::zero(), n, C::zero());
        self.pred.push(NO_INDEX, n, NO_INDEX);
        self.dist.push(C::zero(), n, C::zero());
        self.coord_x.push(0.0, n, 0.0);
        self.coord_y.push(0.0, n, 0.0);
        if let Some(degs) = self.degs.as_mut() {
            degs.push(F::zero());
        }
        if let Some(d) = self.indegs.as_mut() {
            d.push(F::zero());
        }
        if let Some(d) = self.outdegs.as_mut() {
            d.push(F::zero());
        }
        Node::new(n)
    }

    /// Insert an arc pair from `u` to `v` with default attributes
    /// (capacity 1, lower bound 0, length 0, directed).
    pub fn insert_arc(&mut self, u: Node, v: Node) -> Result<Arc> {
        self.insert_arc_with(u, v, F::one(), C::zero(), F::zero())
    }

    /// Insert an arc pair from `u` to `v` with the given upper capacity,
    /// length and lower capacity.
    ///
    /// Validation happens before anything is linked: a failed insertion
    /// leaves the graph untouched.
    pub fn insert_arc_with(&mut self, u: Node, v: Node, ucap: F, length: C, lcap: F) -> Result<Arc> {
        self.check_node(u)?;
        self.check_node(v)?;
        let m = self.inc.num_pairs();
        let pair = self.inc.insert_arc(u.0, v.0) as usize;
        self.ucap.push(ucap, m, F::one());
        self.lcap.push(lcap, m, F::zero());
        self.sub.push(F::zero(), m, F::zero());
        self.length.push(length, m, C::zero());
        self.orientation
            .push(Orientation::Directed, m, Orientation::Directed);
        self.edge_colour.push(NO_INDEX, m, NO_INDEX);
        self.ctrl.push(Vec::new(), m, Vec::new());
        self.invalidate_adj();
        Ok(Arc::forward(pair))
    }

    /// Splice both halves of `a`'s pair out of their incidence rings.
    ///
    /// The pair's flow is returned to zero first (adjusting the degree
    /// caches) and its index stays allocated until a compaction pass.
    pub fn cancel_arc(&mut self, a: Arc) -> Result<()> {
        self.check_arc(a)?;
        let pair = a.pair();
        if self.inc.is_cancelled(pair as u32) {
            return Err(Error::Rejected("arc is already cancelled"));
        }
        let old = self.sub.value(pair, F::zero());
        if old != F::zero() {
            self.adjust_degrees(pair, old, F::zero());
            self.sub.set(pair, F::zero(), self.inc.num_pairs(), F::zero());
        }
        if let Some(x) = self.exterior {
            if x.pair() == pair {
                self.exterior = None;
            }
        }
        self.inc.cancel_arc(pair as u32);
        self.invalidate_adj();
        Ok(())
    }

    /// Delete the pair of `a` and compact: the formerly last pair takes
    /// over its index. The arc is cancelled first if still routed.
    pub fn delete_arc(&mut self, a: Arc) -> Result<()> {
        self.check_arc(a)?;
        if !self.inc.is_cancelled(a.pair() as u32) {
            self.cancel_arc(a)?;
        }
        let last = self.inc.num_pairs() - 1;
        if a.pair() != last {
            self.swap_arc_halves(Arc::forward(a.pair()), Arc::forward(last));
        }
        self.truncate_arc_pools(last);
        Ok(())
    }

    /// Compact away all cancelled pairs at once.
    pub fn delete_arcs(&mut self) {
        let mut last = self.inc.num_pairs();
        let mut k = 0;
        while k < last {
            if self.inc.is_cancelled(k as u32) {
                last -= 1;
                if k < last {
                    self.swap_arc_halves(Arc::forward(k), Arc::forward(last));
                }
                // the slot now holds the old tail pair, re-examine it
            } else {
                k += 1;
            }
        }
        self.truncate_arc_pools(last);
    }

    fn truncate_arc_pools(&mut self, pairs: usize) {
        self.inc.truncate_arcs(pairs);
        self.ucap.truncate(pairs);
        self.lcap.truncate(pairs);
        self.sub.truncate(pairs);
        self.length.truncate(pairs);
        self.orientation.truncate(pairs);
        self.edge_colour.truncate(pairs);
        self.ctrl.truncate(pairs);
        self.invalidate_adj();
    }

    /// Exchange the identities of two arc pairs, addressed by one half
    /// each. If the halves differ in parity the pairs change implicit
    /// orientation and their control point sequences are reversed.
    pub fn swap_arcs(&mut self, a1: Arc, a2: Arc) -> Result<()> {
        self.check_arc(a1)?;
        self.check_arc(a2)?;
        if a1.pair() == a2.pair() {
            return if a1 == a2 {
                Ok(())
            } else {
                Err(Error::Rejected("cannot exchange an arc with its own reverse"))
            };
        }
        self.swap_arc_halves(a1, a2);
        Ok(())
    }

    fn swap_arc_halves(&mut self, a1: Arc, a2: Arc) {
        let (e1, e2) = (a1.pair(), a2.pair());
        let flip = self.inc.swap_arcs(a1.0, a2.0);
        self.ucap.swap(e1, e2);
        self.lcap.swap(e1, e2);
        self.sub.swap(e1, e2);
        self.length.swap(e1, e2);
        self.orientation.swap(e1, e2);
        self.edge_colour.swap(e1, e2);
        self.ctrl.swap(e1, e2);
        if flip {
            let m = self.inc.num_pairs();
            for &e in [e1, e2].iter() {
                let mut pts = self.ctrl.value(e, Vec::new());
                if !pts.is_empty() {
                    pts.reverse();
                    self.ctrl.set(e, pts, m, Vec::new());
                }
            }
        }
        if let Some(x) = self.exterior {
            self.exterior = Some(if x == a1 {
                a2
            } else if x == a2 {
                a1
            } else if x == a1.reverse() {
                a2.reverse()
            } else if x == a2.reverse() {
                a1.reverse()
            } else {
                x
            });
        }
        self.invalidate_adj();
    }

    /// Delete node `v`: cancel all incident arcs, compact the arc space,
    /// and move the formerly last node onto index `v`.
    pub fn delete_node(&mut self, v: Node) -> Result<()> {
        self.check_node(v)?;
        let mut pairs: Vec<usize> = self.incidences(v).map(|a| a.pair()).collect();
        pairs.sort_unstable();
        pairs.dedup();
        for &e in pairs.iter() {
            self.cancel_arc(Arc::forward(e))?;
        }
        self.delete_arcs();

        let last = self.inc.num_nodes() - 1;
        if v.index() != last {
            self.inc.swap_nodes(v.0, last as u32);
            self.swap_node_pools(v.index(), last);
        }
        self.inc.pop_node();
        self.truncate_node_pools(last);
        self.invalidate_adj();
        self.invalidate_degrees();
        Ok(())
    }

    fn swap_node_pools(&mut self, i: usize, j: usize) {
        self.demand.swap(i, j);
        self.node_colour.swap(i, j);
        self.pi.swap(i, j);
        self.pred.swap(i, j);
        self.dist.swap(i, j);
        self.coord_x.swap(i, j);
        self.coord_y.swap(i, j);
    }

    fn truncate_node_pools(&mut self, n: usize) {
        self.demand.truncate(n);
        self.node_colour.truncate(n);
        self.pi.truncate(n);
        self.pred.truncate(n);
        self.dist.truncate(n);
        self.coord_x.truncate(n);
        self.coord_y.truncate(n);
    }

    /// Cancel `a` and identify its two endpoints.
    pub fn contract_arc(&mut self, a: Arc) -> Result<()> {
        self.check_arc(a)?;
        let u = self
            .start_node(a)
            .ok_or(Error::Rejected("arc is already cancelled"))?;
        let v = self.end_node(a).ok_or(Error::Rejected("arc is already cancelled"))?;
        self.cancel_arc(a)?;
        if u != v {
            self.identify_nodes(u, v)?;
        }
        Ok(())
    }

    /// Merge node `v` into node `u`: `u` takes over all of `v`'s
    /// incidences and demand, geometry is averaged, and `v` is deleted.
    pub fn identify_nodes(&mut self, u: Node, v: Node) -> Result<()> {
        self.check_node(u)?;
        self.check_node(v)?;
        if u == v {
            return Err(Error::Rejected("cannot identify a node with itself"));
        }
        let n = self.inc.num_nodes();
        let xu = (self.coord_x.value(u.index(), 0.0) + self.coord_x.value(v.index(), 0.0)) / 2.0;
        let yu = (self.coord_y.value(u.index(), 0.0) + self.coord_y.value(v.index(), 0.0)) / 2.0;
        self.coord_x.set(u.index(), xu, n, 0.0);
        self.coord_y.set(u.index(), yu, n, 0.0);
        let dv = self.demand.value(v.index(), F::zero());
        if dv != F::zero() {
            let du = self.demand.value(u.index(), F::zero());
            self.demand.set(u.index(), du + dv, n, F::zero());
        }
        self.inc.merge_rings(u.0, v.0);
        self.invalidate_degrees();
        self.delete_node(v)
    }

    /// Find an arc from `u` to `v`, if any.
    ///
    /// Among parallel candidates an arc whose orientation is not
    /// [`Orientation::Blocking`] wins, then the lower half index. `None`
    /// is the expected negative result, not an error.
    pub fn adjacency(&mut self, u: Node, v: Node, method: AdjacencyMethod) -> Option<Arc> {
        match method {
            AdjacencyMethod::Matrix => {
                self.ensure_adj();
                self.adj
                    .as_ref()
                    .and_then(|adj| adj.get(&(u.0, v.0)))
                    .map(|&h| Arc(h))
            }
            AdjacencyMethod::Search => {
                let mut best: Option<Arc> = None;
                for a in self.incidences(u) {
                    if self.end_node(a) == Some(v) && self.prefers(a, best) {
                        best = Some(a);
                    }
                }
                best
            }
        }
    }

    fn prefers(&self, a: Arc, over: Option<Arc>) -> bool {
        let key = |x: Arc| {
            (
                self.orientation.value(x.pair(), Orientation::Directed) == Orientation::Blocking,
                x.0,
            )
        };
        match over {
            None => true,
            Some(b) => key(a) < key(b),
        }
    }

    fn ensure_adj(&mut self) {
        if self.adj.is_some() {
            return;
        }
        let mut adj: HashMap<(u32, u32), u32> = HashMap::new();
        for e in 0..self.inc.num_pairs() {
            for a in [Arc::forward(e), Arc::backward(e)].iter().cloned() {
                let s = self.inc.start(a.0);
                if s == NO_INDEX {
                    continue;
                }
                let t = self.inc.start(a.reverse().0);
                match adj.get(&(s, t)).cloned() {
                    Some(old) if !self.prefers(a, Some(Arc(old))) => {}
                    _ => {
                        adj.insert((s, t), a.0);
                    }
                }
            }
        }
        self.adj = Some(adj);
    }

    /// Subgraph degree of `v`: the flow sum over undirected incidences.
    pub fn deg(&mut self, v: Node) -> F {
        self.ensure_degrees();
        self.degs.as_ref().unwrap()[v.index()]
    }

    /// Flow sum over directed arcs into `v`.
    pub fn in_deg(&mut self, v: Node) -> F {
        self.ensure_degrees();
        self.indegs.as_ref().unwrap()[v.index()]
    }

    /// Flow sum over directed arcs out of `v`.
    pub fn out_deg(&mut self, v: Node) -> F {
        self.ensure_degrees();
        self.outdegs.as_ref().unwrap()[v.index()]
    }

    fn ensure_degrees(&mut self) {
        if self.degs.is_some() {
            return;
        }
        let n = self.inc.num_nodes();
        let mut degs = vec![F::zero(); n];
        let mut indegs = vec![F::zero(); n];
        let mut outdegs = vec![F::zero(); n];
        for e in 0..self.inc.num_pairs() {
            let h = (2 * e) as u32;
            let u = self.inc.start(h);
            if u == NO_INDEX {
                continue;
            }
            let v = self.inc.start(h + 1);
            let s = self.sub.value(e, F::zero());
            if s == F::zero() {
                continue;
            }
            match self.orientation.value(e, Orientation::Directed) {
                Orientation::Directed => {
                    outdegs[u as usize] += s;
                    indegs[v as usize] += s;
                }
                _ => {
                    degs[u as usize] += s;
                    degs[v as usize] += s;
                }
            }
        }
        self.degs = Some(degs);
        self.indegs = Some(indegs);
        self.outdegs = Some(outdegs);
    }

    /// Replace the contribution of one pair's flow in the degree caches.
    fn adjust_degrees(&mut self, pair: usize, old: F, new: F) {
        if self.degs.is_none() {
            return;
        }
        let u = self.inc.start((2 * pair) as u32);
        if u == NO_INDEX {
            return;
        }
        let v = self.inc.start((2 * pair) as u32 + 1) as usize;
        let u = u as usize;
        match self.orientation.value(pair, Orientation::Directed) {
            Orientation::Directed => {
                let outdegs = self.outdegs.as_mut().unwrap();
                outdegs[u] -= old;
                outdegs[u] += new;
                let indegs = self.indegs.as_mut().unwrap();
                indegs[v] -= old;
                indegs[v] += new;
            }
            _ => {
                let degs = self.degs.as_mut().unwrap();
                degs[u] -= old;
                degs[u] += new;
                degs[v] -= old;
                degs[v] += new;
            }
        }
    }

    /// Set the subgraph multiplicity of `a`'s pair.
    ///
    /// The magnitude must satisfy `lcap(a) <= |x| <= ucap(a)`, otherwise
    /// nothing changes and `AmountOutOfRange` is returned. Degree caches
    /// are adjusted in place and never go stale.
    pub fn set_sub(&mut self, a: Arc, x: F) -> Result<()> {
        self.check_arc(a)?;
        let pair = a.pair();
        if self.inc.is_cancelled(pair as u32) {
            return Err(Error::Rejected("arc is cancelled"));
        }
        let mag = magnitude(x);
        if mag < self.lcap.value(pair, F::zero()) || mag > self.ucap.value(pair, F::one()) {
            return Err(Error::AmountOutOfRange);
        }
        let old = self.sub.value(pair, F::zero());
        self.sub.set(pair, x, self.inc.num_pairs(), F::zero());
        self.adjust_degrees(pair, old, x);
        Ok(())
    }

    /// Adjust the subgraph multiplicity of `a`'s pair by `delta`.
    pub fn set_sub_relative(&mut self, a: Arc, delta: F) -> Result<()> {
        self.check_arc(a)?;
        let cur = self.sub.value(a.pair(), F::zero());
        self.set_sub(a, cur + delta)
    }

    /// Reset all subgraph multiplicities to zero.
    pub fn init_subgraph(&mut self) {
        self.sub.release();
        self.invalidate_degrees();
    }

    // plain attribute setters

    pub fn set_ucap(&mut self, a: Arc, x: F) -> Result<()> {
        self.check_arc(a)?;
        self.ucap.set(a.pair(), x, self.inc.num_pairs(), F::one());
        Ok(())
    }

    pub fn set_lcap(&mut self, a: Arc, x: F) -> Result<()> {
        self.check_arc(a)?;
        self.lcap.set(a.pair(), x, self.inc.num_pairs(), F::zero());
        Ok(())
    }

    pub fn set_length(&mut self, a: Arc, x: C) -> Result<()> {
        self.check_arc(a)?;
        self.length.set(a.pair(), x, self.inc.num_pairs(), C::zero());
        Ok(())
    }

    pub fn set_orientation(&mut self, a: Arc, o: Orientation) -> Result<()> {
        self.check_arc(a)?;
        self.orientation
            .set(a.pair(), o, self.inc.num_pairs(), Orientation::Directed);
        // orientation participates in adjacency tie breaks and in the
        // degree split between deg and in/out
        self.invalidate_adj();
        self.invalidate_degrees();
        Ok(())
    }

    pub fn set_demand(&mut self, v: Node, x: F) -> Result<()> {
        self.check_node(v)?;
        self.demand.set(v.index(), x, self.inc.num_nodes(), F::zero());
        Ok(())
    }

    pub fn node_colour(&self, v: Node) -> Option<u32> {
        match self.node_colour.value(v.index(), NO_INDEX) {
            NO_INDEX => None,
            c => Some(c),
        }
    }

    pub fn set_node_colour(&mut self, v: Node, c: u32) -> Result<()> {
        self.check_node(v)?;
        self.node_colour.set(v.index(), c, self.inc.num_nodes(), NO_INDEX);
        Ok(())
    }

    pub fn edge_colour(&self, a: Arc) -> Option<u32> {
        match self.edge_colour.value(a.pair(), NO_INDEX) {
            NO_INDEX => None,
            c => Some(c),
        }
    }

    pub fn set_edge_colour(&mut self, a: Arc, c: u32) -> Result<()> {
        self.check_arc(a)?;
        self.edge_colour.set(a.pair(), c, self.inc.num_pairs(), NO_INDEX);
        Ok(())
    }

    /// Node potential (dual variable), default 0.
    pub fn pi(&self, v: Node) -> C {
        self.pi.value(v.index(), C::zero())
    }

    pub fn set_pi(&mut self, v: Node, x: C) -> Result<()> {
        self.check_node(v)?;
        self.pi.set(v.index(), x, self.inc.num_nodes(), C::zero());
        Ok(())
    }

    /// Predecessor arc of `v` as registered by a search, if any.
    pub fn pred(&self, v: Node) -> Option<Arc> {
        match self.pred.value(v.index(), NO_INDEX) {
            NO_INDEX => None,
            h => Some(Arc(h)),
        }
    }

    pub fn set_pred(&mut self, v: Node, a: Option<Arc>) -> Result<()> {
        self.check_node(v)?;
        let h = a.map_or(NO_INDEX, |a| a.0);
        self.pred.set(v.index(), h, self.inc.num_nodes(), NO_INDEX);
        Ok(())
    }

    /// Distance label of `v`, default 0.
    pub fn dist(&self, v: Node) -> C {
        self.dist.value(v.index(), C::zero())
    }

    pub fn set_dist(&mut self, v: Node, x: C) -> Result<()> {
        self.check_node(v)?;
        self.dist.set(v.index(), x, self.inc.num_nodes(), C::zero());
        Ok(())
    }

    // geometry

    /// Coordinate `d` (0 = x, 1 = y) of node `v`.
    pub fn c(&self, v: Node, d: usize) -> f64 {
        match d {
            0 => self.coord_x.value(v.index(), 0.0),
            1 => self.coord_y.value(v.index(), 0.0),
            _ => 0.0,
        }
    }

    pub fn set_c(&mut self, v: Node, d: usize, x: f64) -> Result<()> {
        self.check_node(v)?;
        let n = self.inc.num_nodes();
        match d {
            0 => self.coord_x.set(v.index(), x, n, 0.0),
            1 => self.coord_y.set(v.index(), x, n, 0.0),
            _ => return Err(Error::Rejected("unsupported coordinate dimension")),
        }
        Ok(())
    }

    /// Number of geometric dimensions in use: 0 while no coordinate has
    /// been assigned, 2 afterwards.
    pub fn dim(&self) -> usize {
        match (&self.coord_x, &self.coord_y) {
            (Attribute::Unset, Attribute::Unset) => 0,
            _ => 2,
        }
    }

    /// The (min, max) interval of coordinate `d` over all nodes.
    pub fn bounding_interval(&self, d: usize) -> Option<(f64, f64)> {
        if self.dim() == 0 || self.inc.num_nodes() == 0 {
            return None;
        }
        let mut lo = std::f64::INFINITY;
        let mut hi = std::f64::NEG_INFINITY;
        for v in self.nodes() {
            let x = self.c(v, d);
            lo = lo.min(x);
            hi = hi.max(x);
        }
        Some((lo, hi))
    }

    /// The layout control points threaded along `a`'s pair, in forward
    /// direction.
    pub fn control_points(&self, a: Arc) -> &[(f64, f64)] {
        self.ctrl.get(a.pair()).map_or(&[], |v| v.as_slice())
    }

    pub fn set_control_points(&mut self, a: Arc, pts: Vec<(f64, f64)>) -> Result<()> {
        self.check_arc(a)?;
        self.ctrl.set(a.pair(), pts, self.inc.num_pairs(), Vec::new());
        Ok(())
    }

    /// The arc marking the exterior face for embedding consumers.
    pub fn exterior_arc(&self) -> Option<Arc> {
        self.exterior
    }

    pub fn set_exterior_arc(&mut self, a: Option<Arc>) -> Result<()> {
        if let Some(a) = a {
            self.check_arc(a)?;
        }
        self.exterior = a;
        Ok(())
    }

    /// Ring predecessor of `a`; the first call after a mutation rebuilds
    /// the reverse pointer map.
    pub fn left(&mut self, a: Arc) -> Arc {
        Arc(self.inc.left_of(a.0))
    }

    /// Exchange the identities of two nodes, used by the bipartite
    /// wrapper to keep its partition contiguous.
    pub(crate) fn swap_nodes(&mut self, u: Node, v: Node) {
        if u == v {
            return;
        }
        self.inc.swap_nodes(u.0, v.0);
        self.swap_node_pools(u.index(), v.index());
        self.invalidate_adj();
        self.invalidate_degrees();
    }
}

impl<F, C> GraphTopology for SparseDigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    fn num_nodes(&self) -> usize {
        self.inc.num_nodes()
    }

    fn num_arcs(&self) -> usize {
        self.inc.num_pairs()
    }

    fn start_node(&self, a: Arc) -> Option<Node> {
        match self.inc.start(a.0) {
            NO_INDEX => None,
            v => Some(Node(v)),
        }
    }

    fn first(&self, v: Node) -> Option<Arc> {
        match self.inc.first_of(v.0) {
            NO_INDEX => None,
            h => Some(Arc(h)),
        }
    }

    fn right(&self, a: Arc) -> Arc {
        Arc(self.inc.right_of(a.0))
    }
}

impl<F, C> GraphAttributes for SparseDigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    type Flow = F;
    type Cost = C;

    fn ucap(&self, a: Arc) -> F {
        self.ucap.value(a.pair(), F::one())
    }

    fn lcap(&self, a: Arc) -> F {
        self.lcap.value(a.pair(), F::zero())
    }

    fn length(&self, a: Arc) -> C {
        self.length.value(a.pair(), C::zero())
    }

    fn demand(&self, v: Node) -> F {
        self.demand.value(v.index(), F::zero())
    }

    fn sub(&self, a: Arc) -> F {
        self.sub.value(a.pair(), F::zero())
    }

    fn orientation(&self, a: Arc) -> Orientation {
        self.orientation.value(a.pair(), Orientation::Directed)
    }
}

#[cfg(test)]
mod tests {
    use super::{AdjacencyMethod, SparseDigraph};
    use crate::traits::{Arc, GraphAttributes, GraphTopology, Indexable, Node, Orientation};

    fn nodes(g: &mut SparseDigraph, k: usize) -> Vec<Node> {
        (0..k).map(|_| g.insert_node()).collect()
    }

    fn check_rings(g: &SparseDigraph) {
        for v in g.nodes() {
            for a in g.incidences(v) {
                assert_eq!(g.start_node(a), Some(v));
                assert_eq!(g.end_node(a), g.start_node(a.reverse()));
            }
        }
        // every live half appears in exactly one ring
        let mut seen = vec![0usize; 2 * g.num_arcs()];
        for v in g.nodes() {
            for a in g.incidences(v) {
                seen[a.index()] += 1;
            }
        }
        for a in g.arcs() {
            let expect = if g.start_node(a).is_some() { 1 } else { 0 };
            assert_eq!(seen[a.index()], expect);
            assert_eq!(seen[a.reverse().index()], expect);
        }
    }

    #[test]
    fn test_insert_round_trip() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 2);
        let a = g.insert_arc_with(vs[0], vs[1], 7, -3, 2).unwrap();
        assert_eq!(g.ucap(a), 7);
        assert_eq!(g.length(a), -3);
        assert_eq!(g.lcap(a), 2);
        assert_eq!(g.sub(a), 0);
        assert_eq!(g.orientation(a), Orientation::Directed);
        assert_eq!(g.start_node(a), Some(vs[0]));
        assert_eq!(g.end_node(a), Some(vs[1]));

        assert!(g.insert_arc(vs[0], Node::new(5)).is_err());
        assert_eq!(g.num_arcs(), 1);
        check_rings(&g);
    }

    #[test]
    fn test_sub_bounds_and_degrees() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 3);
        let a = g.insert_arc_with(vs[0], vs[1], 3, 0, 1).unwrap();
        let b = g.insert_arc_with(vs[1], vs[2], 3, 0, 0).unwrap();
        g.set_orientation(b, Orientation::Undirected).unwrap();

        assert!(g.set_sub(a, 4).is_err());
        assert!(g.set_sub(a, 0).is_err()); // below the lower bound
        g.set_sub(a, 2).unwrap();
        assert_eq!(g.out_deg(vs[0]), 2);
        assert_eq!(g.in_deg(vs[1]), 2);
        assert_eq!(g.deg(vs[1]), 0);

        g.set_sub_relative(a, 1).unwrap();
        assert_eq!(g.out_deg(vs[0]), 3);
        assert!(g.set_sub_relative(a, 1).is_err());
        assert_eq!(g.out_deg(vs[0]), 3);

        g.set_sub(b, 2).unwrap();
        assert_eq!(g.deg(vs[1]), 2);
        assert_eq!(g.deg(vs[2]), 2);

        g.init_subgraph();
        assert_eq!(g.deg(vs[1]), 0);
        assert_eq!(g.out_deg(vs[0]), 0);
    }

    #[test]
    fn test_adjacency() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 3);
        let a = g.insert_arc(vs[0], vs[1]).unwrap();
        let b = g.insert_arc(vs[0], vs[1]).unwrap();
        g.insert_arc(vs[1], vs[2]).unwrap();
        g.set_orientation(a, Orientation::Blocking).unwrap();

        // parallel arcs: the non-blocking one wins regardless of index
        assert_eq!(g.adjacency(vs[0], vs[1], AdjacencyMethod::Search), Some(b));
        assert_eq!(g.adjacency(vs[0], vs[1], AdjacencyMethod::Matrix), Some(b));
        // idempotent without mutation in between
        assert_eq!(g.adjacency(vs[0], vs[1], AdjacencyMethod::Matrix), Some(b));
        // the reverse direction is served by the backward half
        assert_eq!(
            g.adjacency(vs[1], vs[0], AdjacencyMethod::Matrix),
            Some(b.reverse())
        );
        assert_eq!(g.adjacency(vs[0], vs[2], AdjacencyMethod::Matrix), None);
        assert_eq!(g.adjacency(vs[0], vs[2], AdjacencyMethod::Search), None);

        // cache invalidation on structural change
        g.cancel_arc(b).unwrap();
        assert_eq!(g.adjacency(vs[0], vs[1], AdjacencyMethod::Matrix), Some(a));
    }

    #[test]
    fn test_cancel_and_compact() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 4);
        let a = g.insert_arc(vs[0], vs[1]).unwrap();
        let b = g.insert_arc(vs[1], vs[2]).unwrap();
        let c = g.insert_arc(vs[2], vs[3]).unwrap();
        g.set_ucap(c, 9).unwrap();

        g.cancel_arc(a).unwrap();
        assert!(g.cancel_arc(a).is_err());
        assert_eq!(g.start_node(a), None);
        assert_eq!(g.num_arcs(), 3);

        g.delete_arcs();
        // the tail pair was relabeled onto the freed index
        assert_eq!(g.num_arcs(), 2);
        assert_eq!(g.start_node(Arc::forward(0)), Some(vs[2]));
        assert_eq!(g.ucap(Arc::forward(0)), 9);
        assert_eq!(g.start_node(b), Some(vs[1]));
        check_rings(&g);
    }

    #[test]
    fn test_delete_arc_single() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 3);
        let a = g.insert_arc(vs[0], vs[1]).unwrap();
        let b = g.insert_arc(vs[1], vs[2]).unwrap();
        g.set_length(b, 5).unwrap();

        g.delete_arc(a).unwrap();
        assert_eq!(g.num_arcs(), 1);
        assert_eq!(g.start_node(Arc::forward(0)), Some(vs[1]));
        assert_eq!(g.length(Arc::forward(0)), 5);
        check_rings(&g);
    }

    #[test]
    fn test_delete_node_reindexing() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 4);
        g.insert_arc(vs[0], vs[1]).unwrap();
        g.insert_arc(vs[1], vs[2]).unwrap();
        g.insert_arc(vs[2], vs[3]).unwrap();
        g.set_demand(vs[3], 7).unwrap();

        g.delete_node(vs[1]).unwrap();
        assert_eq!(g.num_nodes(), 3);
        // the last node moved onto index 1, all others kept their index
        assert_eq!(g.demand(Node::new(1)), 7);
        assert_eq!(g.num_arcs(), 1);
        for a in g.arcs() {
            if let Some(u) = g.start_node(a) {
                assert!(u.index() < 3);
                assert!(g.end_node(a).unwrap().index() < 3);
            }
        }
        // the surviving arc joins the old nodes 2 and 3 (now 2 and 1)
        assert_eq!(
            g.adjacency(Node::new(2), Node::new(1), AdjacencyMethod::Search)
                .is_some(),
            true
        );
        check_rings(&g);
    }

    #[test]
    fn test_contract_and_identify() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 3);
        let a = g.insert_arc(vs[0], vs[1]).unwrap();
        g.insert_arc(vs[1], vs[2]).unwrap();
        g.set_c(vs[0], 0, 0.0).unwrap();
        g.set_c(vs[1], 0, 2.0).unwrap();

        g.contract_arc(a).unwrap();
        assert_eq!(g.num_nodes(), 2);
        // merged node keeps index 0 and averaged geometry
        assert_eq!(g.c(Node::new(0), 0), 1.0);
        // the other arc now runs between the merged node and old node 2
        let b = Arc::forward(0);
        let ends = (g.start_node(b).unwrap(), g.end_node(b).unwrap());
        assert!(ends == (Node::new(0), Node::new(1)) || ends == (Node::new(1), Node::new(0)));
        check_rings(&g);
    }

    #[test]
    fn test_control_point_reversal() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 2);
        let a = g.insert_arc(vs[0], vs[1]).unwrap();
        let b = g.insert_arc(vs[1], vs[0]).unwrap();
        g.set_control_points(a, vec![(1.0, 0.0), (2.0, 0.0)]).unwrap();

        // aligned swap keeps the sequence order
        g.swap_arcs(a, b).unwrap();
        assert_eq!(g.control_points(b), &[(1.0, 0.0), (2.0, 0.0)]);

        // orientation-flipping swap reverses it
        g.swap_arcs(b, a.reverse()).unwrap();
        assert_eq!(g.control_points(a), &[(2.0, 0.0), (1.0, 0.0)]);
        check_rings(&g);
    }

    #[test]
    fn test_exterior_arc_cleared_on_cancel() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 2);
        let a = g.insert_arc(vs[0], vs[1]).unwrap();
        g.set_exterior_arc(Some(a)).unwrap();
        assert_eq!(g.exterior_arc(), Some(a));
        g.cancel_arc(a).unwrap();
        assert_eq!(g.exterior_arc(), None);
    }

    #[test]
    fn test_bounding_interval() {
        let mut g = SparseDigraph::new();
        let vs = nodes(&mut g, 3);
        assert_eq!(g.dim(), 0);
        assert_eq!(g.bounding_interval(0), None);
        g.set_c(vs[0], 0, -1.0).unwrap();
        g.set_c(vs[1], 0, 4.0).unwrap();
        assert_eq!(g.dim(), 2);
        assert_eq!(g.bounding_interval(0), Some((-1.0, 4.0)));
        assert_eq!(g.bounding_interval(1), Some((0.0, 0.0)));
    }
}
