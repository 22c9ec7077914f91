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

//! The sparse bipartite backend.
//!
//! [`SparseBigraph`] adds a contiguous left/right node partition to
//! [`SparseDigraph`]: nodes `0 .. n1` are the left-hand side, `n1 .. n`
//! the right-hand side, and every arc joins the two sides (same-side arcs
//! are rejected at insertion). The forward half of every pair is oriented
//! left to right.
//!
//! Lifecycle operations keep the partition contiguous with at most one
//! extra node swap, so the "deletion invalidates at most one other index
//! per side" guarantee of the sparse backend carries over.

use crate::error::{Error, Result};
use crate::num::traits::NumAssign;
use crate::sparse::{AdjacencyMethod, SparseDigraph};
use crate::traits::{
    Arc, BipartiteGraph, GraphAttributes, GraphTopology, Indexable, Node, Orientation,
};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// A bipartite graph over the sparse incidence-list backend.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serialize",
    serde(bound(
        serialize = "F: serde::Serialize, C: serde::Serialize",
        deserialize = "F: serde::Deserialize<'de>, C: serde::Deserialize<'de>"
    ))
)]
#[derive(Clone, Debug)]
pub struct SparseBigraph<F = i32, C = i32> {
    g: SparseDigraph<F, C>,
    n1: usize,
}

impl<F, C> Default for SparseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F, C> SparseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    pub fn new() -> Self {
        SparseBigraph {
            g: SparseDigraph::new(),
            n1: 0,
        }
    }

    /// Create a graph with `n1` left-hand and `n2` right-hand nodes and
    /// reserved space for `m` arc pairs.
    pub fn with_nodes(n1: usize, n2: usize, m: usize) -> Self {
        let mut g = SparseDigraph::with_capacity(n1 + n2, m);
        for _ in 0..n1 + n2 {
            g.insert_node();
        }
        SparseBigraph { g, n1 }
    }

    /// Read access to the underlying graph (geometry, colours, adjacency
    /// caches are reached through the delegating methods instead).
    pub fn graph(&self) -> &SparseDigraph<F, C> {
        &self.g
    }

    /// Append a left-hand node. If right-hand nodes exist, the one at the
    /// partition boundary is relabeled to the end to keep the left side
    /// contiguous.
    pub fn insert_left_node(&mut self) -> Node {
        let v = self.g.insert_node();
        let boundary = Node::new(self.n1);
        self.g.swap_nodes(boundary, v);
        self.n1 += 1;
        boundary
    }

    /// Append a right-hand node.
    pub fn insert_right_node(&mut self) -> Node {
        self.g.insert_node()
    }

    /// Move the isolated node `v` to the other side of the partition.
    ///
    /// `v` keeps no incidences by definition of the operation; a
    /// non-isolated node is rejected since its arcs would become
    /// same-sided.
    pub fn swap_node(&mut self, v: Node) -> Result<()> {
        if v.index() >= self.num_nodes() {
            return Err(Error::NoSuchNode(v.index()));
        }
        if self.g.first(v).is_some() {
            return Err(Error::Rejected("only an isolated node can change sides"));
        }
        if v.index() < self.n1 {
            self.g.swap_nodes(v, Node::new(self.n1 - 1));
            self.n1 -= 1;
        } else {
            self.g.swap_nodes(v, Node::new(self.n1));
            self.n1 += 1;
        }
        Ok(())
    }

    /// Insert an arc with default attributes; endpoints must lie on
    /// opposite sides, in either order.
    pub fn insert_arc(&mut self, u: Node, v: Node) -> Result<Arc> {
        self.insert_arc_with(u, v, F::one(), C::zero(), F::zero())
    }

    /// Insert an arc with the given upper capacity, length and lower
    /// capacity. The forward half runs from the left-hand endpoint.
    pub fn insert_arc_with(&mut self, u: Node, v: Node, ucap: F, length: C, lcap: F) -> Result<Arc> {
        if u.index() >= self.num_nodes() {
            return Err(Error::NoSuchNode(u.index()));
        }
        if v.index() >= self.num_nodes() {
            return Err(Error::NoSuchNode(v.index()));
        }
        let (left, right) = if u.index() < self.n1 { (u, v) } else { (v, u) };
        if left.index() >= self.n1 || right.index() < self.n1 {
            return Err(Error::Rejected(
                "arc endpoints lie on the same side of the partition",
            ));
        }
        self.g.insert_arc_with(left, right, ucap, length, lcap)
    }

    /// Delete `v`, cancelling its arcs and keeping both the index space
    /// and the partition dense.
    pub fn delete_node(&mut self, v: Node) -> Result<()> {
        if v.index() >= self.num_nodes() {
            return Err(Error::NoSuchNode(v.index()));
        }
        if v.index() < self.n1 {
            // retire the boundary slot so the plain deletion's
            // swap-with-last lands on the right side
            let boundary = Node::new(self.n1 - 1);
            self.g.swap_nodes(v, boundary);
            self.n1 -= 1;
            self.g.delete_node(boundary)
        } else {
            self.g.delete_node(v)
        }
    }

    pub fn cancel_arc(&mut self, a: Arc) -> Result<()> {
        self.g.cancel_arc(a)
    }

    pub fn delete_arc(&mut self, a: Arc) -> Result<()> {
        self.g.delete_arc(a)
    }

    pub fn delete_arcs(&mut self) {
        self.g.delete_arcs()
    }

    pub fn adjacency(&mut self, u: Node, v: Node, method: AdjacencyMethod) -> Option<Arc> {
        self.g.adjacency(u, v, method)
    }

    pub fn deg(&mut self, v: Node) -> F {
        self.g.deg(v)
    }

    pub fn in_deg(&mut self, v: Node) -> F {
        self.g.in_deg(v)
    }

    pub fn out_deg(&mut self, v: Node) -> F {
        self.g.out_deg(v)
    }

    pub fn set_ucap(&mut self, a: Arc, x: F) -> Result<()> {
        self.g.set_ucap(a, x)
    }

    pub fn set_lcap(&mut self, a: Arc, x: F) -> Result<()> {
        self.g.set_lcap(a, x)
    }

    pub fn set_length(&mut self, a: Arc, x: C) -> Result<()> {
        self.g.set_length(a, x)
    }

    pub fn set_demand(&mut self, v: Node, x: F) -> Result<()> {
        self.g.set_demand(v, x)
    }

    pub fn set_sub_relative(&mut self, a: Arc, delta: F) -> Result<()> {
        self.g.set_sub_relative(a, delta)
    }
}

impl<F, C> GraphTopology for SparseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    fn num_nodes(&self) -> usize {
        self.g.num_nodes()
    }

    fn num_arcs(&self) -> usize {
        self.g.num_arcs()
    }

    fn start_node(&self, a: Arc) -> Option<Node> {
        self.g.start_node(a)
    }

    fn first(&self, v: Node) -> Option<Arc> {
        self.g.first(v)
    }

    fn right(&self, a: Arc) -> Arc {
        self.g.right(a)
    }
}

impl<F, C> GraphAttributes for SparseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    type Flow = F;
    type Cost = C;

    fn ucap(&self, a: Arc) -> F {
        self.g.ucap(a)
    }

    fn lcap(&self, a: Arc) -> F {
        self.g.lcap(a)
    }

    fn length(&self, a: Arc) -> C {
        self.g.length(a)
    }

    fn demand(&self, v: Node) -> F {
        self.g.demand(v)
    }

    fn sub(&self, a: Arc) -> F {
        self.g.sub(a)
    }

    fn orientation(&self, a: Arc) -> Orientation {
        self.g.orientation(a)
    }
}

impl<F, C> BipartiteGraph for SparseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    fn n1(&self) -> usize {
        self.n1
    }

    fn set_sub(&mut self, a: Arc, x: F) -> Result<()> {
        self.g.set_sub(a, x)
    }

    fn init_subgraph(&mut self) {
        self.g.init_subgraph()
    }
}

#[cfg(test)]
mod tests {
    use super::SparseBigraph;
    use crate::traits::{BipartiteGraph, GraphAttributes, GraphTopology, Indexable, Node};

    fn check_partition(g: &SparseBigraph) {
        for a in g.arcs() {
            if let (Some(u), Some(v)) = (g.start_node(a), g.end_node(a)) {
                assert!(u.index() < g.n1());
                assert!(v.index() >= g.n1());
            }
        }
    }

    #[test]
    fn test_partition_enforced() {
        let mut g = SparseBigraph::with_nodes(2, 2, 4);
        assert_eq!(g.n1(), 2);
        assert_eq!(g.n2(), 2);

        let a = g.insert_arc(Node::new(0), Node::new(2)).unwrap();
        // endpoints in either order, forward half normalized left→right
        let b = g.insert_arc(Node::new(3), Node::new(1)).unwrap();
        assert_eq!(g.start_node(b), Some(Node::new(1)));
        assert_eq!(g.end_node(b), Some(Node::new(3)));

        assert!(g.insert_arc(Node::new(0), Node::new(1)).is_err());
        assert!(g.insert_arc(Node::new(2), Node::new(3)).is_err());
        assert_eq!(g.num_arcs(), 2);
        assert_eq!(g.ucap(a), 1);
        check_partition(&g);
    }

    #[test]
    fn test_insert_left_node() {
        let mut g = SparseBigraph::with_nodes(1, 2, 2);
        let a = g.insert_arc(Node::new(0), Node::new(1)).unwrap();
        let v = g.insert_left_node();
        assert_eq!(v, Node::new(1));
        assert_eq!(g.n1(), 2);
        assert_eq!(g.num_nodes(), 4);
        // the relabeled right node carried its incidences along
        assert_eq!(g.end_node(a), Some(Node::new(3)));
        check_partition(&g);

        let w = g.insert_right_node();
        assert_eq!(w.index(), 4);
        g.insert_arc(v, w).unwrap();
        check_partition(&g);
    }

    #[test]
    fn test_swap_node() {
        let mut g = SparseBigraph::with_nodes(2, 1, 2);
        g.insert_arc(Node::new(0), Node::new(2)).unwrap();
        // node 0 is not isolated
        assert!(g.swap_node(Node::new(0)).is_err());

        // node 1 is isolated and moves to the right side
        g.swap_node(Node::new(1)).unwrap();
        assert_eq!(g.n1(), 1);
        assert_eq!(g.n2(), 2);
        check_partition(&g);

        // and back
        g.swap_node(Node::new(1)).unwrap();
        assert_eq!(g.n1(), 2);
        check_partition(&g);
    }

    #[test]
    fn test_delete_node_keeps_partition() {
        let mut g = SparseBigraph::with_nodes(2, 2, 4);
        g.insert_arc(Node::new(0), Node::new(2)).unwrap();
        g.insert_arc(Node::new(1), Node::new(3)).unwrap();
        g.set_demand(Node::new(3), 5).unwrap();

        g.delete_node(Node::new(0)).unwrap();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.n1(), 1);
        assert_eq!(g.num_arcs(), 1);
        check_partition(&g);

        // right-hand deletion
        let right = Node::new(g.n1());
        g.delete_node(right).unwrap();
        assert_eq!(g.n2(), 1);
        check_partition(&g);
    }

    #[test]
    fn test_subgraph_delegation() {
        let mut g: SparseBigraph = SparseBigraph::with_nodes(1, 1, 1);
        let a = g.insert_arc_with(Node::new(0), Node::new(1), 2, 0, 0).unwrap();
        g.set_sub(a, 2).unwrap();
        assert_eq!(g.sub(a), 2);
        assert!(g.set_sub(a, 3).is_err());
        g.init_subgraph();
        assert_eq!(g.sub(a), 0);
    }
}
