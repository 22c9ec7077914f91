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

//! The dense bipartite backend.
//!
//! [`DenseBigraph`] keeps a complete `n1 × n2` bipartite skeleton and
//! addresses it arithmetically: pair `k` joins left node `k / n2` and
//! right node `n1 + k % n2`. There are no incidence lists; `first`,
//! `right`, `start_node` and adjacency are O(1) formulas, at the cost of
//! O(n1·n2) attribute storage regardless of how many arcs actually carry
//! flow (the constant storage mode of the attribute pools keeps untouched
//! attributes free).
//!
//! The incidence ring of a left node `u` enumerates the forward halves of
//! pairs `u·n2 .. u·n2 + n2`; the ring of a right node `n1 + j` the
//! backward halves of pairs `j, j + n2, j + 2·n2, ...`. Ring order is an
//! implementation detail on every backend; algorithms only rely on each
//! ring visiting its node's incidences exactly once.

use crate::attributes::Attribute;
use crate::error::{Error, Result};
use crate::num::traits::NumAssign;
use crate::traits::{
    Arc, BipartiteGraph, GraphAttributes, GraphTopology, Indexable, Node, Orientation,
};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

fn magnitude<F: NumAssign + Ord + Copy>(x: F) -> F {
    if x < F::zero() {
        F::zero() - x
    } else {
        x
    }
}

/// A complete bipartite graph with formula addressing.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct DenseBigraph<F = i32, C = i32> {
    n1: usize,
    n2: usize,
    ucap: Attribute<F>,
    lcap: Attribute<F>,
    sub: Attribute<F>,
    length: Attribute<C>,
    demand: Attribute<F>,
}

impl<F, C> DenseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    /// Create the complete bipartite graph on `n1` left-hand and `n2`
    /// right-hand nodes with default attributes.
    pub fn new(n1: usize, n2: usize) -> Self {
        DenseBigraph {
            n1,
            n2,
            ucap: Attribute::Unset,
            lcap: Attribute::Unset,
            sub: Attribute::Unset,
            length: Attribute::Unset,
            demand: Attribute::Unset,
        }
    }

    fn check_node(&self, v: Node) -> Result<()> {
        if v.index() < self.n1 + self.n2 {
            Ok(())
        } else {
            Err(Error::NoSuchNode(v.index()))
        }
    }

    fn check_arc(&self, a: Arc) -> Result<()> {
        if a.pair() < self.n1 * self.n2 {
            Ok(())
        } else {
            Err(Error::NoSuchArc(a.index()))
        }
    }

    /// The unique arc joining `u` and `v`, computed without traversal.
    pub fn adjacency(&self, u: Node, v: Node) -> Option<Arc> {
        let (ui, vi) = (u.index(), v.index());
        if ui < self.n1 && vi >= self.n1 && vi < self.n1 + self.n2 {
            Some(Arc::forward(ui * self.n2 + (vi - self.n1)))
        } else if vi < self.n1 && ui >= self.n1 && ui < self.n1 + self.n2 {
            Some(Arc::backward(vi * self.n2 + (ui - self.n1)))
        } else {
            None
        }
    }

    pub fn set_ucap(&mut self, a: Arc, x: F) -> Result<()> {
        self.check_arc(a)?;
        self.ucap.set(a.pair(), x, self.n1 * self.n2, F::one());
        Ok(())
    }

    /// Assign one upper capacity to every arc without materializing an
    /// array.
    pub fn set_ucap_constant(&mut self, x: F) {
        self.ucap.set_constant(x);
    }

    pub fn set_lcap(&mut self, a: Arc, x: F) -> Result<()> {
        self.check_arc(a)?;
        self.lcap.set(a.pair(), x, self.n1 * self.n2, F::zero());
        Ok(())
    }

    pub fn set_length(&mut self, a: Arc, x: C) -> Result<()> {
        self.check_arc(a)?;
        self.length.set(a.pair(), x, self.n1 * self.n2, C::zero());
        Ok(())
    }

    pub fn set_demand(&mut self, v: Node, x: F) -> Result<()> {
        self.check_node(v)?;
        self.demand.set(v.index(), x, self.n1 + self.n2, F::zero());
        Ok(())
    }
}

impl<F, C> GraphTopology for DenseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    fn num_nodes(&self) -> usize {
        self.n1 + self.n2
    }

    fn num_arcs(&self) -> usize {
        self.n1 * self.n2
    }

    fn start_node(&self, a: Arc) -> Option<Node> {
        let k = a.pair();
        if a.is_forward() {
            Some(Node::new(k / self.n2))
        } else {
            Some(Node::new(self.n1 + k % self.n2))
        }
    }

    fn first(&self, v: Node) -> Option<Arc> {
        let vi = v.index();
        if vi < self.n1 {
            if self.n2 == 0 {
                None
            } else {
                Some(Arc::forward(vi * self.n2))
            }
        } else if self.n1 == 0 {
            None
        } else {
            Some(Arc::backward(vi - self.n1))
        }
    }

    fn right(&self, a: Arc) -> Arc {
        let k = a.pair();
        if a.is_forward() {
            let base = k - k % self.n2;
            Arc::forward(base + (k + 1 - base) % self.n2)
        } else {
            let next = k + self.n2;
            if next < self.n1 * self.n2 {
                Arc::backward(next)
            } else {
                Arc::backward(k % self.n2)
            }
        }
    }
}

impl<F, C> GraphAttributes for DenseBigraph<F, C>
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

    fn orientation(&self, _a: Arc) -> Orientation {
        Orientation::Directed
    }
}

impl<F, C> BipartiteGraph for DenseBigraph<F, C>
where
    F: NumAssign + Ord + Copy,
    C: NumAssign + Ord + Copy,
{
    fn n1(&self) -> usize {
        self.n1
    }

    fn set_sub(&mut self, a: Arc, x: F) -> Result<()> {
        self.check_arc(a)?;
        let pair = a.pair();
        let mag = magnitude(x);
        if mag < self.lcap.value(pair, F::zero()) || mag > self.ucap.value(pair, F::one()) {
            return Err(Error::AmountOutOfRange);
        }
        self.sub.set(pair, x, self.n1 * self.n2, F::zero());
        Ok(())
    }

    fn init_subgraph(&mut self) {
        self.sub.release();
    }
}

#[cfg(test)]
mod tests {
    use super::DenseBigraph;
    use crate::traits::{BipartiteGraph, GraphAttributes, GraphTopology, Indexable, Node};

    #[test]
    fn test_formula_addressing() {
        let g: DenseBigraph = DenseBigraph::new(2, 3);
        assert_eq!(g.num_nodes(), 5);
        assert_eq!(g.num_arcs(), 6);

        for a in g.arcs() {
            let u = g.start_node(a).unwrap();
            let v = g.end_node(a).unwrap();
            assert!(u.index() < 2);
            assert!(v.index() >= 2);
            assert_eq!(g.adjacency(u, v), Some(a));
            assert_eq!(g.adjacency(v, u), Some(a.reverse()));
        }
        assert_eq!(g.adjacency(Node::new(0), Node::new(1)), None);
        assert_eq!(g.adjacency(Node::new(2), Node::new(3)), None);
    }

    #[test]
    fn test_ring_closure() {
        let g: DenseBigraph = DenseBigraph::new(2, 3);
        for v in g.nodes() {
            let ring: Vec<_> = g.incidences(v).collect();
            let expect = if v.index() < 2 { 3 } else { 2 };
            assert_eq!(ring.len(), expect);
            for a in ring.iter() {
                assert_eq!(g.start_node(*a), Some(v));
            }
            // the walk returns to the first incidence
            assert_eq!(g.right(*ring.last().unwrap()), *ring.first().unwrap());
        }
    }

    #[test]
    fn test_attributes_and_sub() {
        let mut g: DenseBigraph = DenseBigraph::new(2, 2);
        g.set_ucap_constant(3);
        let a = g.adjacency(Node::new(0), Node::new(3)).unwrap();
        assert_eq!(g.ucap(a), 3);
        g.set_length(a, 4).unwrap();
        assert_eq!(g.length(a), 4);

        g.set_sub(a, 2).unwrap();
        assert_eq!(g.sub(a), 2);
        assert!(g.set_sub(a, 4).is_err());
        g.init_subgraph();
        assert_eq!(g.sub(a), 0);

        g.set_demand(Node::new(1), 5).unwrap();
        assert_eq!(g.demand(Node::new(1)), 5);
    }

    #[test]
    fn test_matches_sparse_backend() {
        use crate::bigraph::SparseBigraph;

        let dense: DenseBigraph = DenseBigraph::new(2, 2);
        let mut sparse: SparseBigraph = SparseBigraph::with_nodes(2, 2, 4);
        for a in dense.arcs() {
            let u = dense.start_node(a).unwrap();
            let v = dense.end_node(a).unwrap();
            assert_eq!(sparse.insert_arc(u, v).unwrap(), a);
        }
        for a in dense.arcs() {
            assert_eq!(dense.start_node(a), sparse.start_node(a));
            assert_eq!(dense.end_node(a), sparse.end_node(a));
        }
        assert_eq!(dense.n1(), sparse.n1());
    }
}
