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

//! Capability traits for graph backends.
//!
//! Instead of a deep inheritance hierarchy there are two small capability
//! sets implemented by every backend:
//!
//! 1. [`GraphTopology`]: pure structure, the start/end nodes of arcs and
//!    the circular incidence rings (`first`/`right`).
//! 2. [`GraphAttributes`]: the scalar attributes algorithms consume, that
//!    is capacities, lengths, demands and subgraph multiplicities.
//!
//! Two concrete backends implement them (the sparse incidence-list
//! representation and the dense formula-addressed bipartite representation),
//! plus one computed view (the matching-to-flow reduction, which wraps a
//! bipartite backend rather than being a graph of its own).
//!
//! Nodes are dense integer indices in `[0, n)`. An arc *pair* `k` consists
//! of a forward half `2k` and a backward half `2k + 1`; the reverse of a
//! half is obtained by flipping the least significant bit. Attributes are
//! shared by both halves of a pair.

use crate::num::traits::NumAssign;

use std::fmt;
use std::ops::Range;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// An item that has an index.
pub trait Indexable {
    fn index(&self) -> usize;
}

/// A node of a graph.
///
/// This is basically a newtype of the node index.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct Node(pub(crate) u32);

impl Node {
    /// Return the node with the given index.
    pub fn new(id: usize) -> Self {
        Node(id as u32)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl Indexable for Node {
    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// One directed half of an arc pair.
///
/// Forward halves have even indices, the backward half of a pair directly
/// follows its forward half. `a.pair()` is the index shared by both halves
/// and is the index under which attributes are stored.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct Arc(pub(crate) u32);

impl Arc {
    /// Return the forward half of the pair with the given index.
    pub fn forward(pair: usize) -> Self {
        Arc((pair as u32) << 1)
    }

    /// Return the backward half of the pair with the given index.
    pub fn backward(pair: usize) -> Self {
        Arc(((pair as u32) << 1) | 1)
    }

    /// Return the oppositely directed half of the same pair.
    pub fn reverse(&self) -> Self {
        Arc(self.0 ^ 1)
    }

    /// Whether this is the forward half of its pair.
    pub fn is_forward(&self) -> bool {
        self.0 & 1 == 0
    }

    /// Whether this is the backward half of its pair.
    pub fn is_backward(&self) -> bool {
        self.0 & 1 == 1
    }

    /// The index of the arc pair this half belongs to.
    pub fn pair(&self) -> usize {
        (self.0 >> 1) as usize
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}{}", if self.is_forward() { "+" } else { "-" }, self.0 >> 1)
    }
}

impl Indexable for Arc {
    /// The raw half index (*not* the pair index, see [`Arc::pair`]).
    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The direction mode of an arc pair.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Orientation {
    /// The arc may be traversed in both directions.
    Undirected,
    /// Only the forward direction is admissible.
    Directed,
    /// Neither direction is admissible (the arc only carries structure).
    Blocking,
}

/// Access to the structure of a graph.
///
/// The incidence ring of a node `v` is the circular sequence obtained by
/// following [`right`](GraphTopology::right) from
/// [`first(v)`](GraphTopology::first); it visits every half starting at `v`
/// exactly once.
pub trait GraphTopology {
    /// Return the number of nodes.
    fn num_nodes(&self) -> usize;

    /// Return the number of arc pairs, including cancelled ones awaiting
    /// compaction.
    fn num_arcs(&self) -> usize;

    /// Return the node at which the half `a` starts.
    ///
    /// Returns `None` for a cancelled arc (the sentinel distinguishing
    /// cancelled-but-not-yet-compacted pairs).
    fn start_node(&self, a: Arc) -> Option<Node>;

    /// Return the node at which the half `a` ends.
    ///
    /// This is always the start node of the reverse half.
    fn end_node(&self, a: Arc) -> Option<Node> {
        self.start_node(a.reverse())
    }

    /// Return the first half of `v`'s incidence ring, if any.
    fn first(&self, v: Node) -> Option<Arc>;

    /// Return the successor of `a` in the incidence ring of its start node.
    fn right(&self, a: Arc) -> Arc;

    /// Return an iterator over all nodes.
    fn nodes(&self) -> Nodes {
        Nodes(0..self.num_nodes() as u32)
    }

    /// Return an iterator over the forward halves of all arc pairs.
    ///
    /// Cancelled pairs are included; filter with
    /// [`start_node`](GraphTopology::start_node) where it matters.
    fn arcs(&self) -> Arcs {
        Arcs(0..self.num_arcs() as u32)
    }

    /// Return an iterator walking `v`'s incidence ring once.
    fn incidences(&self, v: Node) -> Incidences<'_, Self>
    where
        Self: Sized,
    {
        let first = self.first(v);
        Incidences {
            g: self,
            first,
            cur: first,
        }
    }
}

/// An iterator over all nodes of a graph.
#[derive(Clone)]
pub struct Nodes(Range<u32>);

impl Iterator for Nodes {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        self.0.next().map(Node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// An iterator over the forward halves of all arc pairs of a graph.
#[derive(Clone)]
pub struct Arcs(Range<u32>);

impl Iterator for Arcs {
    type Item = Arc;

    fn next(&mut self) -> Option<Arc> {
        self.0.next().map(|k| Arc(k << 1))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// An iterator over one node's incidence ring.
pub struct Incidences<'a, G: ?Sized> {
    g: &'a G,
    first: Option<Arc>,
    cur: Option<Arc>,
}

impl<'a, G> Clone for Incidences<'a, G> {
    fn clone(&self) -> Self {
        Incidences {
            g: self.g,
            first: self.first,
            cur: self.cur,
        }
    }
}

impl<'a, G> Iterator for Incidences<'a, G>
where
    G: GraphTopology,
{
    type Item = Arc;

    fn next(&mut self) -> Option<Arc> {
        let a = self.cur?;
        let r = self.g.right(a);
        self.cur = if Some(r) == self.first { None } else { Some(r) };
        Some(a)
    }
}

/// Access to the scalar attributes of a graph.
///
/// Every accessor is a pure query with a documented default for attributes
/// that have never been set.
pub trait GraphAttributes: GraphTopology {
    /// The capacity/flow scalar type.
    type Flow: NumAssign + Ord + Copy;

    /// The length (cost) scalar type.
    type Cost: NumAssign + Ord + Copy;

    /// Return the upper capacity of the pair of `a` (default 1).
    fn ucap(&self, a: Arc) -> Self::Flow;

    /// Return the lower capacity of the pair of `a` (default 0).
    fn lcap(&self, a: Arc) -> Self::Flow;

    /// Return the length of the pair of `a` (default 0).
    fn length(&self, a: Arc) -> Self::Cost;

    /// Return the required flow balance at `v` (default 0).
    fn demand(&self, v: Node) -> Self::Flow;

    /// Return the current subgraph multiplicity of the pair of `a`
    /// (default 0).
    fn sub(&self, a: Arc) -> Self::Flow;

    /// Return the orientation mode of the pair of `a` (default
    /// [`Orientation::Directed`]).
    fn orientation(&self, a: Arc) -> Orientation;
}

/// A graph with a left/right node partition.
///
/// Nodes `0 .. n1` form the left-hand side, nodes `n1 .. n` the right-hand
/// side, and every arc joins the two sides. This is the seam that keeps the
/// matching-to-flow reduction agnostic of the backing representation.
pub trait BipartiteGraph: GraphAttributes {
    /// Return the number of left-hand nodes.
    fn n1(&self) -> usize;

    /// Return the number of right-hand nodes.
    fn n2(&self) -> usize {
        self.num_nodes() - self.n1()
    }

    /// Set the subgraph multiplicity of the pair of `a`.
    ///
    /// Fails with [`AmountOutOfRange`](crate::error::Error::AmountOutOfRange)
    /// unless `lcap(a) <= x <= ucap(a)`.
    fn set_sub(&mut self, a: Arc, x: Self::Flow) -> crate::error::Result<()>;

    /// Reset the subgraph multiplicities of all arcs to zero.
    fn init_subgraph(&mut self);
}

#[cfg(test)]
mod tests {
    use super::{Arc, Indexable, Node};

    #[test]
    fn test_arc_halves() {
        let a = Arc::forward(5);
        assert!(a.is_forward());
        assert_eq!(a.pair(), 5);
        assert_eq!(a.index(), 10);
        assert_eq!(a.reverse(), Arc::backward(5));
        assert_eq!(a.reverse().reverse(), a);
        assert!(a.reverse().is_backward());
        assert_eq!(a.reverse().pair(), 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(Node::new(3).to_string(), "3");
        assert_eq!(Arc::forward(2).to_string(), "+2");
        assert_eq!(Arc::backward(2).to_string(), "-2");
    }
}
