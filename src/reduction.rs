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

//! The bipartite-matching-to-flow reduction.
//!
//! [`BigraphToDigraph`] wraps a mutable bipartite graph and presents a
//! directed flow network in which a degree-constrained assignment is a
//! feasible flow. The derived network has four synthetic nodes
//! (`s1 = n0`, `t1 = n0 + 1`, `s2 = n0 + 2`, `t2 = n0 + 3`) and
//! `m0 + 2·n0 + 4` arc pairs over the combined index space:
//!
//! * pairs `k < m0` are the original arcs, unchanged index, forward half
//!   left → right, capacity and (shifted, see below) length copied;
//! * pair `m0 + v` is the *bound* arc of node `v`, carrying its mandatory
//!   degree: `s1 → v` for left nodes, `v → t1` for right nodes, capacity
//!   `lower(v)`;
//! * pair `m0 + n0 + v` is the *slack* arc of `v`, carrying optional
//!   degree beyond the bound: `s2 → v` or `v → t2`, capacity
//!   `cap(v) − lower(v)`;
//! * the four connectors `ret1 (t1→s1)`, `ret2 (t2→s2)`, `art1 (t1→s2)`
//!   and `art2 (t2→s1)` close the circulation, with capacities derived
//!   from the bound sums.
//!
//! Lengths are shifted by the most negative original length so a cost
//! oriented solver sees non-negative arc costs. Demands at `s1`/`t1`
//! encode the net circulation a min-cost-circulation solver must realize.
//!
//! [`push`](BigraphToDigraph::push) is the only mutation entry point.
//! Flow pushed on an original pair lands in the wrapped graph's subgraph
//! multiplicity; flow on a synthetic pair lands in an internal degree
//! ledger and never touches the wrapped graph's pools.
//!
//! Bound configurations are not validated up front: inconsistent bounds
//! produce an infeasible network that [`perfect`](BigraphToDigraph::perfect)
//! reports as `false`, not a hard error.

use crate::error::{Error, Result};
use crate::incidence::NO_INDEX;
use crate::num::traits::Zero;
use crate::traits::{
    Arc, BipartiteGraph, GraphAttributes, GraphTopology, Indexable, Node, Orientation,
};

/// Degree bounds for the reduction, uniform or per node.
#[derive(Clone, Copy, Debug)]
pub enum NodeBounds<'b, F> {
    /// Every node has this value as both lower bound and capacity.
    Uniform(F),
    /// Explicit per-node bounds, each slice indexed by node.
    Slices { lower: &'b [F], cap: &'b [F] },
}

/// A flow network derived from a bipartite graph.
pub struct BigraphToDigraph<'a, B: BipartiteGraph> {
    g: &'a mut B,
    n0: usize,
    m0: usize,
    n1: usize,
    lower: Vec<B::Flow>,
    cap: Vec<B::Flow>,
    sum_lower1: B::Flow,
    sum_lower2: B::Flow,
    sum_upper: B::Flow,
    shift: B::Cost,
    /// Flow on the synthetic pairs, indexed by `pair - m0`. The first
    /// `2·n0` entries double as the realized mandatory/optional degree of
    /// each node.
    dgl: Vec<B::Flow>,
    first_d: Vec<u32>,
    right_d: Vec<u32>,
}

impl<'a, B: BipartiteGraph> BigraphToDigraph<'a, B> {
    /// Derive the flow network of `g` under the given degree bounds.
    ///
    /// `g` must be compacted (no cancelled pairs). If any node's current
    /// subgraph degree already exceeds its capacity the subgraph is reset
    /// to zero first; otherwise the existing flow values are taken over
    /// into the ledger.
    pub fn new(g: &'a mut B, bounds: &NodeBounds<B::Flow>) -> Result<Self> {
        let n0 = g.num_nodes();
        let m0 = g.num_arcs();
        let n1 = g.n1();

        for k in 0..m0 {
            let a = Arc::forward(k);
            match (g.start_node(a), g.end_node(a)) {
                (Some(u), Some(v)) if u.index() < n1 && v.index() >= n1 => {}
                (Some(_), Some(_)) => {
                    return Err(Error::Rejected(
                        "forward halves must run from the left-hand side",
                    ))
                }
                _ => {
                    return Err(Error::Rejected(
                        "the graph must be compacted before deriving a flow network",
                    ))
                }
            }
        }

        let (lower, cap): (Vec<B::Flow>, Vec<B::Flow>) = match *bounds {
            NodeBounds::Uniform(c) => (vec![c; n0], vec![c; n0]),
            NodeBounds::Slices { lower, cap } => {
                if lower.len() != n0 || cap.len() != n0 {
                    return Err(Error::Rejected("bound slices must cover every node"));
                }
                (lower.to_vec(), cap.to_vec())
            }
        };

        let mut sum_lower1 = B::Flow::zero();
        let mut sum_lower2 = B::Flow::zero();
        let mut sum_upper = B::Flow::zero();
        for v in 0..n0 {
            if v < n1 {
                sum_lower1 += lower[v];
            } else {
                sum_lower2 += lower[v];
            }
            sum_upper += cap[v];
        }

        let mut shift = B::Cost::zero();
        for k in 0..m0 {
            let l = g.length(Arc::forward(k));
            if l + shift < B::Cost::zero() {
                shift = B::Cost::zero() - l;
            }
        }

        // Current per-node degrees decide whether the existing subgraph
        // can seed the ledger or has to go.
        let mut deg = vec![B::Flow::zero(); n0];
        for k in 0..m0 {
            let a = Arc::forward(k);
            let s = g.sub(a);
            if s != B::Flow::zero() {
                deg[g.start_node(a).unwrap().index()] += s;
                deg[g.end_node(a).unwrap().index()] += s;
            }
        }
        if (0..n0).any(|v| deg[v] > cap[v]) {
            g.init_subgraph();
            for d in deg.iter_mut() {
                *d = B::Flow::zero();
            }
        }

        let mut dgl = vec![B::Flow::zero(); 2 * n0 + 4];
        for v in 0..n0 {
            let bound = if deg[v] < lower[v] { deg[v] } else { lower[v] };
            dgl[v] = bound;
            dgl[n0 + v] = deg[v] - bound;
        }

        let (first_d, right_d) = Self::build_rings(g, n0, m0, n1);

        Ok(BigraphToDigraph {
            g,
            n0,
            m0,
            n1,
            lower,
            cap,
            sum_lower1,
            sum_lower2,
            sum_upper,
            shift,
            dgl,
            first_d,
            right_d,
        })
    }

    fn build_rings(g: &B, n0: usize, m0: usize, n1: usize) -> (Vec<u32>, Vec<u32>) {
        let pairs = m0 + 2 * n0 + 4;
        let mut first = vec![NO_INDEX; n0 + 4];
        let mut right = vec![NO_INDEX; 2 * pairs];
        let mut last = vec![NO_INDEX; n0 + 4];

        let fwd = |k: usize| (2 * k) as u32;
        let back = |k: usize| (2 * k + 1) as u32;

        {
            let mut append = |v: usize, h: u32| {
                if first[v] == NO_INDEX {
                    first[v] = h;
                } else {
                    right[last[v] as usize] = h;
                }
                last[v] = h;
            };

            for v in 0..n0 {
                for a in g.incidences(Node::new(v)) {
                    append(v, a.index() as u32);
                }
                if v < n1 {
                    append(v, back(m0 + v));
                    append(v, back(m0 + n0 + v));
                } else {
                    append(v, fwd(m0 + v));
                    append(v, fwd(m0 + n0 + v));
                }
            }

            let (s1, t1, s2, t2) = (n0, n0 + 1, n0 + 2, n0 + 3);
            let ret1 = m0 + 2 * n0;
            let (ret2, art1, art2) = (ret1 + 1, ret1 + 2, ret1 + 3);

            for v in 0..n1 {
                append(s1, fwd(m0 + v));
            }
            append(s1, back(ret1));
            append(s1, back(art2));

            for v in n1..n0 {
                append(t1, back(m0 + v));
            }
            append(t1, fwd(ret1));
            append(t1, fwd(art1));

            for v in 0..n1 {
                append(s2, fwd(m0 + n0 + v));
            }
            append(s2, back(ret2));
            append(s2, back(art1));

            for v in n1..n0 {
                append(t2, back(m0 + n0 + v));
            }
            append(t2, fwd(ret2));
            append(t2, fwd(art2));
        }

        for v in 0..n0 + 4 {
            if last[v] != NO_INDEX {
                right[last[v] as usize] = first[v];
            }
        }
        (first, right)
    }

    /// Tail and head of the forward half of a synthetic pair.
    fn ends(&self, k: usize) -> (usize, usize) {
        let (s1, t1, s2, t2) = (self.n0, self.n0 + 1, self.n0 + 2, self.n0 + 3);
        let i = k - self.m0;
        if i < self.n0 {
            // bound arc of node i
            if i < self.n1 {
                (s1, i)
            } else {
                (i, t1)
            }
        } else if i < 2 * self.n0 {
            // slack arc
            let v = i - self.n0;
            if v < self.n1 {
                (s2, v)
            } else {
                (v, t2)
            }
        } else {
            match i - 2 * self.n0 {
                0 => (t1, s1), // ret1
                1 => (t2, s2), // ret2
                2 => (t1, s2), // art1
                _ => (t2, s1), // art2
            }
        }
    }

    /// The source saturated by a perfect assignment.
    pub fn default_source(&self) -> Node {
        Node::new(self.n0)
    }

    /// The sink of the mandatory-degree flow.
    pub fn default_target(&self) -> Node {
        Node::new(self.n0 + 1)
    }

    pub fn original_arcs(&self) -> usize {
        self.m0
    }

    pub fn original_nodes(&self) -> usize {
        self.n0
    }

    /// Read access to the wrapped bipartite graph.
    pub fn graph(&self) -> &B {
        self.g
    }

    /// Current flow on the pair of `a`: the wrapped graph's subgraph
    /// value for original pairs, the ledger entry for synthetic ones.
    pub fn flow(&self, a: Arc) -> B::Flow {
        let k = a.pair();
        if k < self.m0 {
            self.g.sub(a)
        } else {
            self.dgl[k - self.m0]
        }
    }

    /// Residual capacity of the half `a`.
    pub fn rescap(&self, a: Arc) -> B::Flow {
        let f = self.flow(a);
        if a.is_forward() {
            self.ucap(a) - f
        } else {
            f
        }
    }

    /// Push `lambda` units of flow in the direction of `a`.
    ///
    /// Original pairs route into the wrapped graph's subgraph value,
    /// signed by the half's parity; synthetic pairs only move the ledger.
    /// Violating `0 <= flow <= ucap` fails with `AmountOutOfRange` and
    /// changes nothing.
    pub fn push(&mut self, a: Arc, lambda: B::Flow) -> Result<()> {
        let k = a.pair();
        if k >= self.m0 + 2 * self.n0 + 4 {
            return Err(Error::NoSuchArc(a.index()));
        }
        let cur = self.flow(a);
        if a.is_backward() && lambda > cur {
            return Err(Error::AmountOutOfRange);
        }
        let new = if a.is_forward() {
            cur + lambda
        } else {
            cur - lambda
        };
        if k < self.m0 {
            self.g.set_sub(Arc::forward(k), new)
        } else {
            if new > self.ucap(a) {
                return Err(Error::AmountOutOfRange);
            }
            self.dgl[k - self.m0] = new;
            Ok(())
        }
    }

    /// Whether the current flow realizes a perfect (fully
    /// degree-satisfying) assignment: no residual capacity leaves `s1`.
    pub fn perfect(&self) -> bool {
        let s1 = self.default_source();
        self.incidences(s1).all(|a| self.rescap(a) == B::Flow::zero())
    }
}

impl<'a, B: BipartiteGraph> GraphTopology for BigraphToDigraph<'a, B> {
    fn num_nodes(&self) -> usize {
        self.n0 + 4
    }

    fn num_arcs(&self) -> usize {
        self.m0 + 2 * self.n0 + 4
    }

    fn start_node(&self, a: Arc) -> Option<Node> {
        let k = a.pair();
        if k < self.m0 {
            self.g.start_node(a)
        } else {
            let (tail, head) = self.ends(k);
            Some(Node::new(if a.is_forward() { tail } else { head }))
        }
    }

    fn first(&self, v: Node) -> Option<Arc> {
        match self.first_d[v.index()] {
            NO_INDEX => None,
            h => Some(Arc(h)),
        }
    }

    fn right(&self, a: Arc) -> Arc {
        Arc(self.right_d[a.index()])
    }
}

impl<'a, B: BipartiteGraph> GraphAttributes for BigraphToDigraph<'a, B> {
    type Flow = B::Flow;
    type Cost = B::Cost;

    fn ucap(&self, a: Arc) -> B::Flow {
        let k = a.pair();
        if k < self.m0 {
            return self.g.ucap(a);
        }
        let i = k - self.m0;
        if i < self.n0 {
            self.lower[i]
        } else if i < 2 * self.n0 {
            let v = i - self.n0;
            if self.cap[v] > self.lower[v] {
                self.cap[v] - self.lower[v]
            } else {
                B::Flow::zero()
            }
        } else {
            match i - 2 * self.n0 {
                0 | 1 => self.sum_upper,
                2 => self.sum_lower1,
                _ => self.sum_lower2,
            }
        }
    }

    fn lcap(&self, _a: Arc) -> B::Flow {
        B::Flow::zero()
    }

    fn length(&self, a: Arc) -> B::Cost {
        if a.pair() < self.m0 {
            self.g.length(a) + self.shift
        } else {
            B::Cost::zero()
        }
    }

    fn demand(&self, v: Node) -> B::Flow {
        let i = v.index();
        let circulation = self.sum_lower1 + self.sum_lower2;
        if i < self.n0 {
            self.g.demand(v)
        } else if i == self.n0 {
            circulation
        } else if i == self.n0 + 1 {
            B::Flow::zero() - circulation
        } else {
            B::Flow::zero()
        }
    }

    fn sub(&self, a: Arc) -> B::Flow {
        self.flow(a)
    }

    fn orientation(&self, _a: Arc) -> Orientation {
        Orientation::Directed
    }
}

#[cfg(test)]
mod tests {
    use super::{BigraphToDigraph, NodeBounds};
    use crate::bigraph::SparseBigraph;
    use crate::traits::{
        Arc, BipartiteGraph, GraphAttributes, GraphTopology, Indexable, Node,
    };

    fn two_by_two() -> SparseBigraph {
        let mut g = SparseBigraph::with_nodes(2, 2, 4);
        for u in 0..2 {
            for v in 2..4 {
                g.insert_arc(Node::new(u), Node::new(v)).unwrap();
            }
        }
        g
    }

    fn check_rings<G: GraphTopology>(g: &G) {
        let mut seen = vec![0usize; 2 * g.num_arcs()];
        for v in g.nodes() {
            for a in g.incidences(v) {
                assert_eq!(g.start_node(a), Some(v));
                assert_eq!(g.end_node(a), g.start_node(a.reverse()));
                seen[a.index()] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_derived_layout() {
        let mut g = two_by_two();
        let d = BigraphToDigraph::new(&mut g, &NodeBounds::Uniform(1)).unwrap();

        assert_eq!(d.num_nodes(), 8);
        assert_eq!(d.num_arcs(), 4 + 2 * 4 + 4);
        check_rings(&d);

        let (s1, t1, s2, t2) = (Node::new(4), Node::new(5), Node::new(6), Node::new(7));
        assert_eq!(d.default_source(), s1);
        assert_eq!(d.default_target(), t1);

        // bound arc of left node 0: s1 -> 0, capacity lower(0)
        let b0 = Arc::forward(4);
        assert_eq!(d.start_node(b0), Some(s1));
        assert_eq!(d.end_node(b0), Some(Node::new(0)));
        assert_eq!(d.ucap(b0), 1);
        // bound arc of right node 2: 2 -> t1
        let b2 = Arc::forward(6);
        assert_eq!(d.start_node(b2), Some(Node::new(2)));
        assert_eq!(d.end_node(b2), Some(t1));
        // uniform bounds leave no slack
        let sl0 = Arc::forward(8);
        assert_eq!(d.start_node(sl0), Some(s2));
        assert_eq!(d.ucap(sl0), 0);
        // connectors
        let ret1 = Arc::forward(12);
        assert_eq!(d.start_node(ret1), Some(t1));
        assert_eq!(d.end_node(ret1), Some(s1));
        assert_eq!(d.ucap(ret1), 4);
        let art2 = Arc::forward(15);
        assert_eq!(d.start_node(art2), Some(t2));
        assert_eq!(d.end_node(art2), Some(s1));
        assert_eq!(d.ucap(art2), 2);

        // demands encode the required circulation
        assert_eq!(d.demand(s1), 4);
        assert_eq!(d.demand(t1), -4);
        assert_eq!(d.demand(s2), 0);
        assert_eq!(d.demand(t2), 0);
    }

    #[test]
    fn test_push_isolation() {
        let mut g = two_by_two();
        {
            let mut d = BigraphToDigraph::new(&mut g, &NodeBounds::Uniform(1)).unwrap();

            // synthetic pushes live in the ledger only
            d.push(Arc::forward(4), 1).unwrap();
            assert_eq!(d.flow(Arc::forward(4)), 1);
            for k in 0..4 {
                assert_eq!(d.graph().sub(Arc::forward(k)), 0);
            }

            // original pushes land in exactly one subgraph value
            d.push(Arc::forward(0), 1).unwrap();
            assert_eq!(d.graph().sub(Arc::forward(0)), 1);
            for k in 1..4 {
                assert_eq!(d.graph().sub(Arc::forward(k)), 0);
            }

            // backward push withdraws
            d.push(Arc::backward(0), 1).unwrap();
            assert_eq!(d.graph().sub(Arc::forward(0)), 0);
            assert!(d.push(Arc::backward(0), 1).is_err());
            assert!(d.push(Arc::forward(4), 1).is_err()); // over capacity
            assert_eq!(d.flow(Arc::forward(4)), 1);
        }
        assert_eq!(g.sub(Arc::forward(0)), 0);
    }

    #[test]
    fn test_manual_saturation_is_perfect() {
        let mut g: SparseBigraph = SparseBigraph::with_nodes(1, 1, 1);
        g.insert_arc(Node::new(0), Node::new(1)).unwrap();
        let mut d = BigraphToDigraph::new(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(!d.perfect());

        // s1 -> 0 -> 1 -> t1
        d.push(Arc::forward(1), 1).unwrap(); // bound arc of node 0
        d.push(Arc::forward(0), 1).unwrap(); // the original arc
        d.push(Arc::forward(2), 1).unwrap(); // bound arc of node 1
        assert!(d.perfect());
        assert_eq!(d.graph().sub(Arc::forward(0)), 1);
    }

    #[test]
    fn test_existing_subgraph_seeds_ledger() {
        let mut g: SparseBigraph = SparseBigraph::with_nodes(1, 1, 1);
        let a = g.insert_arc_with(Node::new(0), Node::new(1), 2, 0, 0).unwrap();
        g.set_sub(a, 1).unwrap();

        let d = BigraphToDigraph::new(&mut g, &NodeBounds::Uniform(1)).unwrap();
        // degree 1 within bounds: taken over as mandatory degree
        assert_eq!(d.flow(Arc::forward(1)), 1);
        assert!(d.perfect());
    }

    #[test]
    fn test_excessive_subgraph_is_reset() {
        let mut g: SparseBigraph = SparseBigraph::with_nodes(1, 1, 1);
        let a = g.insert_arc_with(Node::new(0), Node::new(1), 2, 0, 0).unwrap();
        g.set_sub(a, 2).unwrap();

        let d = BigraphToDigraph::new(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert_eq!(d.graph().sub(a), 0);
        assert_eq!(d.flow(Arc::forward(1)), 0);
    }

    #[test]
    fn test_per_node_bounds() {
        let mut g = two_by_two();
        let lower = [1, 0, 1, 0];
        let cap = [2, 1, 2, 1];
        let d =
            BigraphToDigraph::new(&mut g, &NodeBounds::Slices { lower: &lower, cap: &cap })
                .unwrap();
        assert_eq!(d.ucap(Arc::forward(4)), 1); // bound of node 0
        assert_eq!(d.ucap(Arc::forward(5)), 0); // bound of node 1
        assert_eq!(d.ucap(Arc::forward(8)), 1); // slack of node 0
        assert_eq!(d.ucap(Arc::forward(9)), 1); // slack of node 1
        assert_eq!(d.demand(d.default_source()), 2);

        let short = [1, 0];
        assert!(BigraphToDigraph::new(
            &mut two_by_two(),
            &NodeBounds::Slices { lower: &short, cap: &short }
        )
        .is_err());
    }

    #[test]
    fn test_rejects_uncompacted_graph() {
        let mut g = two_by_two();
        g.cancel_arc(Arc::forward(0)).unwrap();
        assert!(BigraphToDigraph::new(&mut g, &NodeBounds::Uniform(1)).is_err());
        g.delete_arcs();
        assert!(BigraphToDigraph::new(&mut g, &NodeBounds::Uniform(1)).is_ok());
    }
}
