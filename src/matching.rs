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

//! Degree-constrained bipartite assignment.
//!
//! A maximum assignment under node degree bounds is computed by deriving
//! the flow network of [`BigraphToDigraph`] and solving max-flow from its
//! synthetic source to its synthetic sink. The resulting flow is written
//! back through the reduction, so original arcs end up as subgraph
//! multiplicities in the bipartite graph while synthetic arcs stay in the
//! reduction's ledger.

use crate::error::Result;
use crate::maxflow::EdmondsKarp;
use crate::reduction::{BigraphToDigraph, NodeBounds};
use crate::traits::{Arc, BipartiteGraph, GraphAttributes, GraphTopology};

/// Compute a maximum degree-constrained assignment of `g` and store it in
/// the subgraph multiplicities.
///
/// Any previous subgraph is overwritten. Returns whether the assignment
/// is perfect, i.e. saturates every node's bound; falling short of that
/// is an expected outcome, not an error.
///
/// # Example
///
/// ```
/// use matchflow::{maximum_assignment, Node, NodeBounds, SparseBigraph};
///
/// let mut g: SparseBigraph = SparseBigraph::with_nodes(2, 2, 4);
/// g.insert_arc(Node::new(0), Node::new(2)).unwrap();
/// g.insert_arc(Node::new(1), Node::new(2)).unwrap();
/// g.insert_arc(Node::new(1), Node::new(3)).unwrap();
///
/// let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
/// assert!(perfect);
/// ```
pub fn maximum_assignment<B: BipartiteGraph>(
    g: &mut B,
    bounds: &NodeBounds<B::Flow>,
) -> Result<bool> {
    let mut network = BigraphToDigraph::new(g, bounds)?;
    let src = network.default_source();
    let snk = network.default_target();

    let target: Vec<B::Flow> = {
        let mut ek = EdmondsKarp::new(&network);
        ek.solve(src, snk, |a| network.ucap(a));
        (0..network.num_arcs())
            .map(|k| ek.flow(Arc::forward(k)))
            .collect()
    };

    for (k, &t) in target.iter().enumerate() {
        let cur = network.flow(Arc::forward(k));
        if t > cur {
            network.push(Arc::forward(k), t - cur)?;
        } else if cur > t {
            network.push(Arc::backward(k), cur - t)?;
        }
    }
    Ok(network.perfect())
}

#[cfg(test)]
mod tests {
    use super::maximum_assignment;
    use crate::bigraph::SparseBigraph;
    use crate::classes;
    use crate::dense::DenseBigraph;
    use crate::num::traits::Zero;
    use crate::reduction::NodeBounds;
    use crate::sparse::AdjacencyMethod;
    use crate::traits::{Arc, BipartiteGraph, GraphAttributes, GraphTopology, Node};

    fn matched_degree<B: BipartiteGraph>(g: &B, v: Node) -> B::Flow {
        let mut d = B::Flow::zero();
        for a in g.arcs() {
            if g.start_node(a) == Some(v) || g.end_node(a) == Some(v) {
                d += g.sub(a);
            }
        }
        d
    }

    #[test]
    fn test_perfect_matching() {
        let mut g = classes::complete_bipartite(2, 2);
        let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(perfect);
        for v in g.nodes() {
            assert_eq!(matched_degree(&g, v), 1);
        }
        // a matching selects whole arcs
        for a in g.arcs() {
            assert!(g.sub(a) == 0 || g.sub(a) == 1);
        }
    }

    #[test]
    fn test_one_sided_bounds_infeasible() {
        // both right nodes accept a single partner, so left degree two
        // is unreachable
        let mut g = classes::complete_bipartite(2, 2);
        let lower = [2, 2, 1, 1];
        let cap = [2, 2, 1, 1];
        let perfect =
            maximum_assignment(&mut g, &NodeBounds::Slices { lower: &lower, cap: &cap })
                .unwrap();
        assert!(!perfect);
        // the maximum assignment still saturates the right side
        assert_eq!(matched_degree(&g, Node::new(2)), 1);
        assert_eq!(matched_degree(&g, Node::new(3)), 1);
    }

    #[test]
    fn test_symmetric_degree_two_takes_every_arc() {
        // degree two on both sides is feasible over unit arcs: all four
        // arcs are selected
        let mut g = classes::complete_bipartite(2, 2);
        assert!(maximum_assignment(&mut g, &NodeBounds::Uniform(2)).unwrap());
        for a in g.arcs() {
            assert_eq!(g.sub(a), 1);
        }
    }

    #[test]
    fn test_structural_infeasibility() {
        // both left nodes compete for the same right node
        let mut g: SparseBigraph = SparseBigraph::with_nodes(2, 2, 2);
        g.insert_arc(Node::new(0), Node::new(2)).unwrap();
        g.insert_arc(Node::new(1), Node::new(2)).unwrap();
        let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(!perfect);
        // still a maximum assignment: one of the two arcs is matched
        let total: i32 = g.arcs().map(|a| g.sub(a)).sum();
        assert_eq!(total, 1);
        assert!(matched_degree(&g, Node::new(2)) <= 1);
    }

    #[test]
    fn test_degree_constrained() {
        // left node 0 may take both right partners
        let mut g = classes::complete_bipartite(1, 2);
        let lower = [2, 1, 1];
        let cap = [2, 1, 1];
        let perfect =
            maximum_assignment(&mut g, &NodeBounds::Slices { lower: &lower, cap: &cap })
                .unwrap();
        assert!(perfect);
        assert_eq!(matched_degree(&g, Node::new(0)), 2);
        assert_eq!(g.sub(Arc::forward(0)), 1);
        assert_eq!(g.sub(Arc::forward(1)), 1);
    }

    #[test]
    fn test_previous_subgraph_overwritten() {
        let mut g = classes::complete_bipartite(2, 2);
        let a = g
            .adjacency(Node::new(0), Node::new(2), AdjacencyMethod::Search)
            .unwrap();
        g.set_sub(a, 1).unwrap();

        let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(perfect);
        for v in g.nodes() {
            assert_eq!(matched_degree(&g, v), 1);
        }
    }

    #[test]
    fn test_dense_backend() {
        let mut g: DenseBigraph = DenseBigraph::new(3, 3);
        let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(perfect);
        for v in g.nodes() {
            assert_eq!(matched_degree(&g, v), 1);
        }

        // removing capacity breaks feasibility
        let mut g: DenseBigraph = DenseBigraph::new(3, 3);
        g.set_ucap_constant(0);
        let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(!perfect);
    }

    #[test]
    fn test_empty_graph() {
        let mut g: SparseBigraph = SparseBigraph::with_nodes(0, 0, 0);
        let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(perfect);
    }

    #[test]
    fn test_isolated_left_node_not_perfect() {
        let mut g: SparseBigraph = SparseBigraph::with_nodes(2, 1, 1);
        g.insert_arc(Node::new(0), Node::new(2)).unwrap();
        let perfect = maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap();
        assert!(!perfect);
        // the reachable part is still assigned
        assert_eq!(g.sub(Arc::forward(0)), 1);
    }
}
