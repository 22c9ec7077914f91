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

//! Constructors for frequently used graph classes.

use crate::bigraph::SparseBigraph;
use crate::sparse::SparseDigraph;
use crate::traits::Node;

/// Return a path with `n` arcs (and `n + 1` nodes).
pub fn path(n: usize) -> SparseDigraph {
    let mut g = SparseDigraph::with_capacity(n + 1, n);
    let vs: Vec<_> = (0..n + 1).map(|_| g.insert_node()).collect();
    for i in 0..n {
        g.insert_arc(vs[i], vs[i + 1]).unwrap();
    }
    g
}

/// Return a cycle on `n` nodes.
pub fn cycle(n: usize) -> SparseDigraph {
    let mut g = SparseDigraph::with_capacity(n, n);
    let vs: Vec<_> = (0..n).map(|_| g.insert_node()).collect();
    for i in 0..n {
        g.insert_arc(vs[i], vs[(i + 1) % n]).unwrap();
    }
    g
}

/// Return the complete graph on `n` nodes.
pub fn complete_graph(n: usize) -> SparseDigraph {
    let mut g = SparseDigraph::with_capacity(n, n * n.saturating_sub(1) / 2);
    let vs: Vec<_> = (0..n).map(|_| g.insert_node()).collect();
    for i in 0..n {
        for j in i + 1..n {
            g.insert_arc(vs[i], vs[j]).unwrap();
        }
    }
    g
}

/// Return a star with `l` rays from the center node 0.
pub fn star(l: usize) -> SparseDigraph {
    let mut g = SparseDigraph::with_capacity(l + 1, l);
    let c = g.insert_node();
    for _ in 0..l {
        let v = g.insert_node();
        g.insert_arc(c, v).unwrap();
    }
    g
}

/// Return the complete bipartite graph on `n1` and `n2` nodes, arcs in
/// pair index order `(0, n1), (0, n1 + 1), ...`.
pub fn complete_bipartite(n1: usize, n2: usize) -> SparseBigraph {
    let mut g = SparseBigraph::with_nodes(n1, n2, n1 * n2);
    for u in 0..n1 {
        for v in 0..n2 {
            g.insert_arc(Node::new(u), Node::new(n1 + v)).unwrap();
        }
    }
    g
}
