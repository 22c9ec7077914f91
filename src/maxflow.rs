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

//! The max-flow algorithm of Edmonds and Karp.
//!
//! Runs on anything implementing [`GraphTopology`], in particular on the
//! derived flow network of the matching reduction, and treats each arc
//! half as a residual edge: the forward half of pair `k` starts with the
//! pair's capacity, the backward half with zero, and augmenting along a
//! half moves capacity to its reverse.

use crate::num::traits::NumAssign;
use crate::traits::{Arc, GraphTopology, Indexable, Node};

use std::collections::VecDeque;

/// The Edmonds-Karp max-flow solver.
pub struct EdmondsKarp<'a, G, F> {
    g: &'a G,
    /// Residual capacity per arc half.
    res: Vec<F>,
    value: F,
}

impl<'a, G, F> EdmondsKarp<'a, G, F>
where
    G: GraphTopology,
    F: NumAssign + Ord + Copy,
{
    pub fn new(g: &'a G) -> Self {
        EdmondsKarp {
            g,
            res: vec![F::zero(); 2 * g.num_arcs()],
            value: F::zero(),
        }
    }

    /// Return the value of the latest computed flow.
    pub fn value(&self) -> F {
        self.value
    }

    /// Return the flow over the pair of `a` in forward direction.
    pub fn flow(&self, a: Arc) -> F {
        self.res[Arc::backward(a.pair()).index()]
    }

    /// Run the algorithm from `src` to `snk` with the given upper
    /// capacity function (queried on forward halves).
    pub fn solve<Us>(&mut self, src: Node, snk: Node, upper: Us)
    where
        Us: Fn(Arc) -> F,
    {
        for k in 0..self.g.num_arcs() {
            self.res[Arc::forward(k).index()] = upper(Arc::forward(k));
            self.res[Arc::backward(k).index()] = F::zero();
        }
        self.value = F::zero();

        let mut pred: Vec<Option<Arc>> = vec![None; self.g.num_nodes()];
        loop {
            // shortest augmenting path in the residual network
            for p in pred.iter_mut() {
                *p = None;
            }
            let mut queue = VecDeque::new();
            queue.push_back(src);
            'bfs: while let Some(u) = queue.pop_front() {
                for a in self.g.incidences(u) {
                    if self.res[a.index()] == F::zero() {
                        continue;
                    }
                    let v = match self.g.end_node(a) {
                        Some(v) => v,
                        None => continue,
                    };
                    if v != src && pred[v.index()].is_none() {
                        pred[v.index()] = Some(a);
                        if v == snk {
                            break 'bfs;
                        }
                        queue.push_back(v);
                    }
                }
            }
            if pred[snk.index()].is_none() {
                break;
            }

            // bottleneck along the path
            let mut delta = None;
            let mut v = snk;
            while v != src {
                let a = pred[v.index()].unwrap();
                let r = self.res[a.index()];
                delta = Some(match delta {
                    Some(d) if d < r => d,
                    _ => r,
                });
                v = self.g.start_node(a).unwrap();
            }
            let delta = delta.unwrap();

            // augment
            let mut v = snk;
            while v != src {
                let a = pred[v.index()].unwrap();
                self.res[a.index()] -= delta;
                self.res[a.reverse().index()] += delta;
                v = self.g.start_node(a).unwrap();
            }
            self.value += delta;
        }
    }

    /// Return the source side of a minimum cut for the latest computed
    /// flow: all nodes reachable from `src` in the residual network.
    pub fn mincut(&self, src: Node) -> Vec<Node> {
        let mut seen = vec![false; self.g.num_nodes()];
        seen[src.index()] = true;
        let mut queue = VecDeque::new();
        queue.push_back(src);
        let mut cut = vec![src];
        while let Some(u) = queue.pop_front() {
            for a in self.g.incidences(u) {
                if self.res[a.index()] == F::zero() {
                    continue;
                }
                if let Some(v) = self.g.end_node(a) {
                    if !seen[v.index()] {
                        seen[v.index()] = true;
                        cut.push(v);
                        queue.push_back(v);
                    }
                }
            }
        }
        cut
    }
}

/// Solve a max-flow problem, returning the flow value and the flow over
/// each arc pair.
pub fn edmondskarp<G, F, Us>(g: &G, src: Node, snk: Node, upper: Us) -> (F, Vec<F>)
where
    G: GraphTopology,
    F: NumAssign + Ord + Copy,
    Us: Fn(Arc) -> F,
{
    let mut ek = EdmondsKarp::new(g);
    ek.solve(src, snk, upper);
    let flows = (0..g.num_arcs()).map(|k| ek.flow(Arc::forward(k))).collect();
    (ek.value(), flows)
}
