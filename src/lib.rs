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

//! A library of incidence-list graph representations and
//! degree-constrained bipartite assignment.
//!
//! The crate provides
//!
//! 1. a mutable sparse graph over circular incidence rings
//!    ([`SparseDigraph`]) with attribute pools, adjacency and degree
//!    caches and a compacting deletion lifecycle,
//! 2. bipartite backends on top of it ([`SparseBigraph`]) and beside it
//!    ([`DenseBigraph`], formula-addressed),
//! 3. the matching-to-flow reduction [`BigraphToDigraph`] together with
//!    an [`EdmondsKarp`] max-flow solver and the
//!    [`maximum_assignment`] driver.
//!
//! # Example
//!
//! ```
//! use matchflow::{maximum_assignment, Node, NodeBounds, SparseBigraph};
//! use matchflow::traits::{GraphAttributes, GraphTopology};
//!
//! // two workers, two tasks, three admissible combinations
//! let mut g: SparseBigraph = SparseBigraph::with_nodes(2, 2, 3);
//! g.insert_arc(Node::new(0), Node::new(2)).unwrap();
//! g.insert_arc(Node::new(0), Node::new(3)).unwrap();
//! g.insert_arc(Node::new(1), Node::new(3)).unwrap();
//!
//! assert!(maximum_assignment(&mut g, &NodeBounds::Uniform(1)).unwrap());
//!
//! // every node is matched exactly once
//! let matched: Vec<_> = g.arcs().filter(|&a| g.sub(a) == 1).collect();
//! assert_eq!(matched.len(), 2);
//! ```
//!
//! All graph types are single-threaded: adjacency, degree and reverse
//! pointer caches are rebuilt lazily behind `&mut self`.

pub mod attributes;
pub mod bigraph;
pub mod classes;
pub mod dense;
pub mod error;
mod incidence;
pub mod investigator;
pub mod matching;
pub mod maxflow;
pub mod reduction;
pub mod sparse;
pub mod traits;

pub use crate::bigraph::SparseBigraph;
pub use crate::dense::DenseBigraph;
pub use crate::error::{Error, Result};
pub use crate::investigator::{Investigator, InvestigatorPool};
pub use crate::matching::maximum_assignment;
pub use crate::maxflow::{edmondskarp, EdmondsKarp};
pub use crate::reduction::{BigraphToDigraph, NodeBounds};
pub use crate::sparse::{AdjacencyMethod, SparseDigraph};
pub use crate::traits::{Arc, Indexable, Node, Orientation};

pub mod num {
    pub use num_traits as traits;
}
