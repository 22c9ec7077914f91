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

//! Error type for graph operations.
//!
//! Two kinds of failures are reported through [`Error`]:
//!
//! 1. *Range errors* ([`Error::NoSuchNode`], [`Error::NoSuchArc`],
//!    [`Error::AmountOutOfRange`]): an index or value argument falls outside
//!    its valid domain.
//! 2. *Rejected operations* ([`Error::Rejected`]): the operation is
//!    structurally impossible in the current state, e.g. inserting an arc
//!    between two nodes on the same side of a bipartition, or moving a
//!    non-isolated node across the partition boundary.
//!
//! Expected negative outcomes are *not* errors: a failed adjacency query
//! returns `None` and an imperfect assignment is reported as `false`. A
//! failed operation never leaves the graph partially mutated.

use std::fmt;

/// Error raised by graph operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The node index does not denote a node of this graph.
    NoSuchNode(usize),
    /// The arc index does not denote a live arc of this graph.
    NoSuchArc(usize),
    /// A flow or multiplicity value violates the arc's capacity bounds.
    AmountOutOfRange,
    /// The operation is structurally impossible in the current state.
    Rejected(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoSuchNode(v) => write!(f, "no such node: {}", v),
            Error::NoSuchArc(a) => write!(f, "no such arc: {}", a),
            Error::AmountOutOfRange => write!(f, "amount violates capacity bounds"),
            Error::Rejected(reason) => write!(f, "operation rejected: {}", reason),
        }
    }
}

impl std::error::Error for Error {}

/// Result of graph operations.
pub type Result<T> = std::result::Result<T, Error>;
