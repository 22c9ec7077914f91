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

//! Tri-state attribute storage.
//!
//! Graphs carry a dozen per-node and per-arc attributes (capacities,
//! lengths, colours, coordinates, ...), most of which are never touched or
//! stay at one uniform value. An [`Attribute`] therefore materializes its
//! backing vector only on the first genuinely non-uniform write:
//!
//! * `Unset`: every item has the attribute's default value,
//! * `Constant(c)`: every item has the value `c`,
//! * `Array(vec)`: items have individual values.
//!
//! Reads never allocate. Writes promote the representation as needed and
//! never demote it; [`release`](Attribute::release) returns to `Unset`
//! explicitly.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// A per-item attribute with lazily materialized storage.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub enum Attribute<T> {
    /// Every item has the default value.
    Unset,
    /// Every item has this value.
    Constant(T),
    /// Items have individual values.
    Array(Vec<T>),
}

impl<T> Default for Attribute<T> {
    fn default() -> Self {
        Attribute::Unset
    }
}

impl<T> Attribute<T>
where
    T: Clone + PartialEq,
{
    /// Return the value of item `i`, with `default` standing in for `Unset`.
    pub fn value(&self, i: usize, default: T) -> T {
        match self {
            Attribute::Unset => default,
            Attribute::Constant(c) => c.clone(),
            Attribute::Array(vec) => vec[i].clone(),
        }
    }

    /// Return a reference to the value of item `i`, or `None` while no
    /// individual or constant value has been assigned.
    pub fn get(&self, i: usize) -> Option<&T> {
        match self {
            Attribute::Unset => None,
            Attribute::Constant(c) => Some(c),
            Attribute::Array(vec) => vec.get(i),
        }
    }

    /// Assign the same value to all items, dropping any backing vector.
    pub fn set_constant(&mut self, c: T) {
        *self = Attribute::Constant(c);
    }

    /// Assign `x` to item `i` in an attribute covering `len` items.
    ///
    /// Writing the value all items already share is a no-op; otherwise the
    /// representation is promoted to `Array`.
    pub fn set(&mut self, i: usize, x: T, len: usize, default: T) {
        match self {
            Attribute::Unset => {
                if x == default {
                    return;
                }
                let mut vec = vec![default; len];
                vec[i] = x;
                *self = Attribute::Array(vec);
            }
            Attribute::Constant(c) => {
                if x == *c {
                    return;
                }
                let mut vec = vec![c.clone(); len];
                vec[i] = x;
                *self = Attribute::Array(vec);
            }
            Attribute::Array(vec) => vec[i] = x,
        }
    }

    /// Extend the attribute by one item with value `x`, where `old_len` is
    /// the item count before the insertion.
    pub fn push(&mut self, x: T, old_len: usize, default: T) {
        match self {
            Attribute::Unset => {
                if x != default {
                    let mut vec = vec![default; old_len];
                    vec.push(x);
                    *self = Attribute::Array(vec);
                }
            }
            Attribute::Constant(c) => {
                if x != *c {
                    let mut vec = vec![c.clone(); old_len];
                    vec.push(x);
                    *self = Attribute::Array(vec);
                }
            }
            Attribute::Array(vec) => vec.push(x),
        }
    }

    /// Exchange the values of items `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        if let Attribute::Array(vec) = self {
            vec.swap(i, j);
        }
    }

    /// Drop all items at indices `>= len`.
    pub fn truncate(&mut self, len: usize) {
        if let Attribute::Array(vec) = self {
            vec.truncate(len);
        }
    }

    /// Return the attribute to the `Unset` state, releasing its storage.
    pub fn release(&mut self) {
        *self = Attribute::Unset;
    }
}
