// Civitrack
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! In-memory indices
//!
//! Two tree indices share the [`Index`] trait: [`OrderedIndex`] is a plain
//! binary search tree and [`BalancedIndex`] an AVL tree. [`MinHeap`] backs the
//! priority views.

pub mod balanced_index;
pub mod lib;
pub mod min_heap;
pub mod ordered_index;

pub use balanced_index::BalancedIndex;
pub use lib::*;
pub use min_heap::MinHeap;
pub use ordered_index::OrderedIndex;
