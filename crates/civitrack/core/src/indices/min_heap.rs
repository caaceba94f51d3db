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

//! Array-backed binary min-heap
//!
//! Elements order themselves through `Ord`, so composite priorities are
//! expressed by deriving `Ord` on an entry struct whose fields are listed in
//! comparison order (for example priority first, then submission time).

use super::lib::{IndexError, IndexResult};
use tracing::trace;

/// Binary min-heap stored in a `Vec`
///
/// Cloning copies the backing array, so a clone can be drained to read the top
/// entries without disturbing the source heap.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    items: Vec<T>,
}

impl<T: Ord> MinHeap<T> {
    /// Create a new empty heap
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty heap with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity) }
    }

    /// Insert an element and restore the heap order
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Remove and return the smallest element
    pub fn extract_min(&mut self) -> IndexResult<T> {
        if self.items.is_empty() {
            return Err(IndexError::EmptyHeap);
        }

        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let min = self.items.pop().ok_or(IndexError::EmptyHeap)?;
        if !self.items.is_empty() {
            self.sift_down(0);
        }

        trace!(remaining = self.items.len(), "Extracted heap minimum");
        Ok(min)
    }

    /// Smallest element without removing it
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.items[index] >= self.items[parent] {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.items[left] < self.items[smallest] {
                smallest = left;
            }
            if right < len && self.items[right] < self.items[smallest] {
                smallest = right;
            }
            if smallest == index {
                break;
            }

            self.items.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T: Ord + Clone> MinHeap<T> {
    /// Up to `count` smallest elements in ascending order, leaving the heap untouched
    pub fn top_k(&self, count: usize) -> Vec<T> {
        let mut scratch = self.clone();
        let mut top = Vec::with_capacity(count.min(scratch.len()));
        while top.len() < count {
            match scratch.extract_min() {
                Ok(item) => top.push(item),
                Err(_) => break,
            }
        }
        top
    }
}

impl<T: Ord> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for MinHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::new();
        for item in iter {
            heap.insert(item);
        }
        heap
    }
}
