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

use std::fmt::Debug;
use thiserror::Error;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Index key trait that all tree index keys must implement
///
/// Comparison goes through the key's total order, so anything `Ord` qualifies.
pub trait IndexKey: Clone + Debug + Ord {}

impl<T> IndexKey for T where T: Clone + Debug + Ord {}

/// Types of indices available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// Plain binary search tree, no height guarantee
    Ordered,
    /// Height-balanced (AVL) binary search tree
    Balanced,
}

/// Errors that can occur during index operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Extraction was attempted on a heap with no elements
    #[error("Heap is empty")]
    EmptyHeap,
}

/// Common trait for the tree indices
///
/// Both implementations store exactly one value per key. Inserting an existing
/// key replaces its value; multi-map behaviour is layered on top by storing a
/// `Vec` per key and appending through [`append_to_group`].
pub trait Index<K, V>
where
    K: IndexKey,
{
    /// Insert a key-value pair, replacing the value if the key already exists
    fn insert(&mut self, key: K, value: V);

    /// Look up the value stored under a key
    fn search(&self, key: &K) -> Option<&V>;

    /// Look up the value stored under a key for in-place mutation
    fn search_mut(&mut self, key: &K) -> Option<&mut V>;

    /// Check if a key exists in the index
    fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Get the number of keys in the index
    fn len(&self) -> usize;

    /// Check if the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes on the longest root-to-leaf path (0 for an empty tree)
    fn height(&self) -> usize;

    /// Remove every entry
    fn clear(&mut self);

    /// Get the type of this index
    fn index_type(&self) -> IndexType;

    /// Snapshot of all entries in ascending key order
    fn in_order_traversal(&self) -> Vec<(&K, &V)>;

    /// All keys in ascending order
    fn keys<'a>(&'a self) -> Vec<&'a K>
    where
        V: 'a,
    {
        self.in_order_traversal().into_iter().map(|(k, _)| k).collect()
    }

    /// Get index statistics
    fn stats(&self) -> IndexStats {
        IndexStats {
            entry_count: self.len(),
            height: self.height(),
            index_type: self.index_type(),
        }
    }
}

/// Statistics about an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of keys in the index
    pub entry_count: usize,
    /// Height of the underlying tree
    pub height: usize,
    /// Index type
    pub index_type: IndexType,
}

/// Append an item to the list stored under `key`, creating the list lazily
pub fn append_to_group<I, K, T>(index: &mut I, key: K, item: T)
where
    I: Index<K, Vec<T>>,
    K: IndexKey,
{
    match index.search_mut(&key) {
        Some(group) => group.push(item),
        None => index.insert(key, vec![item]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indices::{BalancedIndex, OrderedIndex};

    #[test]
    fn test_append_to_group_creates_then_appends() {
        let mut index: OrderedIndex<u32, Vec<&str>> = OrderedIndex::new();

        append_to_group(&mut index, 7, "a");
        append_to_group(&mut index, 7, "b");
        append_to_group(&mut index, 3, "c");

        assert_eq!(index.len(), 2);
        assert_eq!(index.search(&7), Some(&vec!["a", "b"]));
        assert_eq!(index.search(&3), Some(&vec!["c"]));
    }

    #[test]
    fn test_stats_reports_type_and_height() {
        let mut index: BalancedIndex<i32, ()> = BalancedIndex::new();
        for i in 0..7 {
            index.insert(i, ());
        }

        let stats = index.stats();
        assert_eq!(stats.entry_count, 7);
        assert_eq!(stats.height, 3);
        assert_eq!(stats.index_type, IndexType::Balanced);
    }

    #[test]
    fn test_keys_in_ascending_order() {
        let mut ordered: OrderedIndex<i32, String> = OrderedIndex::new();
        let mut balanced: BalancedIndex<i32, String> = BalancedIndex::new();
        for key in [4, 1, 3, 2] {
            ordered.insert(key, key.to_string());
            balanced.insert(key, key.to_string());
        }

        assert_eq!(ordered.keys(), vec![&1, &2, &3, &4]);
        assert_eq!(balanced.keys(), ordered.keys());
    }

    #[test]
    fn test_empty_heap_error_display() {
        assert_eq!(IndexError::EmptyHeap.to_string(), "Heap is empty");
    }
}
