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

use super::lib::{Index, IndexKey, IndexType};
use std::cmp::Ordering;

/// Binary search tree node
#[derive(Debug)]
struct OrderedNode<K, V> {
    key: K,
    value: V,
    left: Option<Box<OrderedNode<K, V>>>,
    right: Option<Box<OrderedNode<K, V>>>,
}

impl<K, V> OrderedNode<K, V> {
    fn new(key: K, value: V) -> Self {
        Self { key, value, left: None, right: None }
    }
}

/// Unbalanced binary search tree index
///
/// Nodes are owned directly by their parent. Insertion never rebalances, so a
/// sorted key sequence degrades the tree into a chain of height `n`. All walks
/// are iterative for that reason.
#[derive(Debug)]
pub struct OrderedIndex<K, V> {
    /// Root node of the tree
    root: Option<Box<OrderedNode<K, V>>>,
    /// Number of keys in the tree
    size: usize,
}

impl<K, V> OrderedIndex<K, V>
where
    K: IndexKey,
{
    /// Create a new empty index
    pub fn new() -> Self {
        Self { root: None, size: 0 }
    }
}

impl<K, V> OrderedIndex<K, V> {
    /// Tear the tree down one node at a time
    fn dismantle(&mut self) {
        let mut pending: Vec<Box<OrderedNode<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
        self.size = 0;
    }
}

impl<K, V> Default for OrderedIndex<K, V>
where
    K: IndexKey,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for OrderedIndex<K, V> {
    fn drop(&mut self) {
        // Recursive Box drop would overflow the stack on a degenerate chain.
        self.dismantle();
    }
}

impl<K, V> Index<K, V> for OrderedIndex<K, V>
where
    K: IndexKey,
{
    fn insert(&mut self, key: K, value: V) {
        let mut link = &mut self.root;
        while let Some(node) = link {
            match key.cmp(&node.key) {
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
                Ordering::Equal => {
                    node.value = value;
                    return;
                }
            }
        }
        *link = Some(Box::new(OrderedNode::new(key, value)));
        self.size += 1;
    }

    fn search(&self, key: &K) -> Option<&V> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    fn search_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    fn len(&self) -> usize {
        self.size
    }

    fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&OrderedNode<K, V>, usize)> = self.root.as_deref().map(|root| (root, 1)).into_iter().collect();

        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(left) = node.left.as_deref() {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, depth + 1));
            }
        }

        deepest
    }

    fn clear(&mut self) {
        self.dismantle();
    }

    fn index_type(&self) -> IndexType {
        IndexType::Ordered
    }

    fn in_order_traversal(&self) -> Vec<(&K, &V)> {
        let mut entries = Vec::with_capacity(self.size);
        let mut stack: Vec<&OrderedNode<K, V>> = Vec::new();
        let mut current = self.root.as_deref();

        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                entries.push((&node.key, &node.value));
                current = node.right.as_deref();
            }
        }

        entries
    }
}
