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

//! Height-balanced (AVL) binary search tree index
//!
//! Same contract as [`super::OrderedIndex`], but every insert walks back up the
//! path it descended, refreshing node heights and applying single or double
//! rotations wherever the balance factor leaves `[-1, 1]`. The resulting height
//! is bounded by roughly `1.44 * log2(n + 2)`.

use super::lib::{Index, IndexKey, IndexType};
use std::cmp::Ordering;

type Link<K, V> = Option<Box<AvlNode<K, V>>>;

/// AVL tree node
#[derive(Debug)]
struct AvlNode<K, V> {
    key: K,
    value: V,
    /// Height of the subtree rooted here (a leaf has height 1)
    height: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> AvlNode<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height_of(&self.left).max(height_of(&self.right));
    }

    /// Left height minus right height
    fn balance_factor(&self) -> isize {
        height_of(&self.left) as isize - height_of(&self.right) as isize
    }
}

fn height_of<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right<K, V>(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
    match node.left.take() {
        Some(mut pivot) => {
            node.left = pivot.right.take();
            node.update_height();
            pivot.right = Some(node);
            pivot.update_height();
            pivot
        }
        None => node,
    }
}

fn rotate_left<K, V>(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
    match node.right.take() {
        Some(mut pivot) => {
            node.right = pivot.left.take();
            node.update_height();
            pivot.left = Some(node);
            pivot.update_height();
            pivot
        }
        None => node,
    }
}

/// Restore the AVL property at `node`, assuming both subtrees already satisfy it
fn rebalance<K, V>(mut node: Box<AvlNode<K, V>>) -> Box<AvlNode<K, V>> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        // Left-right case needs the child rotated first
        if node.left.as_ref().is_some_and(|left| left.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance < -1 {
        // Right-left case
        if node.right.as_ref().is_some_and(|right| right.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

/// Returns the new subtree root and whether a new key was added
fn insert_node<K: Ord, V>(link: Link<K, V>, key: K, value: V) -> (Box<AvlNode<K, V>>, bool) {
    let mut node = match link {
        Some(node) => node,
        None => return (Box::new(AvlNode::new(key, value)), true),
    };

    let added = match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, added) = insert_node(node.left.take(), key, value);
            node.left = Some(child);
            added
        }
        Ordering::Greater => {
            let (child, added) = insert_node(node.right.take(), key, value);
            node.right = Some(child);
            added
        }
        Ordering::Equal => {
            node.value = value;
            return (node, false);
        }
    };

    (rebalance(node), added)
}

/// AVL tree index
#[derive(Debug)]
pub struct BalancedIndex<K, V> {
    /// Root node of the tree
    root: Link<K, V>,
    /// Number of keys in the tree
    size: usize,
}

impl<K, V> BalancedIndex<K, V>
where
    K: IndexKey,
{
    /// Create a new empty index
    pub fn new() -> Self {
        Self { root: None, size: 0 }
    }

    /// Verify that every node's cached height and balance factor are consistent
    pub fn verify(&self) -> bool {
        fn check<K, V>(link: &Link<K, V>) -> Option<usize> {
            match link {
                None => Some(0),
                Some(node) => {
                    let left = check(&node.left)?;
                    let right = check(&node.right)?;
                    let height = 1 + left.max(right);
                    (left.abs_diff(right) <= 1 && node.height == height).then_some(height)
                }
            }
        }

        check(&self.root).is_some()
    }
}

impl<K, V> Default for BalancedIndex<K, V>
where
    K: IndexKey,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Index<K, V> for BalancedIndex<K, V>
where
    K: IndexKey,
{
    fn insert(&mut self, key: K, value: V) {
        let (root, added) = insert_node(self.root.take(), key, value);
        self.root = Some(root);
        if added {
            self.size += 1;
        }
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
        height_of(&self.root)
    }

    fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    fn index_type(&self) -> IndexType {
        IndexType::Balanced
    }

    fn in_order_traversal(&self) -> Vec<(&K, &V)> {
        let mut entries = Vec::with_capacity(self.size);
        let mut stack: Vec<&AvlNode<K, V>> = Vec::with_capacity(self.height());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_index_creation() {
        let index: BalancedIndex<i32, String> = BalancedIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert_eq!(index.index_type(), IndexType::Balanced);
        assert!(index.verify());
    }

    #[test]
    fn test_balanced_index_insert_and_search() {
        let mut index = BalancedIndex::new();

        index.insert(1, "one".to_string());
        index.insert(2, "two".to_string());
        index.insert(3, "three".to_string());

        assert_eq!(index.len(), 3);
        assert_eq!(index.search(&1), Some(&"one".to_string()));
        assert_eq!(index.search(&3), Some(&"three".to_string()));
        assert_eq!(index.search(&4), None);
        // 1,2,3 ascending triggers a single left rotation
        assert_eq!(index.height(), 2);
        assert!(index.verify());
    }

    #[test]
    fn test_balanced_index_insert_replaces_value() {
        let mut index = BalancedIndex::new();

        index.insert("k", 1);
        index.insert("k", 2);

        assert_eq!(index.len(), 1);
        assert_eq!(index.search(&"k"), Some(&2));
    }

    #[test]
    fn test_balanced_index_double_rotations() {
        // Left-right case
        let mut index = BalancedIndex::new();
        for key in [30, 10, 20] {
            index.insert(key, ());
        }
        assert_eq!(index.height(), 2);
        assert_eq!(index.keys(), vec![&10, &20, &30]);

        // Right-left case
        let mut index = BalancedIndex::new();
        for key in [10, 30, 20] {
            index.insert(key, ());
        }
        assert_eq!(index.height(), 2);
        assert!(index.verify());
    }

    #[test]
    fn test_balanced_index_stays_shallow_on_sorted_input() {
        let mut index = BalancedIndex::new();
        for i in 0..1023 {
            index.insert(i, i);
        }

        // A perfect tree of 1023 nodes has height 10
        assert_eq!(index.height(), 10);
        assert!(index.verify());
        let values: Vec<i32> = index.in_order_traversal().into_iter().map(|(_, v)| *v).collect();
        assert_eq!(values, (0..1023).collect::<Vec<_>>());
    }

    #[test]
    fn test_balanced_index_search_mut_appends() {
        let mut index: BalancedIndex<u8, Vec<&str>> = BalancedIndex::new();
        index.insert(5, vec!["a"]);

        if let Some(list) = index.search_mut(&5) {
            list.push("b");
        }

        assert_eq!(index.search(&5), Some(&vec!["a", "b"]));
    }

    #[test]
    fn test_balanced_index_clear() {
        let mut index = BalancedIndex::new();
        index.insert(1, 1);
        index.insert(2, 2);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.search(&1), None);
    }
}
