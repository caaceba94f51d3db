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

use std::collections::{BTreeMap, VecDeque};

/// Search activity feeding the recommendation engine
///
/// Free-text searches are counted by their lower-cased whole string, category
/// filters by exact name. Raw search strings are also kept twice: a bounded
/// queue of the most recent ones and an unbounded history stack.
#[derive(Debug, Clone)]
pub struct SearchTracker {
    term_frequency: BTreeMap<String, u64>,
    category_frequency: BTreeMap<String, u64>,
    recent: VecDeque<String>,
    max_recent: usize,
    history: Vec<String>,
}

impl SearchTracker {
    pub fn new(max_recent: usize) -> Self {
        Self {
            term_frequency: BTreeMap::new(),
            category_frequency: BTreeMap::new(),
            recent: VecDeque::with_capacity(max_recent),
            max_recent,
            history: Vec::new(),
        }
    }

    /// Record a free-text search; blank input is ignored
    pub fn track_search(&mut self, term: &str) -> bool {
        if term.trim().is_empty() {
            return false;
        }

        self.history.push(term.to_string());

        if self.max_recent > 0 {
            if self.recent.len() >= self.max_recent {
                self.recent.pop_front();
            }
            self.recent.push_back(term.to_string());
        }

        *self.term_frequency.entry(term.to_lowercase()).or_insert(0) += 1;
        true
    }

    /// Record use of a category filter; blank input is ignored
    pub fn track_category(&mut self, category: &str) -> bool {
        if category.trim().is_empty() {
            return false;
        }
        *self.category_frequency.entry(category.to_string()).or_insert(0) += 1;
        true
    }

    /// Recent searches, oldest first
    pub fn recent_searches(&self) -> Vec<String> {
        self.recent.iter().cloned().collect()
    }

    /// Every search ever tracked, most recent first
    pub fn search_history(&self) -> Vec<String> {
        self.history.iter().rev().cloned().collect()
    }

    pub fn term_frequencies(&self) -> &BTreeMap<String, u64> {
        &self.term_frequency
    }

    pub fn category_frequencies(&self) -> &BTreeMap<String, u64> {
        &self.category_frequency
    }

    pub fn category_frequency(&self, category: &str) -> Option<u64> {
        self.category_frequency.get(category).copied()
    }

    /// Sum of all free-text search counts
    pub fn total_searches(&self) -> u64 {
        self.term_frequency.values().sum()
    }

    /// Category with the highest count, ties going to the alphabetically first name
    pub fn most_searched_category(&self) -> Option<&str> {
        self.category_frequency
            .iter()
            .max_by(|(name_a, count_a), (name_b, count_b)| count_a.cmp(count_b).then_with(|| name_b.cmp(name_a)))
            .map(|(name, _)| name.as_str())
    }
}

impl Default for SearchTracker {
    fn default() -> Self {
        Self::new(10)
    }
}
