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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A labelled edge as reported by [`DependencyGraph::all_edges`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge<L> {
    /// Source vertex
    pub from: String,
    /// Target vertex
    pub to: String,
    /// Edge label
    pub label: L,
}

/// Outgoing half of an edge, stored in the source's adjacency list
#[derive(Debug, Clone)]
struct Adjacency<L> {
    to: String,
    label: L,
}

/// Directed multigraph over string vertex ids
///
/// Edges are never deduplicated and there is no cycle check. Nothing is ever
/// removed, so vertex and edge order reflect insertion order.
#[derive(Debug, Clone)]
pub struct DependencyGraph<L> {
    /// Vertices in the order they were first seen
    vertices: Vec<String>,
    /// Outgoing edges per vertex
    adjacency: HashMap<String, Vec<Adjacency<L>>>,
    edge_count: usize,
}

impl<L: Clone> DependencyGraph<L> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            adjacency: HashMap::new(),
            edge_count: 0,
        }
    }

    /// Register a vertex, returning `false` if it was already present
    pub fn add_vertex(&mut self, id: &str) -> bool {
        if self.adjacency.contains_key(id) {
            return false;
        }
        self.vertices.push(id.to_string());
        self.adjacency.insert(id.to_string(), Vec::new());
        true
    }

    /// Append a labelled edge, creating either endpoint if needed
    pub fn add_edge(&mut self, from: &str, to: &str, label: L) {
        self.add_vertex(from);
        self.add_vertex(to);
        self.adjacency.entry(from.to_string()).or_default().push(Adjacency { to: to.to_string(), label });
        self.edge_count += 1;
    }

    /// Targets of the outgoing edges of `id`, one entry per edge
    pub fn adjacent_vertices(&self, id: &str) -> Vec<String> {
        self.adjacency.get(id).map(|edges| edges.iter().map(|edge| edge.to.clone()).collect()).unwrap_or_default()
    }

    /// Every edge, grouped by source in vertex insertion order
    pub fn all_edges(&self) -> Vec<GraphEdge<L>> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for vertex in &self.vertices {
            if let Some(outgoing) = self.adjacency.get(vertex) {
                edges.extend(outgoing.iter().map(|edge| GraphEdge {
                    from: vertex.clone(),
                    to: edge.to.clone(),
                    label: edge.label.clone(),
                }));
            }
        }
        edges
    }

    pub fn contains_vertex(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl<L: Clone> Default for DependencyGraph<L> {
    fn default() -> Self {
        Self::new()
    }
}
