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

use super::statistics::RequestStatistics;
use crate::clock::Clock;
use crate::graph::DependencyGraph;
use crate::indices::{BalancedIndex, Index, IndexStats, MinHeap, append_to_group};
use crate::models::{DependencyType, RequestDependency, RequestId, RequestPriority, RequestStatus, ServiceRequest, StatusUpdate};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Priority queue entry: most urgent first, then earliest submission
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PriorityEntry {
    priority: RequestPriority,
    submitted_at: NaiveDateTime,
    id: RequestId,
}

impl PriorityEntry {
    fn for_request(request: &ServiceRequest) -> Self {
        Self {
            priority: request.priority,
            submitted_at: request.submitted_at,
            id: request.id.clone(),
        }
    }
}

/// How a status filter's text constrains a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusFilter {
    Any,
    Only(RequestStatus),
    /// A number that is not a status ordinal; no request can match it
    Nothing,
}

impl StatusFilter {
    fn parse(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return StatusFilter::Any;
        };
        match text.parse::<RequestStatus>() {
            Ok(status) => StatusFilter::Only(status),
            Err(_) if text.parse::<i64>().is_ok() => StatusFilter::Nothing,
            Err(_) => StatusFilter::Any,
        }
    }

    fn matches(self, status: RequestStatus) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Only(wanted) => wanted == status,
            StatusFilter::Nothing => false,
        }
    }
}

/// Everything the tracking page shows for one request
#[derive(Debug, Clone, Serialize)]
pub struct RequestTracking {
    pub request: ServiceRequest,
    /// Outgoing dependency targets that are known requests
    pub related: Vec<ServiceRequest>,
    /// Status history in timestamp order
    pub timeline: Vec<StatusUpdate>,
    pub progress: f64,
    /// Average completion time minus time already spent, never negative; 0 once completed
    pub estimated_days_to_completion: i64,
    /// Most recent requests in the same category
    pub similar: Vec<ServiceRequest>,
}

/// Owns every service request and the structures built over them
pub struct RequestTracker {
    requests: HashMap<RequestId, ServiceRequest>,
    insertion_order: Vec<RequestId>,
    /// Submission day to request ids
    by_date: BalancedIndex<NaiveDate, Vec<RequestId>>,
    priority_queue: MinHeap<PriorityEntry>,
    /// Vertices and edges outlive deleted requests
    graph: DependencyGraph<DependencyType>,
    clock: Arc<dyn Clock>,
}

impl RequestTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            requests: HashMap::new(),
            insertion_order: Vec::new(),
            by_date: BalancedIndex::new(),
            priority_queue: MinHeap::new(),
            graph: DependencyGraph::new(),
            clock,
        }
    }

    /// Start tracking a request
    ///
    /// Its history is reset to a single "submitted" entry and its dependency
    /// lists are cleared. A request whose id is already tracked is applied as
    /// an edit instead, so its status, history and dependencies are kept.
    pub fn add_request(&mut self, mut request: ServiceRequest) -> RequestId {
        let id = request.id.clone();
        if self.requests.contains_key(&id) {
            debug!(request_id = %id, "Request already tracked, applying as an edit");
            self.update_request(request);
            return id;
        }

        request.begin_tracking(self.clock.now());
        self.priority_queue.insert(PriorityEntry::for_request(&request));
        append_to_group(&mut self.by_date, request.submitted_at.date(), id.clone());
        debug!(request_id = %id, priority = %request.priority, "Request added");

        self.graph.add_vertex(id.as_str());
        self.insertion_order.push(id.clone());
        self.requests.insert(id.clone(), request);
        id
    }

    /// Replace the editable fields of a tracked request
    ///
    /// Status, history, dependency lists and submission time stay as tracked.
    pub fn update_request(&mut self, edited: ServiceRequest) -> bool {
        let Some(request) = self.requests.get_mut(&edited.id) else {
            return false;
        };
        request.apply_edit(edited);
        debug!(request_id = %request.id, "Request updated");
        self.rebuild_secondary_indexes();
        true
    }

    /// Stop tracking a request; its graph vertex and edges remain
    pub fn delete_request(&mut self, id: &str) -> bool {
        if self.requests.remove(id).is_none() {
            return false;
        }
        self.insertion_order.retain(|existing| existing.as_str() != id);
        debug!(request_id = id, "Request deleted");
        self.rebuild_secondary_indexes();
        true
    }

    /// Regenerate the date index and priority queue from the primary map
    fn rebuild_secondary_indexes(&mut self) {
        self.by_date.clear();
        self.priority_queue.clear();

        for id in &self.insertion_order {
            if let Some(request) = self.requests.get(id) {
                self.priority_queue.insert(PriorityEntry::for_request(request));
                append_to_group(&mut self.by_date, request.submitted_at.date(), id.clone());
            }
        }

        debug!(requests = self.requests.len(), "Rebuilt request indexes");
    }

    pub fn get_request_by_id(&self, id: &str) -> Option<&ServiceRequest> {
        self.requests.get(id)
    }

    /// All requests, most recently submitted first
    pub fn get_all_requests(&self) -> Vec<&ServiceRequest> {
        let mut all: Vec<&ServiceRequest> = self.requests.values().collect();
        sort_newest_first(&mut all);
        all
    }

    /// Change a request's status and log it, returning `false` for unknown ids
    ///
    /// Any status may follow any other.
    pub fn update_status(&mut self, id: &str, status: RequestStatus, updated_by: &str, notes: &str) -> bool {
        let now = self.clock.now();
        match self.requests.get_mut(id) {
            Some(request) => {
                let previous = request.status;
                request.record_status(status, updated_by, notes, now);
                debug!(request_id = id, from = %previous, to = %status, updated_by, "Request status changed");
                true
            }
            None => false,
        }
    }

    /// Record that `from` relates to `to`
    ///
    /// The graph edge is always added. The requests' own dependency lists are
    /// only updated when both ids are tracked, in which case this returns `true`.
    pub fn add_dependency(&mut self, from: &str, to: &str, kind: DependencyType) -> bool {
        self.graph.add_edge(from, to, kind);

        if !(self.requests.contains_key(from) && self.requests.contains_key(to)) {
            warn!(from, to, ?kind, "Dependency references an unknown request; graph edge kept without mirroring");
            return false;
        }

        if let Some(source) = self.requests.get_mut(from) {
            source.dependencies.push(RequestId::from(to));
        }
        if let Some(target) = self.requests.get_mut(to) {
            target.dependent_requests.push(RequestId::from(from));
        }
        debug!(from, to, ?kind, "Dependency added");
        true
    }

    /// Outgoing graph neighbours that are still tracked
    pub fn get_related_requests(&self, id: &str) -> Vec<&ServiceRequest> {
        self.graph.adjacent_vertices(id).iter().filter_map(|related| self.requests.get(related.as_str())).collect()
    }

    /// Every graph edge, in vertex insertion order
    pub fn get_all_dependencies(&self) -> Vec<RequestDependency> {
        self.graph
            .all_edges()
            .into_iter()
            .map(|edge| RequestDependency {
                from: RequestId::from(edge.from),
                to: RequestId::from(edge.to),
                kind: edge.label,
            })
            .collect()
    }

    /// Filter requests, most recently submitted first
    ///
    /// The query matches title, description, location or id ignoring case.
    /// Status text that does not name a status is ignored, except numbers
    /// outside the status ordinals, which match nothing.
    pub fn search(&self, query: Option<&str>, status: Option<&str>, category: Option<&str>, priority: Option<RequestPriority>) -> Vec<&ServiceRequest> {
        let needle = query.filter(|q| !q.trim().is_empty()).map(str::to_lowercase);
        let status = StatusFilter::parse(status);
        let category = category.filter(|c| !c.trim().is_empty());

        let mut results: Vec<&ServiceRequest> = self
            .requests
            .values()
            .filter(|request| needle.as_deref().is_none_or(|needle| request.matches_query(needle)))
            .filter(|request| status.matches(request.status))
            .filter(|request| category.is_none_or(|category| request.category == category))
            .filter(|request| priority.is_none_or(|priority| request.priority == priority))
            .collect();

        sort_newest_first(&mut results);
        results
    }

    /// Up to `count` most urgent requests without disturbing the queue
    pub fn get_high_priority_requests(&self, count: usize) -> Vec<&ServiceRequest> {
        self.priority_queue.top_k(count).into_iter().filter_map(|entry| self.requests.get(&entry.id)).collect()
    }

    /// Requests submitted on any day in `[start, end]`, walking one day at a time
    pub fn get_requests_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&ServiceRequest> {
        let mut results = Vec::new();
        let mut day = start;
        while day <= end {
            if let Some(ids) = self.by_date.search(&day) {
                results.extend(ids.iter().filter_map(|id| self.requests.get(id)));
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        results
    }

    /// All requests in ascending submission-day order
    pub fn get_requests_in_order_by_date(&self) -> Vec<&ServiceRequest> {
        self.by_date.in_order_traversal().into_iter().flat_map(|(_, ids)| ids.iter().filter_map(|id| self.requests.get(id))).collect()
    }

    pub fn statistics(&self) -> RequestStatistics {
        RequestStatistics::from_requests(self.requests.values())
    }

    pub fn count_by_status(&self) -> BTreeMap<RequestStatus, usize> {
        self.statistics().by_status
    }

    pub fn count_by_category(&self) -> BTreeMap<String, usize> {
        self.statistics().by_category
    }

    pub fn total_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.values().filter(|request| request.status.is_pending()).count()
    }

    pub fn completed_requests(&self) -> usize {
        self.requests.values().filter(|request| request.status == RequestStatus::Completed).count()
    }

    pub fn average_completion_days(&self) -> f64 {
        self.statistics().average_completion_days
    }

    /// Completion percentage of a tracked request
    pub fn completion_progress(&self, id: &str) -> Option<f64> {
        self.requests.get(id).map(ServiceRequest::completion_progress)
    }

    /// Assemble the tracking view for one request
    pub fn track_request(&self, id: &str, similar_count: usize) -> Option<RequestTracking> {
        let request = self.requests.get(id)?;
        let now = self.clock.now();

        let mut timeline = request.status_history().to_vec();
        timeline.sort_by_key(|update| update.timestamp);

        let estimated_days_to_completion = if request.status == RequestStatus::Completed {
            0
        } else {
            let days_since_submission = (now - request.submitted_at).num_seconds() as f64 / 86_400.0;
            ((self.average_completion_days() - days_since_submission) as i64).max(0)
        };

        let similar = self
            .search(None, None, Some(request.category.as_str()), None)
            .into_iter()
            .filter(|candidate| candidate.id != request.id)
            .take(similar_count)
            .cloned()
            .collect();

        Some(RequestTracking {
            request: request.clone(),
            related: self.get_related_requests(id).into_iter().cloned().collect(),
            timeline,
            progress: request.completion_progress(),
            estimated_days_to_completion,
            similar,
        })
    }

    pub fn date_index_stats(&self) -> IndexStats {
        self.by_date.stats()
    }

    pub fn dependency_graph(&self) -> &DependencyGraph<DependencyType> {
        &self.graph
    }
}

/// Newest submission first; ids break ties so output is stable
fn sort_newest_first(requests: &mut [&ServiceRequest]) {
    requests.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then_with(|| a.id.cmp(&b.id)));
}
