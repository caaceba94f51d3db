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

//! Log of citizen-reported issues
//!
//! Every report is kept three ways: an append-only log in submission order, a
//! stack whose top is the most recent report, and a FIFO of reports waiting to
//! be picked up by staff. Each issue's id is reused for the service request
//! opened from it, so a citizen can track the request with the id they were
//! given at submission.

use crate::models::{IssueReport, RequestId, ServiceRequest, generate_id};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

pub const ISSUE_ID_PREFIX: &str = "ISS";

/// A report that has been accepted into the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: RequestId,
    #[serde(flatten)]
    pub report: IssueReport,
}

impl Issue {
    /// The service request opened for this issue, sharing its id
    pub fn to_request(&self) -> ServiceRequest {
        ServiceRequest::from_issue(&self.report).with_id(self.id.clone())
    }
}

/// Intake counters shown alongside the report form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeStatistics {
    pub total_issues: usize,
    pub pending_processing: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IssueRegistry {
    log: Vec<Issue>,
    /// Issue id to position in `log`
    positions: HashMap<RequestId, usize>,
    /// Log positions, most recent on top
    recent: Vec<usize>,
    /// Log positions awaiting processing, oldest first
    processing: VecDeque<usize>,
}

impl IssueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a report, assigning it a fresh id
    pub fn record(&mut self, report: &IssueReport) -> &Issue {
        let position = self.log.len();
        let mut id = RequestId::from(generate_id(ISSUE_ID_PREFIX, report.reported_at));
        if self.positions.contains_key(&id) {
            // Same second and same random digits; the log position makes it unique
            id = RequestId::from(format!("{id}-{position}"));
        }

        debug!(issue_id = %id, category = %report.category, "Issue recorded");
        self.positions.insert(id.clone(), position);
        self.recent.push(position);
        self.processing.push_back(position);
        self.log.push(Issue { id, report: report.clone() });
        &self.log[position]
    }

    pub fn get_issue_by_id(&self, id: &str) -> Option<&Issue> {
        self.positions.get(id).and_then(|&position| self.log.get(position))
    }

    /// Every issue in submission order
    pub fn all_issues(&self) -> &[Issue] {
        &self.log
    }

    pub fn total_issues(&self) -> usize {
        self.log.len()
    }

    pub fn pending_processing(&self) -> usize {
        self.processing.len()
    }

    pub fn count_in_category(&self, category: &str) -> usize {
        self.log.iter().filter(|issue| issue.report.category == category).count()
    }

    /// Most recently submitted issue
    pub fn last_submitted(&self) -> Option<&Issue> {
        self.recent.last().and_then(|&position| self.log.get(position))
    }

    /// Oldest issue still waiting to be processed
    pub fn next_for_processing(&self) -> Option<&Issue> {
        self.processing.front().and_then(|&position| self.log.get(position))
    }

    /// Hand the oldest waiting issue to staff; it stays in the log
    pub fn take_next_for_processing(&mut self) -> Option<&Issue> {
        let position = self.processing.pop_front()?;
        self.log.get(position)
    }

    pub fn statistics(&self) -> IntakeStatistics {
        IntakeStatistics {
            total_issues: self.total_issues(),
            pending_processing: self.pending_processing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestPriority;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 3).and_then(|d| d.and_hms_opt(10, minute, 0)).expect("valid date")
    }

    fn report(category: &str, description: &str, minute: u32) -> IssueReport {
        IssueReport {
            location: "Elm Avenue".to_string(),
            category: category.to_string(),
            description: description.to_string(),
            reported_at: at(minute),
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = IssueRegistry::new();
        assert_eq!(registry.statistics(), IntakeStatistics::default());
        assert!(registry.last_submitted().is_none());
        assert!(registry.next_for_processing().is_none());
        assert_eq!(registry.count_in_category("Electricity"), 0);
    }

    #[test]
    fn test_record_assigns_time_based_id() {
        let mut registry = IssueRegistry::new();
        let issue = registry.record(&report("Electricity", "Streetlight out", 5));

        assert!(issue.id.as_str().starts_with("ISS20250603100500"));
        assert_eq!(issue.id.as_str().len(), 3 + 14 + 3);
        let id = issue.id.clone();
        assert_eq!(registry.get_issue_by_id(id.as_str()).map(|i| i.report.location.as_str()), Some("Elm Avenue"));
        assert!(registry.get_issue_by_id("ISS0").is_none());
    }

    #[test]
    fn test_stack_and_queue_views() {
        let mut registry = IssueRegistry::new();
        let first = registry.record(&report("Electricity", "Streetlight out", 1)).id.clone();
        registry.record(&report("Housing", "Roof leak", 2));
        let last = registry.record(&report("Electricity", "Exposed wires", 3)).id.clone();

        assert_eq!(registry.total_issues(), 3);
        assert_eq!(registry.pending_processing(), 3);
        assert_eq!(registry.count_in_category("Electricity"), 2);
        assert_eq!(registry.last_submitted().map(|i| &i.id), Some(&last));
        assert_eq!(registry.next_for_processing().map(|i| &i.id), Some(&first));

        assert_eq!(registry.take_next_for_processing().map(|i| i.id.clone()), Some(first));
        assert_eq!(registry.statistics(), IntakeStatistics { total_issues: 3, pending_processing: 2 });
        assert_eq!(registry.next_for_processing().map(|i| i.report.category.as_str()), Some("Housing"));

        let categories: Vec<&str> = registry.all_issues().iter().map(|i| i.report.category.as_str()).collect();
        assert_eq!(categories, vec!["Electricity", "Housing", "Electricity"]);
    }

    #[test]
    fn test_ids_stay_unique_within_one_second() {
        let mut registry = IssueRegistry::new();
        for _ in 0..1000 {
            registry.record(&report("Other", "Same second", 0));
        }

        assert_eq!(registry.total_issues(), 1000);
        for issue in registry.all_issues() {
            assert_eq!(registry.get_issue_by_id(issue.id.as_str()), Some(issue));
        }
    }

    #[test]
    fn test_request_shares_issue_id() {
        let mut registry = IssueRegistry::new();
        let issue = registry.record(&report("Water and Sanitation", "Urgent burst main", 7));

        let request = issue.to_request();

        assert_eq!(request.id, issue.id);
        assert_eq!(request.title, "Water and Sanitation - Elm Avenue");
        assert_eq!(request.priority, RequestPriority::Critical);
        assert_eq!(request.submitted_at, at(7));
    }
}
