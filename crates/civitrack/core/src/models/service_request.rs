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

use super::generate_id;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Author recorded on history entries written by the tracker itself
pub const SYSTEM_AUTHOR: &str = "System";

/// Service request identifier, `SR` followed by the submission timestamp and a random suffix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate(at: NaiveDateTime) -> Self {
        Self(generate_id("SR", at))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for RequestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error produced when text cannot be read as one of the request enums
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognised {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

/// Lifecycle of a service request
///
/// Any status may follow any other. Declaration order is the ordinal accepted
/// by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Submitted,
    UnderReview,
    Assigned,
    InProgress,
    OnHold,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 8] = [
        RequestStatus::Submitted,
        RequestStatus::UnderReview,
        RequestStatus::Assigned,
        RequestStatus::InProgress,
        RequestStatus::OnHold,
        RequestStatus::Completed,
        RequestStatus::Rejected,
        RequestStatus::Cancelled,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RequestStatus::Submitted => "Submitted",
            RequestStatus::UnderReview => "UnderReview",
            RequestStatus::Assigned => "Assigned",
            RequestStatus::InProgress => "InProgress",
            RequestStatus::OnHold => "OnHold",
            RequestStatus::Completed => "Completed",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    /// Still awaiting resolution
    pub fn is_pending(self) -> bool {
        !matches!(self, RequestStatus::Completed | RequestStatus::Rejected | RequestStatus::Cancelled)
    }

    /// Fixed completion percentage shown to citizens
    pub fn completion_progress(self) -> f64 {
        match self {
            RequestStatus::Submitted => 10.0,
            RequestStatus::UnderReview => 25.0,
            RequestStatus::Assigned => 40.0,
            RequestStatus::InProgress => 70.0,
            RequestStatus::Completed => 100.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseEnumError;

    /// Accepts the variant name (`"InProgress"`) or its ordinal (`"3"`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Ok(ordinal) = text.parse::<usize>() {
            return Self::ALL.get(ordinal).copied().ok_or_else(|| ParseEnumError::new("status", s));
        }
        Self::ALL.into_iter().find(|status| status.name() == text).ok_or_else(|| ParseEnumError::new("status", s))
    }
}

/// Urgency of a service request; lower discriminant is more urgent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RequestPriority {
    Critical = 1,
    High = 2,
    #[default]
    Medium = 3,
    Low = 4,
}

impl RequestPriority {
    pub const ALL: [RequestPriority; 4] = [RequestPriority::Critical, RequestPriority::High, RequestPriority::Medium, RequestPriority::Low];

    pub fn name(self) -> &'static str {
        match self {
            RequestPriority::Critical => "Critical",
            RequestPriority::High => "High",
            RequestPriority::Medium => "Medium",
            RequestPriority::Low => "Low",
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Infer a priority from keywords in a free-text description
    pub fn from_description(description: &str) -> Self {
        let text = description.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| text.contains(word));

        if mentions(&["emergency", "urgent", "critical", "danger"]) {
            RequestPriority::Critical
        } else if mentions(&["important", "asap"]) {
            RequestPriority::High
        } else if mentions(&["minor", "whenever"]) {
            RequestPriority::Low
        } else {
            RequestPriority::Medium
        }
    }
}

impl fmt::Display for RequestPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RequestPriority {
    type Err = ParseEnumError;

    /// Accepts the variant name (`"High"`) or its level (`"2"`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.name() == text || priority.level().to_string() == text)
            .ok_or_else(|| ParseEnumError::new("priority", s))
    }
}

/// One entry in a request's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub timestamp: NaiveDateTime,
    pub status: RequestStatus,
    pub updated_by: String,
    pub notes: String,
}

/// Kind of relationship between two requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    BlockedBy,
    RelatedTo,
    DuplicateOf,
    ChildOf,
}

/// A directed, typed relationship between two requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDependency {
    pub from: RequestId,
    pub to: RequestId,
    pub kind: DependencyType,
}

/// A citizen-reported municipal issue, before it becomes a tracked request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReport {
    pub location: String,
    pub category: String,
    pub description: String,
    pub reported_at: NaiveDateTime,
}

/// A tracked service request
///
/// Status history and the mirrored dependency lists are only written by the
/// owning tracker, so they are exposed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    pub submitted_at: NaiveDateTime,
    pub assigned_at: Option<NaiveDateTime>,
    pub in_progress_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub assigned_department: Option<String>,
    pub assigned_to: Option<String>,
    pub(crate) status_history: Vec<StatusUpdate>,
    /// Requests this one points at in the dependency graph
    pub(crate) dependencies: Vec<RequestId>,
    /// Requests pointing at this one
    pub(crate) dependent_requests: Vec<RequestId>,
}

impl ServiceRequest {
    /// Create a submitted, medium priority request stamped with the current local time
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self::submitted_at(title, category, Local::now().naive_local())
    }

    pub fn submitted_at(title: impl Into<String>, category: impl Into<String>, submitted_at: NaiveDateTime) -> Self {
        Self {
            id: RequestId::generate(submitted_at),
            title: title.into(),
            category: category.into(),
            description: String::new(),
            location: String::new(),
            status: RequestStatus::Submitted,
            priority: RequestPriority::Medium,
            submitted_at,
            assigned_at: None,
            in_progress_at: None,
            completed_at: None,
            assigned_department: None,
            assigned_to: None,
            status_history: Vec::new(),
            dependencies: Vec::new(),
            dependent_requests: Vec::new(),
        }
    }

    /// Turn a citizen issue report into a request, inferring priority from its description
    pub fn from_issue(issue: &IssueReport) -> Self {
        Self::submitted_at(format!("{} - {}", issue.category, issue.location), issue.category.clone(), issue.reported_at)
            .with_description(issue.description.clone())
            .with_location(issue.location.clone())
            .with_priority(RequestPriority::from_description(&issue.description))
    }

    pub fn with_id(mut self, id: impl Into<RequestId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_priority(mut self, priority: RequestPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignment(mut self, department: impl Into<String>, assignee: Option<String>) -> Self {
        self.assigned_department = Some(department.into());
        self.assigned_to = assignee;
        self
    }

    pub fn status_history(&self) -> &[StatusUpdate] {
        &self.status_history
    }

    pub fn dependencies(&self) -> &[RequestId] {
        &self.dependencies
    }

    pub fn dependent_requests(&self) -> &[RequestId] {
        &self.dependent_requests
    }

    pub fn completion_progress(&self) -> f64 {
        self.status.completion_progress()
    }

    /// Case-insensitive substring match against title, description, location or id
    ///
    /// `needle` must already be lower-cased.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.location.to_lowercase().contains(needle)
            || self.id.as_str().to_lowercase().contains(needle)
    }

    /// Days between submission and completion, if completed
    pub fn completion_days(&self) -> Option<f64> {
        if self.status != RequestStatus::Completed {
            return None;
        }
        self.completed_at.map(|completed| (completed - self.submitted_at).num_seconds() as f64 / 86_400.0)
    }

    /// Apply a status change and append it to the history
    ///
    /// The entry is stamped no earlier than the previous one so the history
    /// stays ordered even for requests submitted with a future timestamp.
    pub(crate) fn record_status(&mut self, status: RequestStatus, updated_by: &str, notes: &str, now: NaiveDateTime) {
        self.status = status;
        match status {
            RequestStatus::Assigned => self.assigned_at = Some(now),
            RequestStatus::InProgress => self.in_progress_at = Some(now),
            RequestStatus::Completed => self.completed_at = Some(now),
            _ => {}
        }
        if status != RequestStatus::Completed {
            self.completed_at = None;
        }

        let timestamp = self.status_history.last().map_or(now, |last| last.timestamp.max(now));
        self.status_history.push(StatusUpdate {
            timestamp,
            status,
            updated_by: updated_by.to_string(),
            notes: notes.to_string(),
        });
    }

    /// Reset tracker-owned state and write the initial history entry
    pub(crate) fn begin_tracking(&mut self, now: NaiveDateTime) {
        if self.status == RequestStatus::Completed {
            self.completed_at.get_or_insert(now);
        } else {
            self.completed_at = None;
        }
        self.dependencies.clear();
        self.dependent_requests.clear();
        self.status_history = vec![StatusUpdate {
            timestamp: self.submitted_at,
            status: RequestStatus::Submitted,
            updated_by: SYSTEM_AUTHOR.to_string(),
            notes: "Request submitted".to_string(),
        }];
    }

    /// Copy the caller-editable fields of `edited` onto this request
    pub(crate) fn apply_edit(&mut self, edited: ServiceRequest) {
        self.title = edited.title;
        self.category = edited.category;
        self.description = edited.description;
        self.location = edited.location;
        self.priority = edited.priority;
        self.assigned_department = edited.assigned_department;
        self.assigned_to = edited.assigned_to;
    }
}
