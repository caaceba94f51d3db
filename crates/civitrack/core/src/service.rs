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

//! The service object handed to request handlers
//!
//! `MunicipalCore` is built once at start-up and shared. The event catalog and
//! the request tracker each sit behind their own reader-writer lock: mutations
//! hold the write guard for their whole duration, rebuilds included, so readers
//! never see a half-rebuilt index. Searches only need the read guard because
//! search tracking has its own lock inside the catalog. Submitting an issue
//! holds the intake lock while it takes the tracker lock; nothing takes them in
//! the opposite order.

use crate::catalog::EventCatalog;
use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::intake::{IntakeStatistics, IssueRegistry};
use crate::models::{Event, IssueReport, RequestId, ServiceRequest};
use crate::seed;
use crate::tracker::{RequestTracker, RequestTracking};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use tracing::info;

pub struct MunicipalCore {
    config: CoreConfig,
    clock: Arc<dyn Clock>,
    events: RwLock<EventCatalog>,
    requests: RwLock<RequestTracker>,
    issues: RwLock<IssueRegistry>,
}

impl MunicipalCore {
    pub fn new(config: CoreConfig, clock: Arc<dyn Clock>) -> Self {
        let mut catalog = EventCatalog::new(clock.clone(), config.max_recent_searches);
        let mut tracker = RequestTracker::new(clock.clone());

        if config.seed_sample_data {
            let now = clock.now();
            seed::seed_catalog(&mut catalog, now);
            seed::seed_tracker(&mut tracker, now);
        }

        info!(events = catalog.total_events(), requests = tracker.total_requests(), "Municipal core ready");

        Self {
            config,
            clock,
            events: RwLock::new(catalog),
            requests: RwLock::new(tracker),
            issues: RwLock::new(IssueRegistry::new()),
        }
    }

    /// Build with the system clock
    pub fn with_config(config: CoreConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Shared access to the event catalog
    pub fn events(&self) -> RwLockReadGuard<'_, EventCatalog> {
        self.events.read()
    }

    /// Exclusive access to the event catalog
    pub fn events_mut(&self) -> RwLockWriteGuard<'_, EventCatalog> {
        self.events.write()
    }

    /// Shared access to the request tracker
    pub fn requests(&self) -> RwLockReadGuard<'_, RequestTracker> {
        self.requests.read()
    }

    /// Exclusive access to the request tracker
    pub fn requests_mut(&self) -> RwLockWriteGuard<'_, RequestTracker> {
        self.requests.write()
    }

    /// Shared access to the issue intake log
    pub fn issues(&self) -> RwLockReadGuard<'_, IssueRegistry> {
        self.issues.read()
    }

    /// Exclusive access to the issue intake log
    pub fn issues_mut(&self) -> RwLockWriteGuard<'_, IssueRegistry> {
        self.issues.write()
    }

    pub fn intake_statistics(&self) -> IntakeStatistics {
        self.issues().statistics()
    }

    /// Featured events using the configured count
    pub fn featured_events(&self) -> Vec<Event> {
        self.events().get_featured_events(self.config.featured_count).into_iter().cloned().collect()
    }

    /// Recommendations using the configured count
    pub fn recommendations(&self, current_search: Option<&str>, current_category: Option<&str>) -> Vec<Event> {
        self.events()
            .get_recommendations(current_search, current_category, self.config.recommendation_count)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Events related to a stored event, or `None` if the id is unknown
    pub fn related_events(&self, id: &str) -> Option<Vec<Event>> {
        let catalog = self.events();
        let base = catalog.get_event_by_id(id)?;
        Some(catalog.get_related_events(base, self.config.related_count).into_iter().cloned().collect())
    }

    /// Most urgent requests using the configured count
    pub fn high_priority_requests(&self) -> Vec<ServiceRequest> {
        self.requests().get_high_priority_requests(self.config.high_priority_count).into_iter().cloned().collect()
    }

    pub fn track_request(&self, id: &str) -> Option<RequestTracking> {
        self.requests().track_request(id, self.config.similar_request_count)
    }

    /// Log a citizen issue report and open a tracked request under the issue's id
    pub fn submit_issue(&self, report: &IssueReport) -> RequestId {
        let mut issues = self.issues.write();
        let issue = issues.record(report);
        let id = self.requests_mut().add_request(issue.to_request());
        info!(request_id = %id, category = %report.category, pending = issues.pending_processing(), "Issue submitted");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{RequestPriority, RequestStatus};
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 7).and_then(|d| d.and_hms_opt(7, 0, 0)).expect("valid date")
    }

    fn core(seed: bool) -> MunicipalCore {
        let config = CoreConfig {
            seed_sample_data: seed,
            ..CoreConfig::default()
        };
        MunicipalCore::new(config, Arc::new(FixedClock(now())))
    }

    #[test]
    fn test_seeded_core() {
        let core = core(true);

        assert_eq!(core.events().total_events(), 12);
        assert_eq!(core.requests().total_requests(), 8);
        assert_eq!(core.featured_events().len(), 5);
        assert_eq!(core.recommendations(None, None).len(), 6);
        assert_eq!(core.high_priority_requests().len(), 8);
    }

    #[test]
    fn test_unseeded_core_is_empty() {
        let core = core(false);

        assert_eq!(core.events().total_events(), 0);
        assert_eq!(core.requests().total_requests(), 0);
        assert!(core.recommendations(Some("water"), None).is_empty());
    }

    #[test]
    fn test_submit_issue() {
        let core = core(false);
        let issue = IssueReport {
            location: "Pine Street".to_string(),
            category: "Water and Sanitation".to_string(),
            description: "Urgent: sewage overflow".to_string(),
            reported_at: now(),
        };

        let id = core.submit_issue(&issue);

        assert!(id.as_str().starts_with("ISS20250707070000"));
        let logged = core.issues().get_issue_by_id(id.as_str()).map(|i| i.report.clone());
        assert_eq!(logged, Some(issue.clone()));
        assert_eq!(core.intake_statistics(), IntakeStatistics { total_issues: 1, pending_processing: 1 });
        assert_eq!(core.issues().count_in_category("Water and Sanitation"), 1);

        let view = core.track_request(id.as_str()).expect("tracked");
        assert_eq!(view.request.title, "Water and Sanitation - Pine Street");
        assert_eq!(view.request.priority, RequestPriority::Critical);
        assert_eq!(view.request.status, RequestStatus::Submitted);
        assert_eq!(view.progress, 10.0);
        assert_eq!(view.timeline.len(), 1);
    }

    #[test]
    fn test_related_events_for_unknown_id() {
        let core = core(true);
        assert!(core.related_events("nope").is_none());

        let water = core.events().search_events(Some("Water Conservation"), None, None).first().map(|e| e.id.to_string()).expect("sample event");
        let related = core.related_events(&water).expect("known id");
        // Shares "education" with the fire safety campaign
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].title, "Fire Safety Awareness Campaign");
    }
}
