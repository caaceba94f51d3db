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

use chrono::{Duration, NaiveDate, NaiveDateTime};
use civitrack_core::indices::IndexError;
use civitrack_core::models::{DependencyType, Event, RequestId, RequestPriority, RequestStatus, ServiceRequest};
use civitrack_core::{CoreConfig, FixedClock, MunicipalCore};
use std::sync::Arc;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 3).and_then(|d| d.and_hms_opt(9, 0, 0)).expect("valid date")
}

fn empty_core() -> MunicipalCore {
    let config = CoreConfig {
        seed_sample_data: false,
        ..CoreConfig::default()
    };
    MunicipalCore::new(config, Arc::new(FixedClock(now())))
}

fn event_on(id: &str, day: i64, priority: u8, featured: bool) -> Event {
    Event::created_at(format!("Day {day}"), "Community", now() + Duration::days(day), now())
        .with_id(id)
        .with_priority(priority)
        .with_featured(featured)
}

#[test]
fn test_featured_events_scenario() {
    let core = empty_core();
    {
        let mut catalog = core.events_mut();
        catalog.add_event(event_on("day1", 1, 1, false));
        catalog.add_event(event_on("day2", 2, 3, true));
        catalog.add_event(event_on("day3", 3, 5, false));
    }

    let catalog = core.events();
    let featured: Vec<&str> = catalog.get_featured_events(2).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(featured, vec!["day1", "day2"]);

    for event in catalog.get_featured_events(10) {
        assert!(event.featured || event.priority <= 2);
    }
    assert!(catalog.get_featured_events(10).iter().all(|e| e.id.as_str() != "day3"));
}

#[test]
fn test_completion_scenario() {
    let core = empty_core();
    let id = core.requests_mut().add_request(ServiceRequest::submitted_at("Broken bench", "Parks", now() - Duration::days(1)));
    assert_eq!(core.requests().get_request_by_id(id.as_str()).map(|r| r.status), Some(RequestStatus::Submitted));

    assert!(core.requests_mut().update_status(id.as_str(), RequestStatus::Completed, "X", "done"));

    let tracker = core.requests();
    let request = tracker.get_request_by_id(id.as_str()).expect("request tracked");
    assert_eq!(request.status_history().len(), 2);
    assert_eq!(request.status_history()[1].status, RequestStatus::Completed);
    assert_eq!(request.completion_progress(), 100.0);
    assert!(request.completed_at.is_some());
}

#[test]
fn test_unknown_dependency_scenario() {
    let core = empty_core();
    core.requests_mut().add_request(ServiceRequest::submitted_at("Leak", "Water", now()).with_id("R1"));

    core.requests_mut().add_dependency("R1", "R2", DependencyType::RelatedTo);

    let tracker = core.requests();
    let edges = tracker.get_all_dependencies();
    let matching = edges
        .iter()
        .filter(|edge| edge.from == RequestId::from("R1") && edge.to == RequestId::from("R2") && edge.kind == DependencyType::RelatedTo)
        .count();
    assert_eq!(matching, 1);
    assert!(tracker.get_request_by_id("R1").expect("R1 tracked").dependencies().is_empty());
}

#[test]
fn test_delete_then_lookup_is_absent() {
    let core = empty_core();
    core.events_mut().add_event(event_on("gone", 4, 2, true));

    assert!(core.events_mut().delete_event("gone"));
    assert!(core.events().get_event_by_id("gone").is_none());
    assert!(core.events().get_featured_events(5).is_empty());
}

#[test]
fn test_empty_heap_is_an_error_not_a_panic() {
    let mut heap: civitrack_core::indices::MinHeap<RequestPriority> = civitrack_core::indices::MinHeap::new();
    assert_eq!(heap.extract_min(), Err(IndexError::EmptyHeap));
}

#[test]
fn test_seeded_portal_walkthrough() {
    let config = CoreConfig::default();
    let core = MunicipalCore::new(config, Arc::new(FixedClock(now())));

    // Searching feeds the recommendation signal
    let hits = core.events().search_events(Some("schedule"), None, None).len();
    assert_eq!(hits, 4);
    let recommended: Vec<String> = core.recommendations(None, None).into_iter().map(|e| e.title).collect();
    assert_eq!(
        recommended,
        vec![
            "Road Maintenance Schedule - Main Street",
            "Local Farmers Market",
            "Electricity Load Shedding Schedule Update",
            "Community Clean-Up Day",
            "Public Transport Route Changes",
            "Water Conservation Workshop",
        ]
    );
    assert_eq!(core.events().search_statistics().total_searches, 1);

    // Citizen reports an issue and an admin works it
    let id = core.submit_issue(&civitrack_core::models::IssueReport {
        location: "Harbour Road".to_string(),
        category: "Roads and Infrastructure".to_string(),
        description: "Minor crack in the sidewalk".to_string(),
        reported_at: now(),
    });
    assert_eq!(core.requests().get_request_by_id(id.as_str()).map(|r| r.priority), Some(RequestPriority::Low));
    assert_eq!(core.issues().last_submitted().map(|issue| issue.id.clone()), Some(id.clone()));
    assert_eq!(core.intake_statistics().pending_processing, 1);
    core.requests_mut().update_status(id.as_str(), RequestStatus::Assigned, "Admin", "Sent to crew");

    let view = core.track_request(id.as_str()).expect("tracked");
    assert_eq!(view.progress, 40.0);
    assert_eq!(view.timeline.len(), 2);
    let similar: Vec<&str> = view.similar.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(similar, vec!["Pothole Repair on Main Road"]);
    // Eight day average with nothing spent yet
    assert_eq!(view.estimated_days_to_completion, 8);

    let stats = core.requests().statistics();
    assert_eq!(stats.total, 9);
    assert_eq!(stats.by_category.get("Roads and Infrastructure"), Some(&2));
}
