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

//! Sample events and service requests for demos and first start-up

use crate::catalog::EventCatalog;
use crate::models::{DependencyType, Event, RequestPriority, RequestStatus, ServiceRequest};
use crate::tracker::RequestTracker;
use chrono::{Duration, NaiveDateTime};
use tracing::info;

struct SampleEvent {
    title: &'static str,
    category: &'static str,
    description: &'static str,
    days_ahead: i64,
    location: &'static str,
    priority: u8,
    featured: bool,
    attendees: u32,
    tags: [&'static str; 3],
}

const SAMPLE_EVENTS: [SampleEvent; 12] = [
    SampleEvent {
        title: "Community Clean-Up Day",
        category: "Community Service",
        description: "Join us for a city-wide clean-up initiative. Help keep our community beautiful!",
        days_ahead: 5,
        location: "Central Park, Cape Town",
        priority: 2,
        featured: true,
        attendees: 150,
        tags: ["community", "environment", "volunteer"],
    },
    SampleEvent {
        title: "Water Conservation Workshop",
        category: "Education",
        description: "Learn practical tips for saving water in your home and garden.",
        days_ahead: 7,
        location: "Municipal Hall",
        priority: 2,
        featured: true,
        attendees: 75,
        tags: ["water", "conservation", "education"],
    },
    SampleEvent {
        title: "Road Maintenance Schedule - Main Street",
        category: "Infrastructure",
        description: "Scheduled maintenance on Main Street. Expect delays between 9 AM - 5 PM.",
        days_ahead: 2,
        location: "Main Street",
        priority: 1,
        featured: true,
        attendees: 0,
        tags: ["roads", "maintenance", "traffic"],
    },
    SampleEvent {
        title: "Municipal Budget Public Meeting",
        category: "Government",
        description: "Public consultation on the upcoming municipal budget. Your input matters!",
        days_ahead: 10,
        location: "City Hall Auditorium",
        priority: 2,
        featured: true,
        attendees: 200,
        tags: ["budget", "government", "consultation"],
    },
    SampleEvent {
        title: "Local Farmers Market",
        category: "Community",
        description: "Fresh produce and local crafts every Saturday morning.",
        days_ahead: 3,
        location: "Town Square",
        priority: 3,
        featured: false,
        attendees: 500,
        tags: ["market", "local", "food"],
    },
    SampleEvent {
        title: "Electricity Load Shedding Schedule Update",
        category: "Utilities",
        description: "Updated load shedding schedule for the month. Check your area.",
        days_ahead: 1,
        location: "City-wide",
        priority: 1,
        featured: true,
        attendees: 0,
        tags: ["electricity", "loadshedding", "schedule"],
    },
    SampleEvent {
        title: "Youth Sports Program Registration",
        category: "Recreation",
        description: "Register your children for summer sports programs. Limited spaces available.",
        days_ahead: 14,
        location: "Community Sports Center",
        priority: 3,
        featured: false,
        attendees: 120,
        tags: ["sports", "youth", "recreation"],
    },
    SampleEvent {
        title: "Waste Collection Holiday Schedule",
        category: "Sanitation",
        description: "Changes to waste collection schedule during public holidays.",
        days_ahead: 8,
        location: "All Residential Areas",
        priority: 2,
        featured: false,
        attendees: 0,
        tags: ["waste", "collection", "schedule"],
    },
    SampleEvent {
        title: "Fire Safety Awareness Campaign",
        category: "Safety",
        description: "Learn about fire prevention and safety measures for your home.",
        days_ahead: 12,
        location: "Fire Station",
        priority: 2,
        featured: true,
        attendees: 60,
        tags: ["fire", "safety", "education"],
    },
    SampleEvent {
        title: "Small Business Development Workshop",
        category: "Economic Development",
        description: "Resources and support for local entrepreneurs and small businesses.",
        days_ahead: 15,
        location: "Business Hub",
        priority: 3,
        featured: false,
        attendees: 85,
        tags: ["business", "development", "workshop"],
    },
    SampleEvent {
        title: "Public Transport Route Changes",
        category: "Transportation",
        description: "New bus routes and schedule changes effective next month.",
        days_ahead: 6,
        location: "City-wide",
        priority: 2,
        featured: true,
        attendees: 0,
        tags: ["transport", "bus", "schedule"],
    },
    SampleEvent {
        title: "Community Garden Opening",
        category: "Community",
        description: "Grand opening of our new community garden. Free seeds and tools!",
        days_ahead: 9,
        location: "Green Valley Park",
        priority: 3,
        featured: false,
        attendees: 95,
        tags: ["garden", "community", "green"],
    },
];

/// The twelve sample events, dated relative to `now`
///
/// Ids carry an index suffix so events created within the same second stay distinct.
pub fn sample_events(now: NaiveDateTime) -> Vec<Event> {
    SAMPLE_EVENTS
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            let event = Event::created_at(sample.title, sample.category, now + Duration::days(sample.days_ahead), now);
            let id = format!("{}{:02}", event.id, index);
            event
                .with_id(id)
                .with_description(sample.description)
                .with_location(sample.location)
                .with_priority(sample.priority)
                .with_featured(sample.featured)
                .with_attendees(sample.attendees)
                .with_tags(sample.tags)
        })
        .collect()
}

/// The eight sample requests, timestamped relative to `now`
pub fn sample_requests(now: NaiveDateTime) -> Vec<ServiceRequest> {
    let days = Duration::days;
    let hours = Duration::hours;

    let mut requests = vec![
        ServiceRequest::submitted_at("Pothole Repair on Main Road", "Roads and Infrastructure", now - days(5))
            .with_description("Large pothole causing traffic issues on Main Road near City Hall")
            .with_location("Main Road, City Centre")
            .with_status(RequestStatus::InProgress)
            .with_priority(RequestPriority::High)
            .with_assignment("Road Maintenance", Some("Team A".to_string())),
        ServiceRequest::submitted_at("Street Light Not Working", "Electricity", now - days(7))
            .with_description("Street light pole #45 not functioning for 2 weeks")
            .with_location("Oak Street, Suburb")
            .with_status(RequestStatus::Assigned)
            .with_priority(RequestPriority::Medium)
            .with_assignment("Electrical Services", None),
        ServiceRequest::submitted_at("Water Leak Emergency", "Water and Sanitation", now - days(1))
            .with_description("Major water pipe burst flooding the street")
            .with_location("Elm Avenue, Downtown")
            .with_status(RequestStatus::InProgress)
            .with_priority(RequestPriority::Critical)
            .with_assignment("Water Department", Some("Emergency Team".to_string())),
        ServiceRequest::submitted_at("Illegal Dumping Reported", "Waste Management", now - days(3))
            .with_description("Construction waste illegally dumped in vacant lot")
            .with_location("Vacant Lot, Industrial Area")
            .with_status(RequestStatus::UnderReview)
            .with_priority(RequestPriority::Medium)
            .with_assignment("Waste Management", None),
        ServiceRequest::submitted_at("Park Equipment Damaged", "Parks and Recreation", now - days(10))
            .with_description("Children's playground slide broken and unsafe")
            .with_location("Central Park")
            .with_status(RequestStatus::Completed)
            .with_priority(RequestPriority::High)
            .with_assignment("Parks Department", Some("Maintenance Team".to_string())),
        ServiceRequest::submitted_at("Traffic Signal Malfunction", "Traffic and Transportation", now - hours(8))
            .with_description("Traffic light stuck on red at Main/First intersection")
            .with_location("Main St & First Ave")
            .with_status(RequestStatus::InProgress)
            .with_priority(RequestPriority::Critical)
            .with_assignment("Traffic Management", Some("Signal Team".to_string())),
        ServiceRequest::submitted_at("Graffiti Removal Request", "Public Safety", now - days(4))
            .with_description("Graffiti vandalism on municipal building wall")
            .with_location("Municipal Building, Downtown")
            .with_status(RequestStatus::Assigned)
            .with_priority(RequestPriority::Low)
            .with_assignment("Public Works", None),
        ServiceRequest::submitted_at("Stormwater Drain Blocked", "Water and Sanitation", now - days(2))
            .with_description("Drain blocked causing flooding during rain")
            .with_location("Pine Street, Residential"),
    ];

    // Milestone timestamps: (index, assigned, in progress, completed)
    let milestones = [
        (0, Some(now - days(3)), Some(now - days(1)), None),
        (1, Some(now - days(2)), None, None),
        (2, Some(now - hours(12)), Some(now - hours(6)), None),
        (4, Some(now - days(8)), Some(now - days(6)), Some(now - days(2))),
        (5, Some(now - hours(6)), Some(now - hours(4)), None),
        (6, Some(now - days(1)), None, None),
    ];
    for (index, assigned, in_progress, completed) in milestones {
        if let Some(request) = requests.get_mut(index) {
            request.assigned_at = assigned;
            request.in_progress_at = in_progress;
            request.completed_at = completed;
        }
    }

    for (index, request) in requests.iter_mut().enumerate() {
        request.id = format!("{}{:02}", request.id, index).into();
    }
    requests
}

/// Load the sample events into a catalog
pub fn seed_catalog(catalog: &mut EventCatalog, now: NaiveDateTime) -> usize {
    let events = sample_events(now);
    let count = events.len();
    for event in events {
        catalog.add_event(event);
    }
    info!(count, "Seeded sample events");
    count
}

/// Load the sample requests into a tracker and link two pairs of them
pub fn seed_tracker(tracker: &mut RequestTracker, now: NaiveDateTime) -> usize {
    let requests = sample_requests(now);
    let ids: Vec<String> = requests.iter().map(|request| request.id.to_string()).collect();
    let count = requests.len();

    for request in requests {
        tracker.add_request(request);
    }
    for (from, to) in [(0, 5), (2, 7)] {
        if let (Some(from), Some(to)) = (ids.get(from), ids.get(to)) {
            tracker.add_dependency(from, to, DependencyType::RelatedTo);
        }
    }

    info!(count, "Seeded sample service requests");
    count
}
