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
use civitrack_core::models::{Event, RequestStatus, ServiceRequest};
use civitrack_core::{CoreConfig, FixedClock, MunicipalCore};
use std::sync::Arc;
use std::thread;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, 1).and_then(|d| d.and_hms_opt(8, 0, 0)).expect("valid date")
}

#[test]
fn test_concurrent_readers_and_writers() {
    let core = Arc::new(MunicipalCore::new(CoreConfig::default(), Arc::new(FixedClock(now()))));
    let mut handles = Vec::new();

    for writer in 0..4 {
        let core = Arc::clone(&core);
        handles.push(thread::spawn(move || {
            for i in 0..50i64 {
                let id = format!("W{writer}-{i}");
                let event = Event::created_at(format!("Writer {writer} event {i}"), "Load", now() + Duration::days(i % 20), now())
                    .with_id(id.as_str())
                    .with_priority((i % 5 + 1) as u8);
                core.events_mut().add_event(event);
                if i % 10 == 0 {
                    core.events_mut().delete_event(&id);
                }

                let request = ServiceRequest::submitted_at(format!("Writer {writer} request {i}"), "Load", now() - Duration::hours(i))
                    .with_id(id.as_str());
                core.requests_mut().add_request(request);
                core.requests_mut().update_status(&id, RequestStatus::UnderReview, "Writer", "");
            }
        }));
    }

    for reader in 0..4 {
        let core = Arc::clone(&core);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                let catalog = core.events();
                let featured = catalog.get_featured_events(100);
                assert!(featured.iter().all(|e| e.featured || e.priority <= 2));
                let by_date: usize = catalog.events_by_date().iter().map(|(_, events)| events.len()).sum();
                assert_eq!(by_date, catalog.total_events());
                catalog.search_events(Some(&format!("writer {reader}")), None, None);
                drop(catalog);

                let tracker = core.requests();
                assert_eq!(tracker.get_requests_in_order_by_date().len(), tracker.total_requests());
                let high = tracker.get_high_priority_requests(5);
                assert!(high.windows(2).all(|pair| pair[0].priority <= pair[1].priority));
            }
        }));
    }

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    // 12 sample events plus 4 writers * 45 survivors
    assert_eq!(core.events().total_events(), 12 + 4 * 45);
    assert_eq!(core.requests().total_requests(), 8 + 4 * 50);
    assert_eq!(core.events().search_statistics().total_searches, 4 * 50);
    assert!(
        core.requests()
            .get_all_requests()
            .iter()
            .filter(|r| r.id.as_str().starts_with('W'))
            .all(|r| r.status == RequestStatus::UnderReview && r.status_history().len() == 2)
    );
}
