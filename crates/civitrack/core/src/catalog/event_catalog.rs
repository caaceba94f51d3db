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

use super::recommendation::{RecommendationContext, RecommendationEngine, ScoredEvent};
use super::search_tracker::SearchTracker;
use crate::clock::Clock;
use crate::indices::{Index, IndexStats, MinHeap, OrderedIndex, append_to_group};
use crate::models::{Event, EventId, SearchStatistics};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Featured queue entry; ties on priority fall back to insertion order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct FeaturedEntry {
    priority: u8,
    sequence: u64,
    id: EventId,
}

/// Owns every event and the structures built over them
///
/// Updates and deletes rebuild the date index and the featured queue from the
/// primary map. Search tracking sits behind its own mutex so searches only need
/// shared access to the catalog.
pub struct EventCatalog {
    events: HashMap<EventId, Event>,
    /// Ids in the order they were first added
    insertion_order: Vec<EventId>,
    by_date: OrderedIndex<NaiveDate, Vec<EventId>>,
    categories: BTreeSet<String>,
    featured: MinHeap<FeaturedEntry>,
    next_sequence: u64,
    searches: Mutex<SearchTracker>,
    clock: Arc<dyn Clock>,
}

impl EventCatalog {
    pub fn new(clock: Arc<dyn Clock>, max_recent_searches: usize) -> Self {
        Self {
            events: HashMap::new(),
            insertion_order: Vec::new(),
            by_date: OrderedIndex::new(),
            categories: BTreeSet::new(),
            featured: MinHeap::new(),
            next_sequence: 0,
            searches: Mutex::new(SearchTracker::new(max_recent_searches)),
            clock,
        }
    }

    /// Add an event to every structure
    ///
    /// An event whose id is already present replaces the stored one.
    pub fn add_event(&mut self, event: Event) -> EventId {
        let id = event.id.clone();
        if self.events.contains_key(&id) {
            self.replace_event(event);
            return id;
        }

        append_to_group(&mut self.by_date, event.day(), id.clone());
        self.categories.insert(event.category.clone());
        if event.is_featured_candidate() {
            self.push_featured(&event);
        }

        debug!(event_id = %id, category = %event.category, "Event added");
        self.insertion_order.push(id.clone());
        self.events.insert(id.clone(), event);
        id
    }

    /// Replace a stored event, returning `false` if its id is unknown
    pub fn update_event(&mut self, event: Event) -> bool {
        if !self.events.contains_key(&event.id) {
            return false;
        }
        self.replace_event(event);
        true
    }

    fn replace_event(&mut self, event: Event) {
        debug!(event_id = %event.id, "Event updated");
        self.categories.insert(event.category.clone());
        self.events.insert(event.id.clone(), event);
        self.rebuild_secondary_indexes();
    }

    /// Remove an event, returning whether it existed
    pub fn delete_event(&mut self, id: &str) -> bool {
        if self.events.remove(id).is_none() {
            return false;
        }
        self.insertion_order.retain(|existing| existing.as_str() != id);
        debug!(event_id = id, "Event deleted");
        self.rebuild_secondary_indexes();
        true
    }

    /// Regenerate the date index and featured queue from the primary map
    fn rebuild_secondary_indexes(&mut self) {
        self.by_date.clear();
        self.featured.clear();
        self.next_sequence = 0;

        for id in &self.insertion_order {
            if let Some(event) = self.events.get(id) {
                append_to_group(&mut self.by_date, event.day(), id.clone());
                if event.is_featured_candidate() {
                    self.featured.insert(FeaturedEntry {
                        priority: event.priority,
                        sequence: self.next_sequence,
                        id: id.clone(),
                    });
                    self.next_sequence += 1;
                }
            }
        }

        debug!(events = self.events.len(), featured = self.featured.len(), "Rebuilt event indexes");
    }

    fn push_featured(&mut self, event: &Event) {
        self.featured.insert(FeaturedEntry {
            priority: event.priority,
            sequence: self.next_sequence,
            id: event.id.clone(),
        });
        self.next_sequence += 1;
    }

    pub fn get_event_by_id(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    /// All events in the order they were added
    pub fn get_all_events(&self) -> Vec<&Event> {
        self.insertion_order.iter().filter_map(|id| self.events.get(id)).collect()
    }

    fn resolve<'a>(&'a self, ids: &'a [EventId]) -> impl Iterator<Item = &'a Event> + 'a {
        ids.iter().filter_map(|id| self.events.get(id))
    }

    /// Filter events, tracking any query or category used
    ///
    /// The query matches title, description, location or tags ignoring case.
    /// The category must match exactly and `start` is an inclusive lower bound
    /// on the event day. Results are ordered by event date.
    pub fn search_events(&self, query: Option<&str>, category: Option<&str>, start: Option<NaiveDate>) -> Vec<&Event> {
        let query = query.filter(|q| !q.trim().is_empty());
        let category = category.filter(|c| !c.trim().is_empty());

        {
            let mut searches = self.searches.lock();
            if let Some(query) = query {
                searches.track_search(query);
            }
            if let Some(category) = category {
                searches.track_category(category);
            }
        }

        let needle = query.map(str::to_lowercase);
        let mut results: Vec<&Event> = self
            .get_all_events()
            .into_iter()
            .filter(|event| needle.as_deref().is_none_or(|needle| event.matches_query(needle)))
            .filter(|event| category.is_none_or(|category| event.category == category))
            .filter(|event| start.is_none_or(|start| event.day() >= start))
            .collect();

        results.sort_by_key(|event| event.date);
        results
    }

    /// Up to `count` events from the featured queue, most urgent first
    pub fn get_featured_events(&self, count: usize) -> Vec<&Event> {
        self.featured.top_k(count).into_iter().filter_map(|entry| self.events.get(&entry.id)).collect()
    }

    /// Categories seen so far, sorted
    pub fn categories(&self) -> Vec<String> {
        self.categories.iter().cloned().collect()
    }

    /// Best upcoming events for the given search context
    pub fn get_recommendations(&self, current_search: Option<&str>, current_category: Option<&str>, count: usize) -> Vec<&Event> {
        self.get_scored_recommendations(current_search, current_category, count).into_iter().map(|scored| scored.event).collect()
    }

    pub fn get_scored_recommendations(&self, current_search: Option<&str>, current_category: Option<&str>, count: usize) -> Vec<ScoredEvent<'_>> {
        let now = self.clock.now();
        let context = RecommendationContext::new(current_search, current_category);
        let searches = self.searches.lock();
        RecommendationEngine::recommend(self.get_all_events(), &searches, &context, now, count)
    }

    /// Events sharing tags with `base`, most shared first
    pub fn get_related_events(&self, base: &Event, count: usize) -> Vec<&Event> {
        RecommendationEngine::related(base, self.get_all_events(), count)
    }

    pub fn total_events(&self) -> usize {
        self.events.len()
    }

    /// Events dated now or later
    pub fn upcoming_events_count(&self) -> usize {
        let now = self.clock.now();
        self.events.values().filter(|event| event.date >= now).count()
    }

    /// Events explicitly flagged as featured
    pub fn featured_events_count(&self) -> usize {
        self.events.values().filter(|event| event.featured).count()
    }

    /// The date index as `(day, events)` pairs in ascending day order
    pub fn events_by_date(&self) -> Vec<(NaiveDate, Vec<&Event>)> {
        self.by_date.in_order_traversal().into_iter().map(|(day, ids)| (*day, self.resolve(ids).collect())).collect()
    }

    /// Events on one calendar day
    pub fn events_on(&self, day: NaiveDate) -> Vec<&Event> {
        self.by_date.search(&day).map(|ids| self.resolve(ids).collect()).unwrap_or_default()
    }

    /// Group an arbitrary list of events by calendar day
    pub fn organize_by_date<'a, I>(events: I) -> BTreeMap<NaiveDate, Vec<&'a Event>>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut grouped: BTreeMap<NaiveDate, Vec<&'a Event>> = BTreeMap::new();
        for event in events {
            grouped.entry(event.day()).or_default().push(event);
        }
        grouped
    }

    /// Record a free-text search without filtering; blank input is ignored
    pub fn track_search(&self, term: &str) -> bool {
        self.searches.lock().track_search(term)
    }

    /// Record use of a category filter; blank input is ignored
    pub fn track_category_search(&self, category: &str) -> bool {
        self.searches.lock().track_category(category)
    }

    /// Recent searches, oldest first
    pub fn recent_searches(&self) -> Vec<String> {
        self.searches.lock().recent_searches()
    }

    /// Full search history, most recent first
    pub fn search_history(&self) -> Vec<String> {
        self.searches.lock().search_history()
    }

    pub fn search_statistics(&self) -> SearchStatistics {
        let searches = self.searches.lock();
        SearchStatistics {
            total_searches: searches.total_searches(),
            unique_categories: self.categories.len(),
            most_searched_category: searches.most_searched_category().map(str::to_string),
            category_frequency: searches.category_frequencies().clone(),
        }
    }

    pub fn date_index_stats(&self) -> IndexStats {
        self.by_date.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, MockClock};
    use chrono::{Duration, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 1).and_then(|d| d.and_hms_opt(9, 0, 0)).expect("valid date")
    }

    fn catalog() -> EventCatalog {
        EventCatalog::new(Arc::new(FixedClock(now())), 10)
    }

    fn event(id: &str, days: i64, priority: u8, featured: bool) -> Event {
        Event::created_at(format!("Event {id}"), "Community", now() + Duration::days(days), now())
            .with_id(id)
            .with_priority(priority)
            .with_featured(featured)
    }

    #[test]
    fn test_add_and_get() {
        let mut catalog = catalog();
        catalog.add_event(event("A", 1, 3, false));
        catalog.add_event(event("B", 2, 3, false));

        assert_eq!(catalog.total_events(), 2);
        assert_eq!(catalog.get_event_by_id("A").map(|e| e.title.as_str()), Some("Event A"));
        assert!(catalog.get_event_by_id("Z").is_none());
        let ids: Vec<&str> = catalog.get_all_events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_add_existing_id_replaces() {
        let mut catalog = catalog();
        catalog.add_event(event("A", 1, 1, false));
        catalog.add_event(event("A", 3, 5, false).with_location("Hall"));

        assert_eq!(catalog.total_events(), 1);
        assert_eq!(catalog.get_all_events().len(), 1);
        assert!(catalog.get_featured_events(5).is_empty());
        assert!(catalog.events_on(now().date() + Duration::days(1)).is_empty());
        assert_eq!(catalog.events_on(now().date() + Duration::days(3)).len(), 1);
    }

    #[test]
    fn test_featured_events_in_priority_order() {
        let mut catalog = catalog();
        catalog.add_event(event("day1", 1, 1, false));
        catalog.add_event(event("day2", 2, 3, true));
        catalog.add_event(event("day3", 3, 5, false));

        let featured: Vec<&str> = catalog.get_featured_events(2).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(featured, vec!["day1", "day2"]);
        // Reading is non-destructive
        assert_eq!(catalog.get_featured_events(10).len(), 2);
    }

    #[test]
    fn test_update_rebuilds_indexes() {
        let mut catalog = catalog();
        catalog.add_event(event("A", 1, 4, false));
        assert!(catalog.get_featured_events(5).is_empty());

        let edited = event("A", 5, 2, false).with_tags(["roads"]);
        assert!(catalog.update_event(edited));

        assert_eq!(catalog.get_featured_events(5).len(), 1);
        assert!(catalog.events_on(now().date() + Duration::days(1)).is_empty());
        assert_eq!(catalog.events_on(now().date() + Duration::days(5)).len(), 1);
        assert!(!catalog.update_event(event("missing", 1, 1, true)));
        assert_eq!(catalog.total_events(), 1);
    }

    #[test]
    fn test_delete_event() {
        let mut catalog = catalog();
        catalog.add_event(event("A", 1, 1, true));
        catalog.add_event(event("B", 1, 2, false));

        assert!(catalog.delete_event("A"));
        assert!(!catalog.delete_event("A"));
        assert!(catalog.get_event_by_id("A").is_none());

        let featured: Vec<&str> = catalog.get_featured_events(5).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(featured, vec!["B"]);
        assert_eq!(catalog.events_on(now().date() + Duration::days(1)).len(), 1);
    }

    #[test]
    fn test_search_filters_and_tracks() {
        let mut catalog = catalog();
        catalog.add_event(event("late", 9, 3, false).with_tags(["Water"]));
        catalog.add_event(event("early", 2, 3, false).with_description("water saving"));
        catalog.add_event(Event::created_at("Budget", "Government", now() + Duration::days(4), now()).with_id("gov"));

        let results: Vec<&str> = catalog.search_events(Some("WATER"), None, None).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(results, vec!["early", "late"]);

        let results = catalog.search_events(None, Some("Government"), None);
        assert_eq!(results.len(), 1);

        let start = now().date() + Duration::days(4);
        let results: Vec<&str> = catalog.search_events(None, None, Some(start)).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(results, vec!["gov", "late"]);

        let stats = catalog.search_statistics();
        assert_eq!(stats.total_searches, 1);
        assert_eq!(stats.unique_categories, 2);
        assert_eq!(stats.most_searched_category.as_deref(), Some("Government"));
        assert_eq!(catalog.recent_searches(), vec!["WATER"]);
    }

    #[test]
    fn test_blank_search_is_not_tracked() {
        let mut catalog = catalog();
        catalog.add_event(event("A", 1, 3, false));

        assert_eq!(catalog.search_events(Some("  "), Some(""), None).len(), 1);
        assert!(catalog.search_history().is_empty());
        assert_eq!(catalog.search_statistics().most_searched_category, None);
    }

    #[test]
    fn test_categories_sorted_and_growing() {
        let mut catalog = catalog();
        catalog.add_event(Event::new("x", "Utilities", now()).with_id("1"));
        catalog.add_event(Event::new("y", "Education", now()).with_id("2"));
        catalog.delete_event("1");

        assert_eq!(catalog.categories(), vec!["Education".to_string(), "Utilities".to_string()]);
    }

    #[test]
    fn test_events_by_date_and_organize() {
        let mut catalog = catalog();
        catalog.add_event(event("b", 2, 3, false));
        catalog.add_event(event("a", 1, 3, false));
        catalog.add_event(event("c", 2, 3, false));

        let grouped: Vec<(NaiveDate, Vec<&str>)> = catalog
            .events_by_date()
            .into_iter()
            .map(|(day, events)| (day, events.iter().map(|e| e.id.as_str()).collect()))
            .collect();
        assert_eq!(grouped, vec![(now().date() + Duration::days(1), vec!["a"]), (now().date() + Duration::days(2), vec!["b", "c"])]);

        let all = catalog.get_all_events();
        let organized = EventCatalog::organize_by_date(all.iter().copied());
        assert_eq!(organized.len(), 2);
        assert_eq!(catalog.date_index_stats().entry_count, 2);
    }

    #[test]
    fn test_counts() {
        let mut catalog = catalog();
        catalog.add_event(event("past", -2, 3, true));
        catalog.add_event(event("future", 2, 3, false));

        assert_eq!(catalog.total_events(), 2);
        assert_eq!(catalog.upcoming_events_count(), 1);
        assert_eq!(catalog.featured_events_count(), 1);
    }

    #[test]
    fn test_recommendations_consult_clock_once() {
        let mut clock = MockClock::new();
        clock.expect_now().times(1).return_const(now());

        let mut catalog = EventCatalog::new(Arc::new(clock), 10);
        catalog.add_event(event("A", 3, 2, true));
        catalog.add_event(event("B", 30, 5, false));

        let recommended: Vec<&str> = catalog.get_recommendations(None, None, 6).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(recommended, vec!["A", "B"]);
    }

    #[test]
    fn test_tracked_searches_shift_recommendations() {
        let mut catalog = catalog();
        catalog.add_event(event("plain", 3, 3, false));
        catalog.add_event(event("garden", 3, 3, false).with_tags(["garden"]));

        catalog.track_search("garden");
        let scored = catalog.get_scored_recommendations(None, None, 2);

        assert_eq!(scored[0].event.id.as_str(), "garden");
        assert_eq!(scored[0].score - scored[1].score, 10.0);
    }
}
