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

//! Additive event recommendation scoring
//!
//! Every upcoming event earns points from the accumulated search signal, the
//! caller's current search context and its own attributes. The weights below
//! are fixed; changing them changes which events users are shown.

use super::search_tracker::SearchTracker;
use crate::models::Event;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::trace;

/// Points per tracked search of a term found in the event
pub const TERM_FREQUENCY_WEIGHT: f64 = 10.0;
/// Points per tracked use of the event's category as a filter
pub const CATEGORY_FREQUENCY_WEIGHT: f64 = 5.0;
/// Current search found in the title
pub const TITLE_MATCH_BONUS: f64 = 50.0;
/// Current search found in the description
pub const DESCRIPTION_MATCH_BONUS: f64 = 30.0;
/// Current search found in a tag
pub const TAG_MATCH_BONUS: f64 = 40.0;
/// Event is in the currently selected category
pub const CATEGORY_MATCH_BONUS: f64 = 60.0;
pub const FEATURED_BONUS: f64 = 20.0;
/// Multiplied by `6 - priority`
pub const PRIORITY_WEIGHT: f64 = 10.0;
pub const ATTENDEE_WEIGHT: f64 = 0.1;
/// Event happens within a week
pub const THIS_WEEK_BONUS: f64 = 30.0;
/// Event happens within two weeks
pub const NEXT_WEEK_BONUS: f64 = 15.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// What the user is looking at right now
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationContext<'a> {
    pub current_search: Option<&'a str>,
    pub current_category: Option<&'a str>,
}

impl<'a> RecommendationContext<'a> {
    pub fn new(current_search: Option<&'a str>, current_category: Option<&'a str>) -> Self {
        Self { current_search, current_category }
    }

    /// Lower-cased current search, if it has any non-blank content
    fn search_needle(&self) -> Option<String> {
        self.current_search.filter(|s| !s.trim().is_empty()).map(str::to_lowercase)
    }

    fn category(&self) -> Option<&'a str> {
        self.current_category.filter(|c| !c.trim().is_empty())
    }
}

/// An event together with the score that ranked it
#[derive(Debug, Clone, Serialize)]
pub struct ScoredEvent<'a> {
    pub event: &'a Event,
    pub score: f64,
}

/// Stateless scorer over catalog events and tracked search activity
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Score one event
    pub fn score(event: &Event, searches: &SearchTracker, context: &RecommendationContext<'_>, now: NaiveDateTime) -> f64 {
        Self::score_with_needle(event, searches, context.search_needle().as_deref(), context.category(), now)
    }

    fn score_with_needle(event: &Event, searches: &SearchTracker, needle: Option<&str>, category: Option<&str>, now: NaiveDateTime) -> f64 {
        let mut score = 0.0;

        let title = event.title.to_lowercase();
        let description = event.description.to_lowercase();

        for (term, frequency) in searches.term_frequencies() {
            if title.contains(term.as_str()) || description.contains(term.as_str()) || event.has_tag_containing(term) {
                score += *frequency as f64 * TERM_FREQUENCY_WEIGHT;
            }
        }

        if let Some(frequency) = searches.category_frequency(&event.category) {
            score += frequency as f64 * CATEGORY_FREQUENCY_WEIGHT;
        }

        if let Some(needle) = needle {
            if title.contains(needle) {
                score += TITLE_MATCH_BONUS;
            }
            if description.contains(needle) {
                score += DESCRIPTION_MATCH_BONUS;
            }
            if event.has_tag_containing(needle) {
                score += TAG_MATCH_BONUS;
            }
        }

        if category == Some(event.category.as_str()) {
            score += CATEGORY_MATCH_BONUS;
        }

        if event.featured {
            score += FEATURED_BONUS;
        }

        score += (6.0 - f64::from(event.priority)) * PRIORITY_WEIGHT;
        score += f64::from(event.attendee_count) * ATTENDEE_WEIGHT;

        let days_until = (event.date - now).num_seconds() as f64 / SECONDS_PER_DAY;
        if days_until <= 7.0 {
            score += THIS_WEEK_BONUS;
        } else if days_until <= 14.0 {
            score += NEXT_WEEK_BONUS;
        }

        score
    }

    /// Rank the upcoming events and keep the best `count`
    ///
    /// Past events are skipped and only strictly positive scores survive. Equal
    /// scores keep the order in which `events` yielded them.
    pub fn recommend<'a, I>(events: I, searches: &SearchTracker, context: &RecommendationContext<'_>, now: NaiveDateTime, count: usize) -> Vec<ScoredEvent<'a>>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let needle = context.search_needle();
        let category = context.category();

        let mut scored: Vec<ScoredEvent<'a>> = events
            .into_iter()
            .filter(|event| event.date >= now)
            .map(|event| ScoredEvent {
                event,
                score: Self::score_with_needle(event, searches, needle.as_deref(), category, now),
            })
            .filter(|candidate| candidate.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(count);

        trace!(returned = scored.len(), "Scored recommendations");
        scored
    }

    /// Events sharing at least one tag with `base`, most shared tags first
    pub fn related<'a, I>(base: &Event, events: I, count: usize) -> Vec<&'a Event>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut related: Vec<(usize, &'a Event)> = events
            .into_iter()
            .filter(|event| event.id != base.id)
            .map(|event| (base.shared_tag_count(event), event))
            .filter(|(shared, _)| *shared > 0)
            .collect();

        related.sort_by(|a, b| b.0.cmp(&a.0));
        related.into_iter().take(count).map(|(_, event)| event).collect()
    }
}
