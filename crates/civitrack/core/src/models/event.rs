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
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Highest event priority
pub const MIN_EVENT_PRIORITY: u8 = 1;
/// Lowest event priority
pub const MAX_EVENT_PRIORITY: u8 = 5;
/// Priority assigned when none is given
pub const DEFAULT_EVENT_PRIORITY: u8 = 3;
/// Events at or above this urgency enter the featured queue even when not flagged
pub const FEATURED_PRIORITY_THRESHOLD: u8 = 2;

/// Event identifier, `EVT` followed by the creation timestamp and a random suffix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Generate an identifier for an event created at `at`
    pub fn generate(at: NaiveDateTime) -> Self {
        Self(generate_id("EVT", at))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for EventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A municipal event or announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Free-text category; every distinct value joins the catalog's category set
    pub category: String,
    pub description: String,
    pub date: NaiveDateTime,
    pub location: String,
    pub image_url: Option<String>,
    /// 1 (highest) to 5 (lowest)
    pub priority: u8,
    pub tags: BTreeSet<String>,
    pub featured: bool,
    pub created_at: NaiveDateTime,
    pub attendee_count: u32,
}

impl Event {
    /// Create an event stamped with the current local time
    pub fn new(title: impl Into<String>, category: impl Into<String>, date: NaiveDateTime) -> Self {
        Self::created_at(title, category, date, Local::now().naive_local())
    }

    /// Create an event with an explicit creation time, which also seeds its id
    pub fn created_at(title: impl Into<String>, category: impl Into<String>, date: NaiveDateTime, created_at: NaiveDateTime) -> Self {
        Self {
            id: EventId::generate(created_at),
            title: title.into(),
            category: category.into(),
            description: String::new(),
            date,
            location: String::new(),
            image_url: None,
            priority: DEFAULT_EVENT_PRIORITY,
            tags: BTreeSet::new(),
            featured: false,
            created_at,
            attendee_count: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<EventId>) -> Self {
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

    /// Set the priority, clamped into `1..=5`
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(MIN_EVENT_PRIORITY, MAX_EVENT_PRIORITY);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    pub fn with_attendees(mut self, attendee_count: u32) -> Self {
        self.attendee_count = attendee_count;
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Calendar day the event falls on
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Whether the event belongs in the featured priority queue
    pub fn is_featured_candidate(&self) -> bool {
        self.featured || self.priority <= FEATURED_PRIORITY_THRESHOLD
    }

    /// Case-insensitive substring match against title, description, location or any tag
    ///
    /// `needle` must already be lower-cased.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.location.to_lowercase().contains(needle)
            || self.has_tag_containing(needle)
    }

    /// Whether any tag contains `needle` (already lower-cased)
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }

    /// Number of tags shared with another event
    pub fn shared_tag_count(&self, other: &Event) -> usize {
        self.tags.intersection(&other.tags).count()
    }
}

/// Aggregate view over tracked searches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Sum of all free-text search frequencies
    pub total_searches: u64,
    /// Size of the catalog's category set
    pub unique_categories: usize,
    /// Category filter used most often, if any has been used
    pub most_searched_category: Option<String>,
    pub category_frequency: BTreeMap<String, u64>,
}
