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

//! Civitrack core
//!
//! In-memory indexing and scoring behind a municipal services portal: event
//! discovery with recommendations, service request tracking with a priority
//! queue, and a dependency graph between requests.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod graph;
pub mod indices;
pub mod intake;
pub mod models;
pub mod seed;
pub mod service;
pub mod tracker;

pub use catalog::{EventCatalog, RecommendationEngine, SearchTracker};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ConfigResult, CoreConfig};
pub use intake::{IntakeStatistics, Issue, IssueRegistry};
pub use service::MunicipalCore;
pub use tracker::{RequestStatistics, RequestTracker, RequestTracking};
