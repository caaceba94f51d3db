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

use crate::models::{RequestStatus, ServiceRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate figures over every tracked request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestStatistics {
    pub total: usize,
    /// Not completed, rejected or cancelled
    pub pending: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Mean days from submission to completion, 0 when nothing has completed
    pub average_completion_days: f64,
    pub by_status: BTreeMap<RequestStatus, usize>,
    pub by_category: BTreeMap<String, usize>,
}

impl RequestStatistics {
    pub fn from_requests<'a, I>(requests: I) -> Self
    where
        I: IntoIterator<Item = &'a ServiceRequest>,
    {
        let mut stats = Self::default();
        let mut completion_total = 0.0;
        let mut completion_samples = 0usize;

        for request in requests {
            stats.total += 1;
            if request.status.is_pending() {
                stats.pending += 1;
            }
            match request.status {
                RequestStatus::Completed => stats.completed += 1,
                RequestStatus::InProgress => stats.in_progress += 1,
                _ => {}
            }
            if let Some(days) = request.completion_days() {
                completion_total += days;
                completion_samples += 1;
            }
            *stats.by_status.entry(request.status).or_insert(0) += 1;
            *stats.by_category.entry(request.category.clone()).or_insert(0) += 1;
        }

        if completion_samples > 0 {
            stats.average_completion_days = completion_total / completion_samples as f64;
        }
        stats
    }
}
