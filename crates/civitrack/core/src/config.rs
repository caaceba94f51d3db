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

//! Configuration for the civitrack core

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "CIVITRACK_";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Tunables for the catalog, tracker and their default views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Capacity of the recent-search queue
    pub max_recent_searches: usize,

    /// Default number of recommendations returned
    pub recommendation_count: usize,

    /// Default number of featured events returned
    pub featured_count: usize,

    /// Default number of related events returned
    pub related_count: usize,

    /// Default number of requests in the high priority view
    pub high_priority_count: usize,

    /// Number of same-category requests shown when tracking a request
    pub similar_request_count: usize,

    /// Load the sample events and requests at start-up
    pub seed_sample_data: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_recent_searches: 10,
            recommendation_count: 6,
            featured_count: 5,
            related_count: 5,
            high_priority_count: 10,
            similar_request_count: 5,
            seed_sample_data: true,
        }
    }
}

impl CoreConfig {
    /// Load configuration from `CIVITRACK_*` environment variables, falling back to defaults
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            max_recent_searches: read(&lookup, "MAX_RECENT_SEARCHES", defaults.max_recent_searches)?,
            recommendation_count: read(&lookup, "RECOMMENDATION_COUNT", defaults.recommendation_count)?,
            featured_count: read(&lookup, "FEATURED_COUNT", defaults.featured_count)?,
            related_count: read(&lookup, "RELATED_COUNT", defaults.related_count)?,
            high_priority_count: read(&lookup, "HIGH_PRIORITY_COUNT", defaults.high_priority_count)?,
            similar_request_count: read(&lookup, "SIMILAR_REQUEST_COUNT", defaults.similar_request_count)?,
            seed_sample_data: read(&lookup, "SEED_SAMPLE_DATA", defaults.seed_sample_data)?,
        })
    }
}

fn read<F, T>(lookup: &F, name: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let key = format!("{ENV_PREFIX}{name}");
    match lookup(&key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.max_recent_searches, 10);
        assert_eq!(config.recommendation_count, 6);
        assert_eq!(config.featured_count, 5);
        assert!(config.seed_sample_data);
    }

    #[test]
    fn test_empty_lookup_gives_defaults() {
        let config = CoreConfig::from_lookup(|_| None).expect("defaults load");
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = CoreConfig::from_lookup(lookup_from(&[("CIVITRACK_MAX_RECENT_SEARCHES", "3"), ("CIVITRACK_SEED_SAMPLE_DATA", " false ")])).expect("overrides load");

        assert_eq!(config.max_recent_searches, 3);
        assert!(!config.seed_sample_data);
        assert_eq!(config.high_priority_count, 10);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = CoreConfig::from_lookup(lookup_from(&[("CIVITRACK_FEATURED_COUNT", "many")])).unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "CIVITRACK_FEATURED_COUNT".to_string(),
                value: "many".to_string()
            }
        );
        assert_eq!(err.to_string(), "Invalid value for CIVITRACK_FEATURED_COUNT: \"many\"");
    }
}
