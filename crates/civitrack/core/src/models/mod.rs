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

//! Domain entities
//!
//! Events and service requests are plain data. They carry no references to
//! the catalog or tracker that owns them, so callers can clone, edit and hand
//! them back for re-indexing.

pub mod event;
pub mod service_request;

pub use event::*;
pub use service_request::*;

use chrono::NaiveDateTime;
use rand::Rng;

/// Build a time-based identifier: prefix, `yyyyMMddHHmmss`, then three random digits
pub(crate) fn generate_id(prefix: &str, at: NaiveDateTime) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(100..999);
    format!("{prefix}{}{suffix}", at.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_generate_id_layout() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 9).and_then(|d| d.and_hms_opt(7, 5, 1)).expect("valid timestamp");

        let id = generate_id("EVT", at);

        assert_eq!(id.len(), 3 + 14 + 3);
        assert!(id.starts_with("EVT20250309070501"));
        let suffix: u16 = id[17..].parse().expect("numeric suffix");
        assert!((100..999).contains(&suffix));
    }
}
