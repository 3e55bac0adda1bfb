// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sort and filter specifications applied by location stores.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Location;

/// Fields a location query can sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Rate,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Canonical field name, as used in share links and the CLI.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Rate => "rate",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "rate" => Ok(SortField::Rate),
            "createdAt" | "created" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated" => Ok(SortField::UpdatedAt),
            other => Err(format!("unknown sort field '{other}'")),
        }
    }
}

/// Single-field sort spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    pub field: SortField,
    pub descending: bool,
}

impl SortBy {
    /// Ordering of `a` relative to `b` under this spec.
    #[must_use]
    pub fn compare(&self, a: &Location, b: &Location) -> Ordering {
        let ord = match self.field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Rate => a.rate.cmp(&b.rate),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// Free-text plus minimum-rating filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterBy {
    /// Case-insensitive match against name and address. Empty matches all.
    pub txt: String,
    /// Only records rated at least this high pass.
    pub min_rate: u8,
}

impl FilterBy {
    /// Whether `loc` passes this filter.
    #[must_use]
    pub fn matches(&self, loc: &Location) -> bool {
        if loc.rate < self.min_rate {
            return false;
        }
        if self.txt.is_empty() {
            return true;
        }
        let needle = self.txt.to_lowercase();
        loc.name.to_lowercase().contains(&needle)
            || loc.geo.address.to_lowercase().contains(&needle)
    }

    /// Whether this filter passes every record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.txt.is_empty() && self.min_rate == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geo;
    use chrono::Utc;

    fn loc(name: &str, rate: u8, address: &str) -> Location {
        let now = Utc::now();
        Location {
            id: name.to_string(),
            name: name.to_string(),
            rate,
            geo: Geo {
                lat: 0.0,
                lng: 0.0,
                address: address.to_string(),
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filter_matches_name_and_address() {
        let filter = FilterBy {
            txt: "park".to_string(),
            min_rate: 0,
        };
        assert!(filter.matches(&loc("Hyde Park", 2, "London")));
        assert!(filter.matches(&loc("Lunch spot", 2, "Parkside Ave")));
        assert!(!filter.matches(&loc("Museum", 2, "Berlin")));
    }

    #[test]
    fn test_filter_min_rate() {
        let filter = FilterBy {
            txt: String::new(),
            min_rate: 3,
        };
        assert!(filter.matches(&loc("a", 3, "")));
        assert!(!filter.matches(&loc("b", 2, "")));
    }

    #[test]
    fn test_sort_descending_reverses() {
        let sort = SortBy {
            field: SortField::Rate,
            descending: true,
        };
        let high = loc("a", 5, "");
        let low = loc("b", 1, "");
        assert_eq!(sort.compare(&high, &low), Ordering::Less);
    }

    #[test]
    fn test_sort_field_round_trip() {
        for field in [
            SortField::Name,
            SortField::Rate,
            SortField::CreatedAt,
            SortField::UpdatedAt,
        ] {
            assert_eq!(field.as_str().parse::<SortField>(), Ok(field));
        }
        assert!("altitude".parse::<SortField>().is_err());
    }
}
