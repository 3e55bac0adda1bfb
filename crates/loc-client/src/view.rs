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

//! View models for the list and detail panes.
//!
//! Pure functions from (records, selection, optional position) to what the
//! panes display. Record ordering is taken from the store as-is; while the
//! user position is unresolved, distances are omitted rather than rendered
//! as placeholders.

use chrono::{DateTime, Utc};

use crate::model::{LatLng, Location};

/// One row of the location list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub name: String,
    pub rate: u8,
    /// Distance from the user, omitted while the position is unresolved.
    pub distance_km: Option<f64>,
    /// Relative age of the record ("5 minutes ago").
    pub created_ago: String,
    /// Present only when the record was modified after creation.
    pub updated_ago: Option<String>,
    /// At most one item per list carries this flag.
    pub selected: bool,
}

/// The rendered list: one entry per queried record, store order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListView {
    pub items: Vec<ListItem>,
}

impl ListView {
    /// Whether the list should render its empty-state indicator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The detail pane for the selected record.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rate: u8,
    pub distance_km: Option<f64>,
}

/// Build the list view from the queried records.
#[must_use]
pub fn build_list(
    locs: &[Location],
    selected: Option<&str>,
    user_pos: Option<LatLng>,
    now: DateTime<Utc>,
) -> ListView {
    let items = locs
        .iter()
        .map(|loc| ListItem {
            id: loc.id.clone(),
            name: loc.name.clone(),
            rate: loc.rate,
            distance_km: user_pos.map(|pos| loc.distance_km(pos)),
            created_ago: elapsed_label(loc.created_at, now),
            updated_ago: loc
                .was_updated()
                .then(|| elapsed_label(loc.updated_at, now)),
            selected: selected == Some(loc.id.as_str()),
        })
        .collect();
    ListView { items }
}

/// Build the detail view for the current selection.
///
/// Returns `None` when there is no selection or the selection refers to a
/// record that is no longer in the collection, in which case the pane
/// clears.
#[must_use]
pub fn build_detail(
    locs: &[Location],
    selected: Option<&str>,
    user_pos: Option<LatLng>,
) -> Option<DetailView> {
    let id = selected?;
    let loc = locs.iter().find(|loc| loc.id == id)?;
    Some(detail_for(loc, user_pos))
}

/// Detail view for one record.
#[must_use]
pub fn detail_for(loc: &Location, user_pos: Option<LatLng>) -> DetailView {
    DetailView {
        id: loc.id.clone(),
        name: loc.name.clone(),
        address: loc.geo.address.clone(),
        rate: loc.rate,
        distance_km: user_pos.map(|pos| loc.distance_km(pos)),
    }
}

/// Human-relative elapsed time ("just now", "5 minutes ago").
#[must_use]
pub fn elapsed_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3_599 => {
            let minutes = secs / 60;
            format!("{minutes} minute{} ago", plural(minutes))
        }
        3_600..=86_399 => {
            let hours = secs / 3_600;
            format!("{hours} hour{} ago", plural(hours))
        }
        86_400..=2_591_999 => {
            let days = secs / 86_400;
            format!("{days} day{} ago", plural(days))
        }
        _ => {
            let months = secs / 2_592_000;
            format!("{months} month{} ago", plural(months))
        }
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geo;
    use chrono::Duration;

    fn loc(id: &str, lat: f64, lng: f64) -> Location {
        let now = Utc::now();
        Location {
            id: id.to_string(),
            name: format!("Location {id}"),
            rate: 3,
            geo: Geo {
                lat,
                lng,
                address: format!("{lat}, {lng}"),
            },
            created_at: now - Duration::hours(3),
            updated_at: now - Duration::hours(3),
        }
    }

    #[test]
    fn test_at_most_one_item_selected() {
        let locs = vec![loc("1", 0.0, 0.0), loc("2", 1.0, 1.0), loc("3", 2.0, 2.0)];
        let list = build_list(&locs, Some("2"), None, Utc::now());
        let selected: Vec<&ListItem> = list.items.iter().filter(|i| i.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "2");
    }

    #[test]
    fn test_order_preserved() {
        let locs = vec![loc("c", 0.0, 0.0), loc("a", 1.0, 1.0), loc("b", 2.0, 2.0)];
        let list = build_list(&locs, None, None, Utc::now());
        let ids: Vec<&str> = list.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_distance_omitted_without_position() {
        let locs = vec![loc("1", 10.0, 10.0)];
        let list = build_list(&locs, None, None, Utc::now());
        assert!(list.items[0].distance_km.is_none());

        let pos = LatLng { lat: 10.0, lng: 10.0 };
        let list = build_list(&locs, None, Some(pos), Utc::now());
        assert!(list.items[0].distance_km.unwrap() < 0.001);
    }

    #[test]
    fn test_updated_label_only_when_modified() {
        let mut record = loc("1", 0.0, 0.0);
        let list = build_list(&[record.clone()], None, None, Utc::now());
        assert!(list.items[0].updated_ago.is_none());

        record.updated_at = record.created_at + Duration::hours(1);
        let list = build_list(&[record], None, None, Utc::now());
        assert!(list.items[0].updated_ago.is_some());
    }

    #[test]
    fn test_stale_selection_clears_detail() {
        let locs = vec![loc("1", 0.0, 0.0)];
        assert!(build_detail(&locs, Some("gone"), None).is_none());
        assert!(build_detail(&locs, None, None).is_none());
        assert!(build_detail(&locs, Some("1"), None).is_some());
        assert!(build_detail(&[], Some("1"), None).is_none());
    }

    #[test]
    fn test_elapsed_labels() {
        let now = Utc::now();
        assert_eq!(elapsed_label(now - Duration::seconds(30), now), "just now");
        assert_eq!(
            elapsed_label(now - Duration::minutes(1), now),
            "1 minute ago"
        );
        assert_eq!(
            elapsed_label(now - Duration::minutes(5), now),
            "5 minutes ago"
        );
        assert_eq!(elapsed_label(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(elapsed_label(now - Duration::days(3), now), "3 days ago");
        assert_eq!(
            elapsed_label(now - Duration::days(65), now),
            "2 months ago"
        );
        // Clock skew never renders a negative age
        assert_eq!(elapsed_label(now + Duration::seconds(5), now), "just now");
    }
}
