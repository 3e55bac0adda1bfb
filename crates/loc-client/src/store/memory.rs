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

//! In-memory location store, for ephemeral sessions and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{apply_query, LocationDraft, LocationStore};
use crate::error::PersistenceError;
use crate::model::Location;
use crate::query::{FilterBy, SortBy};
use crate::stats::{report_for, StatsDimension, StatsReport};

/// Map-backed store with interior mutability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    locations: RwLock<HashMap<String, Location>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `locs`, ids preserved.
    #[must_use]
    pub fn with_locations(locs: Vec<Location>) -> Self {
        Self {
            locations: RwLock::new(locs.into_iter().map(|l| (l.id.clone(), l)).collect()),
        }
    }

    fn snapshot(&self) -> Vec<Location> {
        self.locations
            .read()
            .expect("Location store lock poisoned - unrecoverable state")
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn query(
        &self,
        sort: Option<SortBy>,
        filter: &FilterBy,
    ) -> Result<Vec<Location>, PersistenceError> {
        Ok(apply_query(self.snapshot(), sort, filter))
    }

    async fn get(&self, id: &str) -> Result<Location, PersistenceError> {
        self.locations
            .read()
            .expect("Location store lock poisoned - unrecoverable state")
            .get(id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn create(&self, draft: LocationDraft) -> Result<Location, PersistenceError> {
        let now = Utc::now();
        let loc = Location {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            rate: draft.rate,
            geo: draft.geo,
            created_at: now,
            updated_at: now,
        };
        self.locations
            .write()
            .expect("Location store lock poisoned - unrecoverable state")
            .insert(loc.id.clone(), loc.clone());
        Ok(loc)
    }

    async fn update(&self, mut loc: Location) -> Result<Location, PersistenceError> {
        let mut locations = self
            .locations
            .write()
            .expect("Location store lock poisoned - unrecoverable state");
        if !locations.contains_key(&loc.id) {
            return Err(PersistenceError::NotFound(loc.id));
        }
        loc.updated_at = Utc::now().max(loc.created_at);
        locations.insert(loc.id.clone(), loc.clone());
        Ok(loc)
    }

    async fn remove(&self, id: &str) -> Result<(), PersistenceError> {
        self.locations
            .write()
            .expect("Location store lock poisoned - unrecoverable state")
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn stats_by(&self, dim: StatsDimension) -> Result<StatsReport, PersistenceError> {
        Ok(report_for(&self.snapshot(), dim, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geo;
    use crate::query::SortField;

    fn draft(name: &str, rate: u8) -> LocationDraft {
        LocationDraft {
            name: name.to_string(),
            rate,
            geo: Geo {
                lat: 0.0,
                lng: 0.0,
                address: format!("{name} street"),
            },
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let loc = store.create(draft("Cafe", 4)).await.unwrap();
        assert!(!loc.id.is_empty());
        assert_eq!(loc.created_at, loc.updated_at);

        let fetched = store.get(&loc.id).await.unwrap();
        assert_eq!(fetched, loc);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get("nope").await,
            Err(PersistenceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_bumps_updated_at() {
        let store = MemoryStore::new();
        let mut loc = store.create(draft("Cafe", 4)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        loc.rate = 5;
        let saved = store.update(loc).await.unwrap();
        assert!(saved.updated_at > saved.created_at);
    }

    #[tokio::test]
    async fn test_remove_then_query() {
        let store = MemoryStore::new();
        let a = store.create(draft("A", 1)).await.unwrap();
        let b = store.create(draft("B", 2)).await.unwrap();
        store.remove(&a.id).await.unwrap();

        let left = store.query(None, &FilterBy::default()).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);

        assert!(matches!(
            store.remove(&a.id).await,
            Err(PersistenceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_query_applies_sort_and_filter() {
        let store = MemoryStore::new();
        store.create(draft("Beach", 5)).await.unwrap();
        store.create(draft("Bar", 2)).await.unwrap();
        store.create(draft("Bakery", 4)).await.unwrap();

        let sort = SortBy {
            field: SortField::Rate,
            descending: true,
        };
        let filter = FilterBy {
            txt: String::new(),
            min_rate: 3,
        };
        let locs = store.query(Some(sort), &filter).await.unwrap();
        let names: Vec<&str> = locs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Beach", "Bakery"]);
    }

    #[tokio::test]
    async fn test_stats_totals() {
        let store = MemoryStore::new();
        store.create(draft("A", 0)).await.unwrap();
        store.create(draft("B", 3)).await.unwrap();
        store.create(draft("C", 5)).await.unwrap();

        let report = store.stats_by(StatsDimension::RateBand).await.unwrap();
        assert_eq!(report.total, 3);
        let sum: u64 = report.entries.iter().map(|e| e.count).sum();
        assert_eq!(sum, 3);
    }
}
