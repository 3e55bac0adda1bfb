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

//! Persistence layer for location records.
//!
//! The [`LocationStore`] trait is the seam between the controller and
//! whatever holds the records. Queries apply the sort/filter spec inside the
//! store; callers must not re-sort results.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::model::{Geo, Location};
use crate::query::{FilterBy, SortBy};
use crate::stats::{StatsDimension, StatsReport};

/// A new location, before the store assigns an id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDraft {
    pub name: String,
    pub rate: u8,
    pub geo: Geo,
}

/// CRUD, query and aggregation over saved locations.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Fetch records passing `filter`, ordered by `sort` (creation order
    /// when no sort spec is active).
    async fn query(
        &self,
        sort: Option<SortBy>,
        filter: &FilterBy,
    ) -> Result<Vec<Location>, PersistenceError>;

    /// Fetch one record by id.
    ///
    /// Fails with [`PersistenceError::NotFound`] for unknown ids.
    async fn get(&self, id: &str) -> Result<Location, PersistenceError>;

    /// Persist a new record. The store assigns the id and both timestamps.
    async fn create(&self, draft: LocationDraft) -> Result<Location, PersistenceError>;

    /// Persist changes to an existing record, bumping `updated_at`.
    async fn update(&self, loc: Location) -> Result<Location, PersistenceError>;

    /// Delete a record by id.
    async fn remove(&self, id: &str) -> Result<(), PersistenceError>;

    /// Pre-aggregated category counts for one chart dimension.
    async fn stats_by(&self, dim: StatsDimension) -> Result<StatsReport, PersistenceError>;
}

/// Apply `filter` then `sort` to a snapshot of records.
pub(crate) fn apply_query(
    mut locs: Vec<Location>,
    sort: Option<SortBy>,
    filter: &FilterBy,
) -> Vec<Location> {
    locs.retain(|loc| filter.matches(loc));
    match sort {
        Some(sort) => locs.sort_by(|a, b| sort.compare(a, b)),
        None => locs.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
    locs
}
