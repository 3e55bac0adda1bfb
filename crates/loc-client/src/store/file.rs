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

//! JSON-file-backed location store.
//!
//! Records are kept in memory and flushed to a single JSON document after
//! every mutation. A brand-new file is seeded with a few demo locations so
//! a first run has something to show.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::info;
use uuid::Uuid;

use super::{apply_query, LocationDraft, LocationStore};
use crate::error::PersistenceError;
use crate::model::{Geo, Location};
use crate::query::{FilterBy, SortBy};
use crate::stats::{report_for, StatsDimension, StatsReport};

/// Location store persisted as one JSON document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    locations: RwLock<Vec<Location>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating and seeding it if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let locations = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            let seeded = demo_locations();
            info!(
                "Seeding new location store at {} with {} demo locations",
                path.display(),
                seeded.len()
            );
            write_locations(&path, &seeded)?;
            seeded
        };
        Ok(Self {
            path,
            locations: RwLock::new(locations),
        })
    }

    /// Open the store at `path` without seeding; a missing file is empty.
    pub fn open_empty(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let locations = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            Vec::new()
        };
        Ok(Self {
            path,
            locations: RwLock::new(locations),
        })
    }

    /// Where the records live on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> Vec<Location> {
        self.locations
            .read()
            .expect("Location store lock poisoned - unrecoverable state")
            .clone()
    }
}

fn write_locations(path: &Path, locations: &[Location]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(locations)?)?;
    Ok(())
}

/// Starter records for a brand-new store.
fn demo_locations() -> Vec<Location> {
    let now = Utc::now();
    let mk = |name: &str, rate: u8, lat: f64, lng: f64, address: &str, age_days: i64| Location {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        rate,
        geo: Geo {
            lat,
            lng,
            address: address.to_string(),
        },
        created_at: now - Duration::days(age_days),
        updated_at: now - Duration::days(age_days),
    };
    vec![
        mk(
            "Golden Gate Vista",
            5,
            37.8199,
            -122.4783,
            "Golden Gate Bridge, San Francisco, CA",
            40,
        ),
        mk(
            "Shibuya Crossing",
            4,
            35.6595,
            139.7005,
            "Shibuya, Tokyo, Japan",
            12,
        ),
        mk(
            "Louvre Courtyard",
            3,
            48.8606,
            2.3376,
            "Rue de Rivoli, Paris, France",
            3,
        ),
    ]
}

#[async_trait]
impl LocationStore for JsonFileStore {
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
            .iter()
            .find(|loc| loc.id == id)
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
        let mut locations = self
            .locations
            .write()
            .expect("Location store lock poisoned - unrecoverable state");
        locations.push(loc.clone());
        write_locations(&self.path, &locations)?;
        Ok(loc)
    }

    async fn update(&self, mut loc: Location) -> Result<Location, PersistenceError> {
        let mut locations = self
            .locations
            .write()
            .expect("Location store lock poisoned - unrecoverable state");
        let Some(slot) = locations.iter_mut().find(|l| l.id == loc.id) else {
            return Err(PersistenceError::NotFound(loc.id));
        };
        loc.updated_at = Utc::now().max(loc.created_at);
        *slot = loc.clone();
        write_locations(&self.path, &locations)?;
        Ok(loc)
    }

    async fn remove(&self, id: &str) -> Result<(), PersistenceError> {
        let mut locations = self
            .locations
            .write()
            .expect("Location store lock poisoned - unrecoverable state");
        let before = locations.len();
        locations.retain(|loc| loc.id != id);
        if locations.len() == before {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        write_locations(&self.path, &locations)?;
        Ok(())
    }

    async fn stats_by(&self, dim: StatsDimension) -> Result<StatsReport, PersistenceError> {
        Ok(report_for(&self.snapshot(), dim, Utc::now()))
    }
}
