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

//! The controller keeping every dependent view in sync with the store.
//!
//! Every mutating operation runs a reconciliation pass: re-query the store,
//! rebuild the list and detail view models, and rebuild the stats charts.
//! View output is delivered over a broadcast channel so any number of front
//! ends can observe the current state. Passes are not serialized against
//! each other; the last pass to resolve wins the displayed state.
//!
//! A failed operation emits nothing and mutates nothing: the views keep
//! their last known-good content and the caller surfaces one notification.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use log::info;
use tokio::sync::broadcast;

use crate::error::{Error, ValidationError};
use crate::model::{Geo, Location, MAX_RATE};
use crate::position::SharedPosition;
use crate::query::{FilterBy, SortBy, SortField};
use crate::share::ShareState;
use crate::stats::{radial_chart, RadialChart, StatsDimension};
use crate::store::{LocationDraft, LocationStore};
use crate::view::{build_detail, build_list, detail_for, DetailView, ListView};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const LOCK_POISONED: &str = "Controller lock poisoned - unrecoverable state";

/// Map side effects consumed by a front end.
pub trait MapPort: Send + Sync {
    /// Center the map on `geo`.
    fn pan_to(&self, geo: &Geo);
    /// Place or clear the selection marker.
    fn set_marker(&self, loc: Option<&Location>);
}

/// View updates emitted by reconciliation passes.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// The list pane content changed.
    ListRendered(ListView),
    /// The detail pane should show this record.
    DetailRendered(DetailView),
    /// The detail pane should clear.
    DetailCleared,
    /// A stats chart was rebuilt.
    StatsRendered(StatsDimension, RadialChart),
}

/// Pending editor mode: what a form submission would do.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    /// No form open.
    Idle,
    /// Creating a new location at this place.
    Creating(Geo),
    /// Editing the location with this id.
    Editing(String),
}

/// Controller wiring the store, share state and position resolver together.
pub struct Controller<S> {
    store: Arc<S>,
    share: RwLock<ShareState>,
    position: SharedPosition,
    map: Option<Arc<dyn MapPort>>,
    sort: RwLock<Option<SortBy>>,
    filter: RwLock<FilterBy>,
    editor: RwLock<EditorState>,
    last_query: RwLock<Vec<Location>>,
    event_tx: broadcast::Sender<ViewEvent>,
}

impl<S> std::fmt::Debug for Controller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("position", &self.position)
            .field("sort", &self.sort)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl<S: LocationStore + 'static> Controller<S> {
    /// Create a controller. The filter starts from whatever the share state
    /// carried into this run, so a reloaded or pasted link restores the view.
    #[must_use]
    pub fn new(store: Arc<S>, share: ShareState, position: SharedPosition) -> Self {
        let filter = share.filter();
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            share: RwLock::new(share),
            position,
            map: None,
            sort: RwLock::new(None),
            filter: RwLock::new(filter),
            editor: RwLock::new(EditorState::Idle),
            last_query: RwLock::new(Vec::new()),
            event_tx,
        }
    }

    /// Attach a map port for pan/marker side effects.
    #[must_use]
    pub fn with_map(mut self, map: Arc<dyn MapPort>) -> Self {
        self.map = Some(map);
        self
    }

    /// Subscribe to view updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.event_tx.subscribe()
    }

    /// The shared position handle.
    #[must_use]
    pub fn position(&self) -> &SharedPosition {
        &self.position
    }

    /// Currently selected location id, if any.
    #[must_use]
    pub fn selected(&self) -> Option<String> {
        self.share.read().expect(LOCK_POISONED).selected()
    }

    /// The active sort spec.
    #[must_use]
    pub fn sort_by(&self) -> Option<SortBy> {
        *self.sort.read().expect(LOCK_POISONED)
    }

    /// The active filter spec.
    #[must_use]
    pub fn filter_by(&self) -> FilterBy {
        self.filter.read().expect(LOCK_POISONED).clone()
    }

    /// Shareable link for the current view state.
    #[must_use]
    pub fn share_link(&self, base: &str) -> String {
        self.share.read().expect(LOCK_POISONED).to_link(base)
    }

    /// Run a full reconciliation pass: re-query, re-render, re-aggregate.
    pub async fn reconcile(&self) -> Result<ListView, Error> {
        let sort = self.sort_by();
        let filter = self.filter_by();
        let locs = self.store.query(sort, &filter).await?;
        *self.last_query.write().expect(LOCK_POISONED) = locs.clone();

        let list = self.render_views(&locs);
        self.render_stats().await?;
        Ok(list)
    }

    /// Rebuild both stats charts and emit them.
    pub async fn stats(&self) -> Result<Vec<(StatsDimension, RadialChart)>, Error> {
        let mut charts = Vec::with_capacity(StatsDimension::ALL.len());
        for dim in StatsDimension::ALL {
            let report = self.store.stats_by(dim).await?;
            let chart = radial_chart(&report);
            let _ = self
                .event_tx
                .send(ViewEvent::StatsRendered(dim, chart.clone()));
            charts.push((dim, chart));
        }
        Ok(charts)
    }

    /// Rebuild the list view from the cached collection without querying.
    #[must_use]
    pub fn current_list(&self) -> ListView {
        let locs = self.last_query.read().expect(LOCK_POISONED).clone();
        build_list(
            &locs,
            self.selected().as_deref(),
            self.position.try_now(),
            Utc::now(),
        )
    }

    /// Detail view for the current selection from the cached collection.
    #[must_use]
    pub fn detail(&self) -> Option<DetailView> {
        let locs = self.last_query.read().expect(LOCK_POISONED).clone();
        build_detail(&locs, self.selected().as_deref(), self.position.try_now())
    }

    /// Create a location. Empty names are rejected before any store call.
    pub async fn add(&self, name: &str, rate: u8, geo: Geo) -> Result<Location, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if rate > MAX_RATE {
            return Err(ValidationError::RateOutOfRange(rate).into());
        }

        let saved = self
            .store
            .create(LocationDraft {
                name: name.to_string(),
                rate,
                geo,
            })
            .await?;
        info!("Added location '{}' ({})", saved.name, saved.id);

        self.share.write().expect(LOCK_POISONED).select(&saved.id);
        self.pan_and_mark(&saved);
        self.reconcile().await?;
        Ok(saved)
    }

    /// Rename or re-rate a location. Returns `false`, writing nothing and
    /// rendering nothing, when neither field differs from the stored record.
    pub async fn update(&self, id: &str, name: &str, rate: u8) -> Result<bool, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if rate > MAX_RATE {
            return Err(ValidationError::RateOutOfRange(rate).into());
        }

        let mut loc = self.store.get(id).await?;
        if loc.name == name && loc.rate == rate {
            return Ok(false);
        }
        loc.name = name.to_string();
        loc.rate = rate;
        let saved = self.store.update(loc).await?;
        info!("Updated location '{}' ({})", saved.name, saved.id);

        self.reconcile().await?;
        Ok(true)
    }

    /// Remove a location. Confirmation is the front end's concern.
    pub async fn remove(&self, id: &str) -> Result<(), Error> {
        self.store.remove(id).await?;
        info!("Removed location {id}");

        if self.selected().as_deref() == Some(id) {
            self.share.write().expect(LOCK_POISONED).clear_selection();
            if let Some(map) = &self.map {
                map.set_marker(None);
            }
        }
        self.reconcile().await?;
        Ok(())
    }

    /// Select a record and show its detail, re-rendering the list in place
    /// from the cached collection.
    pub async fn select(&self, id: &str) -> Result<DetailView, Error> {
        let loc = self.store.get(id).await?;
        self.share.write().expect(LOCK_POISONED).select(&loc.id);
        self.pan_and_mark(&loc);

        let user_pos = self.position.try_now();
        let detail = detail_for(&loc, user_pos);
        let locs = self.last_query.read().expect(LOCK_POISONED).clone();
        let list = build_list(&locs, Some(id), user_pos, Utc::now());
        let _ = self.event_tx.send(ViewEvent::ListRendered(list));
        let _ = self
            .event_tx
            .send(ViewEvent::DetailRendered(detail.clone()));
        Ok(detail)
    }

    /// Clear the selection and the detail pane.
    pub fn deselect(&self) {
        self.share.write().expect(LOCK_POISONED).clear_selection();
        if let Some(map) = &self.map {
            map.set_marker(None);
        }
        let locs = self.last_query.read().expect(LOCK_POISONED).clone();
        let list = build_list(&locs, None, self.position.try_now(), Utc::now());
        let _ = self.event_tx.send(ViewEvent::ListRendered(list));
        let _ = self.event_tx.send(ViewEvent::DetailCleared);
    }

    /// Change the sort order. A `None` field is a no-op: no re-query, no
    /// render, the prior spec stays.
    pub async fn set_sort_by(
        &self,
        field: Option<SortField>,
        descending: bool,
    ) -> Result<bool, Error> {
        let Some(field) = field else {
            return Ok(false);
        };
        *self.sort.write().expect(LOCK_POISONED) = Some(SortBy { field, descending });
        self.reconcile().await?;
        Ok(true)
    }

    /// Change the filter, mirror it into the share params and reconcile.
    pub async fn set_filter_by(&self, txt: &str, min_rate: u8) -> Result<(), Error> {
        if min_rate > MAX_RATE {
            return Err(ValidationError::RateOutOfRange(min_rate).into());
        }
        let filter = FilterBy {
            txt: txt.trim().to_string(),
            min_rate,
        };
        self.share.write().expect(LOCK_POISONED).set_filter(&filter);
        *self.filter.write().expect(LOCK_POISONED) = filter;
        self.reconcile().await?;
        Ok(())
    }

    /// Replace the share state from a pasted link, then reconcile.
    pub async fn import_link(&self, link: &str) -> Result<ListView, Error> {
        {
            let mut share = self.share.write().expect(LOCK_POISONED);
            share.import(link);
            *self.filter.write().expect(LOCK_POISONED) = share.filter();
        }
        self.reconcile().await
    }

    /// Open the form for a new location at `geo`.
    pub fn begin_create(&self, geo: Geo) {
        *self.editor.write().expect(LOCK_POISONED) = EditorState::Creating(geo);
    }

    /// Open the form pre-filled from an existing record.
    pub async fn begin_edit(&self, id: &str) -> Result<Location, Error> {
        let loc = self.store.get(id).await?;
        *self.editor.write().expect(LOCK_POISONED) = EditorState::Editing(loc.id.clone());
        Ok(loc)
    }

    /// Discard the open form.
    pub fn cancel_edit(&self) {
        *self.editor.write().expect(LOCK_POISONED) = EditorState::Idle;
    }

    /// The pending editor mode.
    #[must_use]
    pub fn editor(&self) -> EditorState {
        self.editor.read().expect(LOCK_POISONED).clone()
    }

    /// Submit the open form: adds or updates depending on the pending mode.
    pub async fn submit(&self, name: &str, rate: u8) -> Result<Location, Error> {
        let state = self.editor.read().expect(LOCK_POISONED).clone();
        let saved = match state {
            EditorState::Idle => return Err(ValidationError::NoOpenForm.into()),
            EditorState::Creating(geo) => self.add(name, rate, geo).await?,
            EditorState::Editing(id) => {
                self.update(&id, name, rate).await?;
                self.store.get(&id).await?
            }
        };
        *self.editor.write().expect(LOCK_POISONED) = EditorState::Idle;
        Ok(saved)
    }

    /// Re-render the cached collection in place once the shared position
    /// resolves: same record ordering, no redundant query. Spawn once at
    /// startup; does nothing further if resolution fails.
    pub fn spawn_position_rerender(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            if controller.position.get().await.is_err() {
                return;
            }
            let locs = controller.last_query.read().expect(LOCK_POISONED).clone();
            controller.render_views(&locs);
        });
    }

    fn render_views(&self, locs: &[Location]) -> ListView {
        let selected = self.selected();
        let user_pos = self.position.try_now();
        let now = Utc::now();

        let list = build_list(locs, selected.as_deref(), user_pos, now);
        let _ = self.event_tx.send(ViewEvent::ListRendered(list.clone()));

        match build_detail(locs, selected.as_deref(), user_pos) {
            Some(detail) => {
                let _ = self.event_tx.send(ViewEvent::DetailRendered(detail));
            }
            None => {
                let _ = self.event_tx.send(ViewEvent::DetailCleared);
            }
        }
        list
    }

    async fn render_stats(&self) -> Result<(), Error> {
        self.stats().await.map(|_| ())
    }

    fn pan_and_mark(&self, loc: &Location) {
        if let Some(map) = &self.map {
            map.pan_to(&loc.geo);
            map.set_marker(Some(loc));
        }
    }
}
