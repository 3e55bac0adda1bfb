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

//! Saved-locations client library.
//!
//! This library keeps a set of dependent views (a location list, a detail
//! pane, a map, and proportional stats charts) consistent with a single
//! store of location records while that store changes underneath them.
//! It is organized as layers that can be used independently or composed:
//!
//! - **Store layer**: CRUD, sort/filter queries and category aggregation
//!   over location records ([`store`])
//! - **View layer**: pure view-model construction for the list and detail
//!   panes ([`view`]) and the radial stats charts ([`stats`])
//! - **Controller layer**: orchestration of mutations, selection, share
//!   state and reconciliation passes ([`controller`])
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use loc_client::{
//!     Controller, FixedPosition, Geo, LatLng, MemoryStore, SharedPosition, ShareState,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let position = SharedPosition::new(Arc::new(FixedPosition(LatLng {
//!         lat: 37.7749,
//!         lng: -122.4194,
//!     })));
//!     let controller = Arc::new(Controller::new(
//!         Arc::new(MemoryStore::new()),
//!         ShareState::ephemeral(),
//!         position,
//!     ));
//!
//!     let saved = controller
//!         .add(
//!             "Ferry Building",
//!             4,
//!             Geo {
//!                 lat: 37.7955,
//!                 lng: -122.3937,
//!                 address: "1 Ferry Building, San Francisco".to_string(),
//!             },
//!         )
//!         .await
//!         .unwrap();
//!
//!     for item in controller.current_list().items {
//!         println!("{}: {}", item.name, item.created_ago);
//!     }
//!     assert_eq!(controller.selected().as_deref(), Some(saved.id.as_str()));
//! }
//! ```
//!
//! # Selection and share links
//!
//! The selected record id and the active filter are mirrored into an
//! ordered query-parameter set ([`share::ShareState`]) that is persisted
//! between runs and rendered as a shareable link. Selection always refers
//! to zero or one record; removing the selected record clears it.
//!
//! # Position handling
//!
//! Distance-to-user display depends on an asynchronous position lookup
//! that is performed at most once per process ([`position::SharedPosition`]).
//! Views render without distances until it resolves, then re-render in
//! place from the same record ordering.

pub mod controller;
pub mod error;
pub mod lookup;
pub mod model;
pub mod position;
pub mod query;
pub mod share;
pub mod stats;
pub mod store;
pub mod view;

pub use controller::{Controller, EditorState, MapPort, ViewEvent};
pub use error::{Error, LookupError, PersistenceError, PositionError, ValidationError};
pub use lookup::Geocoder;
pub use model::{haversine_distance_km, Geo, LatLng, Location, MAX_RATE};
pub use position::{FixedPosition, PositionSource, SharedPosition};
pub use query::{FilterBy, SortBy, SortField};
pub use share::{QueryParams, ShareState};
pub use stats::{radial_chart, RadialChart, Segment, StatsDimension, StatsReport};
pub use store::{JsonFileStore, LocationDraft, LocationStore, MemoryStore};
pub use view::{DetailView, ListItem, ListView};
