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

//! Memoized, process-wide resolution of the user's position.
//!
//! The underlying lookup runs at most once per process lifetime. Every
//! caller, whenever it asks, observes the same resolved coordinates or the
//! same failure. Failures are cached too, so a denied or unreachable
//! provider is not retried on every render.

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::OnceCell;

use crate::error::PositionError;
use crate::model::LatLng;

/// Source of the user's current coordinates.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Resolve the user's current coordinates. Invoked at most once per
    /// process by [`SharedPosition`].
    async fn resolve(&self) -> Result<LatLng, PositionError>;
}

/// Fixed-coordinate source, for configuration overrides and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub LatLng);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn resolve(&self) -> Result<LatLng, PositionError> {
        Ok(self.0)
    }
}

/// Shared handle to the once-resolved user position.
///
/// Clones share the same cell, so a resolution observed through one handle
/// is observed through all of them.
#[derive(Clone)]
pub struct SharedPosition {
    source: Arc<dyn PositionSource>,
    cell: Arc<OnceCell<Result<LatLng, PositionError>>>,
}

impl std::fmt::Debug for SharedPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPosition")
            .field("settled", &self.cell.initialized())
            .finish_non_exhaustive()
    }
}

impl SharedPosition {
    #[must_use]
    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self {
            source,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Await the resolved position, triggering the lookup on first call.
    pub async fn get(&self) -> Result<LatLng, PositionError> {
        let source = Arc::clone(&self.source);
        self.cell
            .get_or_init(|| async move {
                match source.resolve().await {
                    Ok(pos) => {
                        info!("Resolved user position: {:.5}, {:.5}", pos.lat, pos.lng);
                        Ok(pos)
                    }
                    Err(err) => {
                        warn!("Position resolution failed: {err}");
                        Err(err)
                    }
                }
            })
            .await
            .clone()
    }

    /// The position if it has already resolved successfully, without
    /// waiting. Consumers that render before resolution omit distances.
    #[must_use]
    pub fn try_now(&self) -> Option<LatLng> {
        self.cell.get().and_then(|r| r.as_ref().ok().copied())
    }

    /// Whether resolution has completed, successfully or not.
    #[must_use]
    pub fn settled(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PositionSource for CountingSource {
        async fn resolve(&self) -> Result<LatLng, PositionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(LatLng {
                lat: 32.0749831,
                lng: 34.9120554,
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PositionSource for FailingSource {
        async fn resolve(&self) -> Result<LatLng, PositionError> {
            Err(PositionError::Denied)
        }
    }

    #[tokio::test]
    async fn test_lookup_runs_at_most_once() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let position = SharedPosition::new(source.clone());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let position = position.clone();
            handles.push(tokio::spawn(async move { position.get().await }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        let first = results[0].clone().unwrap();
        for result in results {
            assert_eq!(result.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_failure_is_cached_and_shared() {
        let position = SharedPosition::new(Arc::new(FailingSource));
        assert_eq!(position.get().await, Err(PositionError::Denied));
        assert_eq!(position.get().await, Err(PositionError::Denied));
        assert!(position.settled());
        assert!(position.try_now().is_none());
    }

    #[tokio::test]
    async fn test_try_now_before_and_after() {
        let position = SharedPosition::new(Arc::new(FixedPosition(LatLng {
            lat: 1.0,
            lng: 2.0,
        })));
        assert!(position.try_now().is_none());
        position.get().await.unwrap();
        assert_eq!(position.try_now(), Some(LatLng { lat: 1.0, lng: 2.0 }));
    }
}
