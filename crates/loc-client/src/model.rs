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

//! Saved-location records and geodesy helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Highest allowed star rating.
pub const MAX_RATE: u8 = 5;

/// A bare WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// A geocoded place: coordinate plus the address it resolved from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Human-readable address.
    pub address: String,
}

impl Geo {
    /// Coordinate portion of this place.
    #[must_use]
    pub fn lat_lng(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// A saved location record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Store-assigned identifier, immutable for the record's lifetime.
    pub id: String,
    /// User-facing name.
    pub name: String,
    /// Star rating, 0 to [`MAX_RATE`].
    pub rate: u8,
    /// Where the location is.
    pub geo: Geo,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified. Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Distance from `from` to this location in kilometres.
    #[must_use]
    pub fn distance_km(&self, from: LatLng) -> f64 {
        haversine_distance_km(from, self.geo.lat_lng())
    }

    /// Whether the record was modified after creation.
    #[must_use]
    pub fn was_updated(&self) -> bool {
        self.updated_at > self.created_at
    }
}

/// Great-circle distance between two coordinates in kilometres, using the
/// Haversine formula.
#[must_use]
pub fn haversine_distance_km(a: LatLng, b: LatLng) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Paris to London is approximately 344 km
        let paris = LatLng {
            lat: 48.8566,
            lng: 2.3522,
        };
        let london = LatLng {
            lat: 51.5074,
            lng: -0.1278,
        };
        let distance = haversine_distance_km(paris, london);
        assert!((distance - 344.0).abs() < 5.0);
    }

    #[test]
    fn test_zero_distance() {
        let p = LatLng { lat: 10.0, lng: 20.0 };
        assert!(haversine_distance_km(p, p) < 1e-9);
    }

    #[test]
    fn test_was_updated() {
        let now = Utc::now();
        let mut loc = Location {
            id: "a".to_string(),
            name: "Somewhere".to_string(),
            rate: 3,
            geo: Geo {
                lat: 0.0,
                lng: 0.0,
                address: String::new(),
            },
            created_at: now,
            updated_at: now,
        };
        assert!(!loc.was_updated());
        loc.updated_at = now + chrono::Duration::seconds(1);
        assert!(loc.was_updated());
    }
}
