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

//! Error taxonomy for store, position, lookup and validation failures.

use thiserror::Error;

/// Failures from the persistence layer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no location with id '{0}'")]
    NotFound(String),

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt location data: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Failures resolving the user's position.
///
/// Cloneable because the resolver caches a single failure and hands the same
/// one to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("position access denied")]
    Denied,
}

/// Failures from address geocoding.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Http(String),

    #[error("no match for address '{0}'")]
    NoMatch(String),

    #[error("malformed lookup response: {0}")]
    Parse(String),
}

/// Rejected user input.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("location name must not be empty")]
    EmptyName,

    #[error("rate {0} is out of range (0-5)")]
    RateOutOfRange(u8),

    #[error("no form is open")]
    NoOpenForm,
}

/// Umbrella error for controller operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
