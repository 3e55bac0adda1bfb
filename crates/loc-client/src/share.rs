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

//! Shareable view state carried as a URL-style query string.
//!
//! The selected location id and the active filter live in one ordered
//! query-parameter set. Every write is a read-modify-write over the full
//! set, so touching one key never clobbers another. The serialized form is
//! persisted to a small file between runs and doubles as the query portion
//! of a shareable link.

use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::query::FilterBy;

/// Query parameter carrying the selected location id.
pub const SELECTED_PARAM: &str = "locId";
/// Query parameter carrying the free-text filter.
pub const FILTER_TEXT_PARAM: &str = "txt";
/// Query parameter carrying the minimum-rating filter.
pub const MIN_RATE_PARAM: &str = "minRate";

/// Ordered query-parameter set with URL-style encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let pairs = query
            .split('&')
            .filter(|piece| !piece.is_empty())
            .map(|piece| {
                let (key, value) = piece.split_once('=').unwrap_or((piece, ""));
                (percent_decode(key), percent_decode(value))
            })
            .collect();
        Self { pairs }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, leaving every other parameter untouched.
    /// An empty value removes the key; absence means "not set".
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.remove(key);
            return;
        }
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            pair.1 = value.to_string();
        } else {
            self.pairs.push((key.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize to `k=v&k2=v2` form, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                if let Some(byte) = hex {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// The process-scoped share state: selection and filter parameters,
/// persisted across runs and exportable as a link.
#[derive(Debug)]
pub struct ShareState {
    params: QueryParams,
    path: Option<PathBuf>,
}

impl ShareState {
    /// In-memory state with no backing file.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            params: QueryParams::new(),
            path: None,
        }
    }

    /// Load from `path`, starting empty if the file does not exist yet.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let params = match fs::read_to_string(&path) {
            Ok(text) => QueryParams::parse(&text),
            Err(_) => QueryParams::new(),
        };
        Self {
            params,
            path: Some(path),
        }
    }

    /// Replace the whole parameter set from a pasted link or query string.
    pub fn import(&mut self, link: &str) {
        let query = link.rsplit_once('?').map_or(link, |(_, q)| q);
        self.params = QueryParams::parse(query);
        self.persist();
    }

    /// The selected location id, if any.
    #[must_use]
    pub fn selected(&self) -> Option<String> {
        self.params.get(SELECTED_PARAM).map(String::from)
    }

    pub fn select(&mut self, id: &str) {
        self.params.set(SELECTED_PARAM, id);
        self.persist();
    }

    pub fn clear_selection(&mut self) {
        self.params.remove(SELECTED_PARAM);
        self.persist();
    }

    /// Mirror the filter portion into the parameter set.
    pub fn set_filter(&mut self, filter: &FilterBy) {
        self.params.set(FILTER_TEXT_PARAM, &filter.txt);
        if filter.min_rate > 0 {
            self.params.set(MIN_RATE_PARAM, &filter.min_rate.to_string());
        } else {
            self.params.remove(MIN_RATE_PARAM);
        }
        self.persist();
    }

    /// The filter reconstructed from the parameter set.
    #[must_use]
    pub fn filter(&self) -> FilterBy {
        FilterBy {
            txt: self.params.get(FILTER_TEXT_PARAM).unwrap_or("").to_string(),
            min_rate: self
                .params
                .get(MIN_RATE_PARAM)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Full shareable link against `base`.
    #[must_use]
    pub fn to_link(&self, base: &str) -> String {
        let query = self.params.to_query_string();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }

    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = fs::create_dir_all(parent) {
                    warn!("Cannot create share state dir {}: {err}", parent.display());
                    return;
                }
            }
        }
        if let Err(err) = fs::write(path, self.params.to_query_string()) {
            warn!("Cannot persist share state to {}: {err}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_round_trip() {
        let params = QueryParams::parse("?locId=abc&txt=city+park&minRate=3");
        assert_eq!(params.get(SELECTED_PARAM), Some("abc"));
        assert_eq!(params.get(FILTER_TEXT_PARAM), Some("city park"));
        assert_eq!(params.get(MIN_RATE_PARAM), Some("3"));
        assert_eq!(
            params.to_query_string(),
            "locId=abc&txt=city+park&minRate=3"
        );
    }

    #[test]
    fn test_set_preserves_unrelated_keys() {
        let mut params = QueryParams::parse("txt=pizza&minRate=2");
        params.set(SELECTED_PARAM, "xyz");
        assert_eq!(params.get(FILTER_TEXT_PARAM), Some("pizza"));
        assert_eq!(params.get(MIN_RATE_PARAM), Some("2"));
        assert_eq!(params.get(SELECTED_PARAM), Some("xyz"));
        params.remove(SELECTED_PARAM);
        assert_eq!(params.get(FILTER_TEXT_PARAM), Some("pizza"));
        assert!(params.get(SELECTED_PARAM).is_none());
    }

    #[test]
    fn test_empty_value_removes_key() {
        let mut params = QueryParams::parse("locId=abc");
        params.set(SELECTED_PARAM, "");
        assert!(params.get(SELECTED_PARAM).is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn test_percent_encoding() {
        let mut params = QueryParams::new();
        params.set("txt", "caf\u{e9} & bar");
        let encoded = params.to_query_string();
        assert_eq!(encoded, "txt=caf%C3%A9+%26+bar");
        assert_eq!(
            QueryParams::parse(&encoded).get("txt"),
            Some("caf\u{e9} & bar")
        );
    }

    #[test]
    fn test_selection_coexists_with_filter() {
        let mut state = ShareState::ephemeral();
        state.set_filter(&FilterBy {
            txt: "beach".to_string(),
            min_rate: 4,
        });
        state.select("id-1");
        assert_eq!(state.selected().as_deref(), Some("id-1"));
        assert_eq!(state.filter().txt, "beach");
        assert_eq!(state.filter().min_rate, 4);

        state.clear_selection();
        assert!(state.selected().is_none());
        assert_eq!(state.filter().min_rate, 4);
    }

    #[test]
    fn test_import_from_full_link() {
        let mut state = ShareState::ephemeral();
        state.import("waypost://locations?locId=abc&txt=park");
        assert_eq!(state.selected().as_deref(), Some("abc"));
        assert_eq!(state.filter().txt, "park");
    }

    #[test]
    fn test_to_link() {
        let mut state = ShareState::ephemeral();
        assert_eq!(state.to_link("waypost://locations"), "waypost://locations");
        state.select("abc");
        assert_eq!(
            state.to_link("waypost://locations"),
            "waypost://locations?locId=abc"
        );
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let path = std::env::temp_dir().join("waypost-test-no-such-share-file.query");
        let _ = fs::remove_file(&path);
        let state = ShareState::load(path);
        assert!(state.selected().is_none());
        assert!(state.filter().is_empty());
    }

    #[test]
    fn test_persistence_survives_reload() {
        let path = std::env::temp_dir().join(format!(
            "waypost-test-share-{}.query",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let mut state = ShareState::load(path.clone());
        state.select("persisted-id");
        drop(state);

        let reloaded = ShareState::load(path.clone());
        assert_eq!(reloaded.selected().as_deref(), Some("persisted-id"));
        let _ = fs::remove_file(&path);
    }
}
