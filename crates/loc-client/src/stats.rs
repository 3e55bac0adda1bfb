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

//! Category statistics and the proportional radial-chart builder.
//!
//! A [`StatsReport`] carries ordered category counts plus a grand total.
//! [`radial_chart`] turns a report into an ordered segment list with a
//! cumulative-percentage gradient description. Per-segment percentages are
//! rounded individually, so their sum can drift off 100; the closing
//! boundary is forced to exactly 100 so the circle always closes.

use chrono::{DateTime, Utc};

use crate::model::Location;

/// Fixed categorical palette (CSS hex), applied by segment index.
/// Labels beyond the palette wrap around.
pub const PALETTE: [&str; 6] = [
    "#7e57c2", "#42a5f5", "#ef5350", "#66bb6a", "#ffa726", "#26c6da",
];

/// Chart dimensions a store can aggregate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsDimension {
    /// Rating bands: low (0-1), medium (2-3), high (4-5).
    RateBand,
    /// Recency of the last update: today, past week, past month, older.
    UpdatedBucket,
}

impl StatsDimension {
    /// Every dimension, in render order.
    pub const ALL: [StatsDimension; 2] = [StatsDimension::RateBand, StatsDimension::UpdatedBucket];

    /// Short identifier for logs and CLI output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsDimension::RateBand => "rate",
            StatsDimension::UpdatedBucket => "updated",
        }
    }

    /// Chart heading.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            StatsDimension::RateBand => "Locations by rate",
            StatsDimension::UpdatedBucket => "Locations by last update",
        }
    }
}

/// One category row of a stats report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsEntry {
    pub label: String,
    pub count: u64,
}

/// Ordered category counts plus the grand total.
///
/// The total is carried apart from the categories and is always at least
/// their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    /// Categories in render order.
    pub entries: Vec<StatsEntry>,
    /// Total record count behind the chart.
    pub total: u64,
}

/// Aggregate `locs` into the fixed buckets of `dim`.
///
/// Bucket order is fixed per dimension and determines segment order in the
/// rendered chart.
#[must_use]
pub fn report_for(locs: &[Location], dim: StatsDimension, now: DateTime<Utc>) -> StatsReport {
    let labels: &[&str] = match dim {
        StatsDimension::RateBand => &["low", "medium", "high"],
        StatsDimension::UpdatedBucket => &["today", "past week", "past month", "older"],
    };

    let mut counts = vec![0u64; labels.len()];
    for loc in locs {
        let idx = match dim {
            StatsDimension::RateBand => match loc.rate {
                0..=1 => 0,
                2..=3 => 1,
                _ => 2,
            },
            StatsDimension::UpdatedBucket => {
                let age_days = (now - loc.updated_at).num_days();
                if age_days < 1 {
                    0
                } else if age_days < 7 {
                    1
                } else if age_days < 30 {
                    2
                } else {
                    3
                }
            }
        };
        counts[idx] += 1;
    }

    StatsReport {
        entries: labels
            .iter()
            .zip(counts)
            .map(|(label, count)| StatsEntry {
                label: (*label).to_string(),
                count,
            })
            .collect(),
        total: locs.len() as u64,
    }
}

/// One colored arc of a proportional chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: String,
    pub count: u64,
    pub color: &'static str,
    /// Cumulative percentage where this arc starts.
    pub start_percent: u32,
    /// Cumulative percentage where this arc ends. The last segment always
    /// ends at 100.
    pub end_percent: u32,
}

/// A gradient boundary: `color` runs up to `percent` of the circle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientStop {
    pub color: &'static str,
    pub percent: u32,
}

/// Renderable description of a proportional radial chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadialChart {
    pub segments: Vec<Segment>,
    pub stops: Vec<GradientStop>,
}

impl RadialChart {
    /// Whether there is anything to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// CSS `conic-gradient` argument list for the chart.
    #[must_use]
    pub fn gradient_css(&self) -> String {
        self.stops
            .iter()
            .map(|stop| format!("{} {}%", stop.color, stop.percent))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Turn a stats report into an ordered segment list.
///
/// Categories with a zero count are dropped. A report with no countable
/// categories, or a zero total, yields an empty chart and the caller renders
/// a no-data state. Boundaries are non-decreasing, the first segment starts
/// at 0 and the last ends at exactly 100.
#[must_use]
pub fn radial_chart(report: &StatsReport) -> RadialChart {
    if report.total == 0 {
        return RadialChart::default();
    }

    let visible: Vec<&StatsEntry> = report.entries.iter().filter(|e| e.count > 0).collect();
    if visible.is_empty() {
        return RadialChart::default();
    }

    let mut segments = Vec::with_capacity(visible.len());
    let mut stops = Vec::with_capacity(visible.len() * 2);
    let mut cumulative: u32 = 0;

    for (idx, entry) in visible.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let start = cumulative;
        let end = if idx == visible.len() - 1 {
            // Closing-boundary correction: individual rounding may leave the
            // running sum short of (or past) 100, the final arc absorbs it.
            100
        } else {
            let percent = ((entry.count as f64 / report.total as f64) * 100.0).round() as u32;
            (cumulative + percent).min(100)
        };
        cumulative = end;

        segments.push(Segment {
            label: entry.label.clone(),
            count: entry.count,
            color,
            start_percent: start,
            end_percent: end,
        });
        stops.push(GradientStop {
            color,
            percent: start,
        });
        stops.push(GradientStop {
            color,
            percent: end,
        });
    }

    RadialChart { segments, stops }
}
