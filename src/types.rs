//! Core types for the workday pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw wire records, normalized activity events, labeled segments,
//! and day-bounded workday sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synthetic app label for a small gap absorbed as lost logging
pub const LOG_LOST_LABEL: &str = "Log Lost/Software Bug";

/// Synthetic app label for a sub-day gap between activity
pub const PAUSE_LABEL: &str = "Pause";

/// Synthetic app label substituted when the tracked app was inactive
pub const CONCENTRATION_LOST_LABEL: &str = "Concentration Lost";

/// Synthetic app label for local browser usage with no recorded site
pub const PRIVATE_LINKS_LABEL: &str = "Private Links";

/// One raw activity log line as produced by the tracking agent.
///
/// Field names follow the source log schema (camelCase). Metric fields are
/// optional on the wire and default to zero/false during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivityRecord {
    pub employee_id: String,
    pub app: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    /// Whether the app had input focus during the interval
    #[serde(default)]
    pub active: Option<bool>,
    /// Interval start, epoch milliseconds
    pub start: Option<i64>,
    /// Interval end, epoch milliseconds
    pub end: Option<i64>,
    #[serde(default)]
    pub mouse_clicks: Option<u64>,
    #[serde(default)]
    pub keystrokes: Option<u64>,
    #[serde(default)]
    pub mouse_scroll: Option<u64>,
    #[serde(default)]
    pub mic: Option<bool>,
    #[serde(default)]
    pub camera: Option<bool>,
}

/// A normalized activity event with resolved names and filled metrics.
///
/// Produced once by the normalizer and never mutated downstream; later stages
/// build derived segments and sessions instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub employee_id: String,
    pub app: String,
    pub site: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub mouse_clicks: u64,
    pub keystrokes: u64,
    pub mouse_scroll: u64,
    pub mic: bool,
    pub camera: bool,
}

/// One labeled time span inside a workday session.
///
/// Either a normalized event or a synthetic filler (`Pause`,
/// `Log Lost/Software Bug`). Within a session, segments are ordered by
/// `start_time` and time-contiguous except where a filler accounts for a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSegment {
    pub app: String,
    pub duration_minutes: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub mouse_clicks: u64,
    pub keystrokes: u64,
    pub mouse_scroll: u64,
    pub mic: bool,
    pub camera: bool,
}

impl AppSegment {
    /// Build a segment from a normalized event
    pub fn from_event(event: &ActivityEvent) -> Self {
        Self {
            app: event.app.clone(),
            duration_minutes: minutes_between(event.start, event.end),
            start_time: event.start,
            end_time: event.end,
            mouse_clicks: event.mouse_clicks,
            keystrokes: event.keystrokes,
            mouse_scroll: event.mouse_scroll,
            mic: event.mic,
            camera: event.camera,
        }
    }

    /// Build a synthetic gap-filler segment with zero metrics
    pub fn filler(label: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            app: label.to_string(),
            duration_minutes: minutes_between(start, end),
            start_time: start,
            end_time: end,
            mouse_clicks: 0,
            keystrokes: 0,
            mouse_scroll: 0,
            mic: false,
            camera: false,
        }
    }

    /// Fold `other` into this segment: extend the end time, add the duration,
    /// sum the counters and OR the booleans. The caller guarantees `other`
    /// directly follows this segment in time.
    pub fn fold(&mut self, other: &AppSegment) {
        self.duration_minutes += other.duration_minutes;
        self.end_time = other.end_time;
        self.mouse_clicks += other.mouse_clicks;
        self.keystrokes += other.keystrokes;
        self.mouse_scroll += other.mouse_scroll;
        self.mic = self.mic || other.mic;
        self.camera = self.camera || other.camera;
    }
}

/// A day-bounded aggregation of segments for one employee occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkdaySession {
    /// `{base_employee_id}_{sequence}` assigned in chronological order
    pub session_id: String,
    pub base_employee_id: String,
    pub segments: Vec<AppSegment>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub workday_duration_minutes: f64,
    /// Gap to the next session of the same employee, -1.0 if none follows
    pub hours_until_next_workday: f64,
}

impl WorkdaySession {
    /// Build a session from a non-empty segment list. Bounds come from the
    /// first and last segment; timing features start unset (-1.0).
    pub fn from_segments(
        base_employee_id: &str,
        sequence: u32,
        segments: Vec<AppSegment>,
    ) -> Self {
        debug_assert!(!segments.is_empty());
        let start_time = segments[0].start_time;
        let end_time = segments[segments.len() - 1].end_time;
        Self {
            session_id: format!("{base_employee_id}_{sequence}"),
            base_employee_id: base_employee_id.to_string(),
            segments,
            start_time,
            end_time,
            workday_duration_minutes: minutes_between(start_time, end_time),
            hours_until_next_workday: -1.0,
        }
    }
}

/// Duration between two instants in fractional minutes
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

/// Duration between two instants in fractional hours
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}
