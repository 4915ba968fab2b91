//! Pipeline configuration
//!
//! Thresholds driving segmentation, pruning and merging. Defaults match the
//! production pipeline; the batch entrypoint historically ran with a 1-hour
//! workday gap instead of the 2-hour default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thresholds and business exclusions for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gap at or above which a new workday session starts (seconds)
    pub max_workday_gap_secs: i64,
    /// Gap at or below which a filler is labeled `Log Lost/Software Bug`
    /// rather than `Pause` (seconds)
    pub log_lost_threshold_secs: i64,
    /// Sessions shorter than this are pruned before merging (minutes)
    pub min_workday_duration_minutes: f64,
    /// Adjacent sessions closer than this merge into one (hours)
    pub merge_proximity_hours: f64,
    /// Inclusive lower bound of the rejection window: sessions whose
    /// start falls inside the window are dropped before annotation
    pub reject_start: Option<DateTime<Utc>>,
    /// Inclusive upper bound of the rejection window
    pub reject_end: Option<DateTime<Utc>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workday_gap_secs: 7200,
            log_lost_threshold_secs: 20,
            min_workday_duration_minutes: 45.0,
            merge_proximity_hours: 3.0,
            reject_start: None,
            reject_end: None,
        }
    }
}

impl PipelineConfig {
    /// Config with a custom workday gap in seconds, other thresholds default
    pub fn with_max_workday_gap_secs(secs: i64) -> Self {
        Self {
            max_workday_gap_secs: secs,
            ..Default::default()
        }
    }

    /// Whether a session starting at `start` falls inside the rejection window
    pub fn rejects(&self, start: DateTime<Utc>) -> bool {
        match (self.reject_start, self.reject_end) {
            (Some(lo), Some(hi)) => start >= lo && start <= hi,
            (Some(lo), None) => start >= lo,
            (None, Some(hi)) => start <= hi,
            (None, None) => false,
        }
    }
}
