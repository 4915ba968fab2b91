//! Flat row encoding
//!
//! Downstream consumers take one row per workday session with the per-segment
//! attributes encoded as parallel ordered arrays, under the column names of
//! the historical CSV output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::types::WorkdaySession;

/// One serializable output row for a workday session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkdayRow {
    /// Suffixed session id (`{employeeId}_{sequence}`)
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    /// Per-segment app labels, in order
    pub app: Vec<String>,
    pub app_durations: Vec<f64>,
    pub app_start_times: Vec<DateTime<Utc>>,
    pub app_end_times: Vec<DateTime<Utc>>,
    #[serde(rename = "mouseClicks")]
    pub mouse_clicks: Vec<u64>,
    pub keystrokes: Vec<u64>,
    pub mic: Vec<bool>,
    #[serde(rename = "mouseScroll")]
    pub mouse_scroll: Vec<u64>,
    pub camera: Vec<bool>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub workday_duration: f64,
    pub hours_until_next_workday: f64,
}

/// Encoder from sessions to flat output rows
pub struct RowEncoder;

impl RowEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Flatten one session into parallel per-segment arrays
    pub fn encode(&self, session: &WorkdaySession) -> WorkdayRow {
        let segments = &session.segments;
        WorkdayRow {
            employee_id: session.session_id.clone(),
            app: segments.iter().map(|s| s.app.clone()).collect(),
            app_durations: segments.iter().map(|s| s.duration_minutes).collect(),
            app_start_times: segments.iter().map(|s| s.start_time).collect(),
            app_end_times: segments.iter().map(|s| s.end_time).collect(),
            mouse_clicks: segments.iter().map(|s| s.mouse_clicks).collect(),
            keystrokes: segments.iter().map(|s| s.keystrokes).collect(),
            mic: segments.iter().map(|s| s.mic).collect(),
            mouse_scroll: segments.iter().map(|s| s.mouse_scroll).collect(),
            camera: segments.iter().map(|s| s.camera).collect(),
            start_time: session.start_time,
            end_time: session.end_time,
            workday_duration: session.workday_duration_minutes,
            hours_until_next_workday: session.hours_until_next_workday,
        }
    }

    /// Encode one session as a JSON object string
    pub fn encode_to_json(&self, session: &WorkdaySession) -> Result<String, PipelineError> {
        serde_json::to_string(&self.encode(session))
            .map_err(|e| PipelineError::EncodingError(e.to_string()))
    }

    /// Encode a batch as newline-delimited JSON, one row per session
    pub fn encode_batch_ndjson(
        &self,
        sessions: &[WorkdaySession],
    ) -> Result<String, PipelineError> {
        let mut out = String::new();
        for session in sessions {
            out.push_str(&self.encode_to_json(session)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Default for RowEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppSegment, PAUSE_LABEL};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn make_test_session() -> WorkdaySession {
        let ts = |h: u32, m: u32| Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap();
        let mut work = AppSegment::filler("Slack", ts(9, 0), ts(9, 45));
        work.mouse_clicks = 12;
        work.keystrokes = 300;
        work.mic = true;
        let pause = AppSegment::filler(PAUSE_LABEL, ts(9, 45), ts(9, 50));
        let mut session =
            WorkdaySession::from_segments("emp-1", 1, vec![work, pause]);
        session.hours_until_next_workday = 16.5;
        session
    }

    #[test]
    fn test_parallel_arrays_align() {
        let row = RowEncoder::new().encode(&make_test_session());

        assert_eq!(row.employee_id, "emp-1_1");
        assert_eq!(row.app, vec!["Slack", PAUSE_LABEL]);
        assert_eq!(row.app_durations, vec![45.0, 5.0]);
        assert_eq!(row.mouse_clicks, vec![12, 0]);
        assert_eq!(row.keystrokes, vec![300, 0]);
        assert_eq!(row.mic, vec![true, false]);
        assert_eq!(row.app_start_times.len(), 2);
        assert_eq!(row.app_end_times.len(), 2);
        assert_eq!(row.workday_duration, 50.0);
        assert_eq!(row.hours_until_next_workday, 16.5);
    }

    #[test]
    fn test_json_uses_source_column_names() {
        let json = RowEncoder::new().encode_to_json(&make_test_session()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["employeeId"], "emp-1_1");
        assert!(value["mouseClicks"].is_array());
        assert!(value["mouseScroll"].is_array());
        assert!(value["app_durations"].is_array());
        assert!(value["workday_duration"].is_number());
    }

    #[test]
    fn test_ndjson_batch() {
        let sessions = vec![make_test_session(), make_test_session()];
        let ndjson = RowEncoder::new().encode_batch_ndjson(&sessions).unwrap();

        let lines: Vec<&str> = ndjson.trim_end().lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["employeeId"], "emp-1_1");
        }
    }
}
