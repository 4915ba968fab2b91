//! Workday segmentation
//!
//! Second pipeline stage: walks each employee's chronological event sequence
//! and partitions it into day-bounded sessions. Gaps between events are
//! classified by size: a gap at or above `max_workday_gap` closes the current
//! session, a gap of up to `log_lost_threshold` becomes a
//! `Log Lost/Software Bug` filler, anything in between becomes a `Pause`
//! filler. Overlapping or back-to-back events get no filler.

use chrono::{DateTime, Utc};

use crate::config::PipelineConfig;
use crate::types::{
    ActivityEvent, AppSegment, WorkdaySession, LOG_LOST_LABEL, PAUSE_LABEL,
};

/// Segmenter that partitions normalized events into workday sessions
pub struct WorkdaySegmenter;

impl WorkdaySegmenter {
    /// Segment a batch of normalized events into sessions, per employee.
    ///
    /// Sortedness is a precondition of the gap arithmetic, so the input is
    /// re-sorted on entry rather than trusted. Session sequence numbers start
    /// at 1 per employee in chronological order.
    pub fn segment(
        mut events: Vec<ActivityEvent>,
        config: &PipelineConfig,
    ) -> Vec<WorkdaySession> {
        events.sort_by(|a, b| {
            a.employee_id
                .cmp(&b.employee_id)
                .then(a.start.cmp(&b.start))
        });

        let max_gap_ms = config.max_workday_gap_secs * 1000;
        let log_lost_ms = config.log_lost_threshold_secs * 1000;

        let mut sessions = Vec::new();
        let mut state: Option<EmployeeState> = None;

        for event in &events {
            if let Some(current) = state.as_mut() {
                if current.employee_id == event.employee_id {
                    let gap_ms = gap_millis(current.last_event_end, event.start);

                    if gap_ms >= max_gap_ms {
                        current.flush(&mut sessions);
                        current.open(event);
                        continue;
                    }

                    if gap_ms > 0 && gap_ms <= log_lost_ms {
                        current.segments.push(AppSegment::filler(
                            LOG_LOST_LABEL,
                            current.last_event_end,
                            event.start,
                        ));
                    } else if gap_ms > log_lost_ms {
                        current.segments.push(AppSegment::filler(
                            PAUSE_LABEL,
                            current.last_event_end,
                            event.start,
                        ));
                    }

                    current.segments.push(AppSegment::from_event(event));
                    current.last_event_end = event.end;
                    continue;
                }
            }

            // New employee: flush whatever the previous one left open
            if let Some(mut finished) = state.take() {
                finished.flush(&mut sessions);
            }
            let mut fresh = EmployeeState::new(&event.employee_id);
            fresh.open(event);
            state = Some(fresh);
        }

        if let Some(mut finished) = state.take() {
            finished.flush(&mut sessions);
        }

        sessions
    }
}

/// Per-employee accumulator for the session under construction
struct EmployeeState {
    employee_id: String,
    segments: Vec<AppSegment>,
    last_event_end: DateTime<Utc>,
    next_sequence: u32,
}

impl EmployeeState {
    fn new(employee_id: &str) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            segments: Vec::new(),
            last_event_end: DateTime::<Utc>::MIN_UTC,
            next_sequence: 1,
        }
    }

    /// Start a new session with `event` as its first segment
    fn open(&mut self, event: &ActivityEvent) {
        self.segments.push(AppSegment::from_event(event));
        self.last_event_end = event.end;
    }

    /// Emit the open session, if any, and advance the sequence counter
    fn flush(&mut self, sessions: &mut Vec<WorkdaySession>) {
        if self.segments.is_empty() {
            return;
        }
        let segments = std::mem::take(&mut self.segments);
        sessions.push(WorkdaySession::from_segments(
            &self.employee_id,
            self.next_sequence,
            segments,
        ));
        self.next_sequence += 1;
    }
}

fn gap_millis(last_end: DateTime<Utc>, next_start: DateTime<Utc>) -> i64 {
    (next_start - last_end).num_milliseconds()
}
