//! Gap reconciliation
//!
//! Third pipeline stage: within each session, `Log Lost/Software Bug`
//! segments are absorbed into the segment before them, and consecutive
//! segments with the same app that are exactly time-contiguous collapse into
//! one. Session bounds are untouched; only the segment list is rebuilt.

use crate::error::PipelineError;
use crate::types::{AppSegment, WorkdaySession, LOG_LOST_LABEL};

/// Reconciler that de-noises session segment lists in place
pub struct GapReconciler;

impl GapReconciler {
    /// Rebuild every session's segment list. A `Log Lost/Software Bug`
    /// segment with no predecessor means the segmenter opened a session with
    /// a filler, which it never does; that is reported as an invariant
    /// violation rather than silently dropped.
    pub fn reconcile(sessions: &mut [WorkdaySession]) -> Result<(), PipelineError> {
        for session in sessions.iter_mut() {
            session.segments = reconcile_segments(&session.session_id, &session.segments)?;
        }
        Ok(())
    }
}

fn reconcile_segments(
    session_id: &str,
    segments: &[AppSegment],
) -> Result<Vec<AppSegment>, PipelineError> {
    let mut retained: Vec<AppSegment> = Vec::with_capacity(segments.len());

    for segment in segments {
        if segment.app == LOG_LOST_LABEL {
            match retained.last_mut() {
                Some(prev) => prev.fold(segment),
                None => {
                    return Err(PipelineError::InvariantViolation(format!(
                        "session {session_id} starts with a {LOG_LOST_LABEL} filler"
                    )))
                }
            }
            continue;
        }

        match retained.last_mut() {
            Some(prev) if prev.app == segment.app && prev.end_time == segment.start_time => {
                prev.fold(segment);
            }
            _ => retained.push(segment.clone()),
        }
    }

    Ok(retained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn ts(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, s).unwrap()
    }

    fn make_segment(app: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> AppSegment {
        AppSegment {
            mouse_clicks: 2,
            keystrokes: 20,
            mouse_scroll: 1,
            mic: false,
            camera: false,
            ..AppSegment::filler(app, start, end)
        }
    }

    fn make_session(segments: Vec<AppSegment>) -> WorkdaySession {
        WorkdaySession::from_segments("emp-1", 1, segments)
    }

    #[test]
    fn test_log_lost_folds_into_previous() {
        let mut sessions = vec![make_session(vec![
            make_segment("A", ts(9, 0, 0), ts(9, 30, 0)),
            AppSegment::filler(LOG_LOST_LABEL, ts(9, 30, 0), ts(9, 30, 5)),
            make_segment("B", ts(9, 30, 5), ts(9, 45, 0)),
        ])];

        GapReconciler::reconcile(&mut sessions).unwrap();
        let segments = &sessions[0].segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].app, "A");
        assert_eq!(segments[0].end_time, ts(9, 30, 5));
        assert!((segments[0].duration_minutes - (30.0 + 5.0 / 60.0)).abs() < 1e-9);
        assert_eq!(segments[1].app, "B");
    }

    #[test]
    fn test_log_lost_then_same_app_collapses_to_one() {
        // A + folded gap ends where the next A starts, so both merges fire
        let mut sessions = vec![make_session(vec![
            make_segment("A", ts(9, 0, 0), ts(9, 30, 0)),
            AppSegment::filler(LOG_LOST_LABEL, ts(9, 30, 0), ts(9, 30, 5)),
            make_segment("A", ts(9, 30, 5), ts(9, 45, 0)),
        ])];

        GapReconciler::reconcile(&mut sessions).unwrap();
        let segments = &sessions[0].segments;
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].app, "A");
        assert_eq!(segments[0].start_time, ts(9, 0, 0));
        assert_eq!(segments[0].end_time, ts(9, 45, 0));
        assert_eq!(segments[0].mouse_clicks, 4);
    }

    #[test]
    fn test_same_app_non_contiguous_stays_split() {
        let mut sessions = vec![make_session(vec![
            make_segment("A", ts(9, 0, 0), ts(9, 30, 0)),
            make_segment("A", ts(9, 31, 0), ts(9, 45, 0)),
        ])];

        GapReconciler::reconcile(&mut sessions).unwrap();
        assert_eq!(sessions[0].segments.len(), 2);
    }

    #[test]
    fn test_session_bounds_unchanged() {
        let mut sessions = vec![make_session(vec![
            make_segment("A", ts(9, 0, 0), ts(9, 30, 0)),
            AppSegment::filler(LOG_LOST_LABEL, ts(9, 30, 0), ts(9, 30, 10)),
        ])];
        let start = sessions[0].start_time;
        let end = sessions[0].end_time;

        GapReconciler::reconcile(&mut sessions).unwrap();
        assert_eq!(sessions[0].start_time, start);
        assert_eq!(sessions[0].end_time, end);
    }

    #[test]
    fn test_leading_log_lost_is_invariant_violation() {
        let mut sessions = vec![make_session(vec![
            AppSegment::filler(LOG_LOST_LABEL, ts(9, 0, 0), ts(9, 0, 10)),
            make_segment("A", ts(9, 0, 10), ts(9, 30, 0)),
        ])];

        let result = GapReconciler::reconcile(&mut sessions);
        assert!(matches!(result, Err(PipelineError::InvariantViolation(_))));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut sessions = vec![make_session(vec![
            make_segment("A", ts(9, 0, 0), ts(9, 30, 0)),
            AppSegment::filler(LOG_LOST_LABEL, ts(9, 30, 0), ts(9, 30, 5)),
            make_segment("B", ts(9, 30, 5), ts(9, 45, 0)),
            make_segment("B", ts(9, 45, 0), ts(10, 0, 0)),
        ])];

        GapReconciler::reconcile(&mut sessions).unwrap();
        let first_pass = sessions.clone();
        GapReconciler::reconcile(&mut sessions).unwrap();
        assert_eq!(sessions, first_pass);
    }
}
