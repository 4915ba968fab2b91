//! Timing feature annotation
//!
//! Fourth pipeline stage: recomputes each session's duration from its current
//! bounds and derives the gap to the employee's next chronological session.
//! The last session of each employee gets the -1.0 sentinel.

use std::collections::BTreeMap;

use crate::types::{hours_between, minutes_between, WorkdaySession};

/// Annotator for inter-session timing features
pub struct FeatureAnnotator;

impl FeatureAnnotator {
    /// Recompute `workday_duration_minutes` and `hours_until_next_workday`
    /// for every session, grouped by base employee id. The collection order
    /// is preserved; only feature fields are written.
    pub fn annotate(sessions: &mut [WorkdaySession]) {
        let mut by_employee: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, session) in sessions.iter().enumerate() {
            by_employee
                .entry(session.base_employee_id.clone())
                .or_default()
                .push(idx);
        }

        for indices in by_employee.values_mut() {
            indices.sort_by_key(|&idx| sessions[idx].start_time);

            for pos in 0..indices.len() {
                let idx = indices[pos];
                let next_gap = match indices.get(pos + 1) {
                    Some(&next_idx) => {
                        hours_between(sessions[idx].end_time, sessions[next_idx].start_time)
                    }
                    None => -1.0,
                };

                let session = &mut sessions[idx];
                session.workday_duration_minutes =
                    minutes_between(session.start_time, session.end_time);
                session.hours_until_next_workday = next_gap;
            }
        }
    }
}
