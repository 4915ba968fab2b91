//! Session pruning and proximity merging
//!
//! Final pipeline stage, two phases per employee: sessions below the minimum
//! duration are pruned first, then chronologically adjacent sessions closer
//! than the proximity threshold merge into one, bridged by a `Pause` segment.
//! The prune-before-merge order is deliberate and matches the upstream
//! pipeline: a short session that could have been rescued by a nearby
//! neighbor is dropped permanently.

use std::collections::BTreeMap;

use crate::config::PipelineConfig;
use crate::features::FeatureAnnotator;
use crate::types::{hours_between, AppSegment, WorkdaySession, PAUSE_LABEL};

/// Merger that prunes short sessions and merges near-adjacent ones
pub struct WorkdaySessionMerger;

impl WorkdaySessionMerger {
    /// Prune sessions below the minimum duration, re-annotate, then run the
    /// per-employee merge loop until no adjacent pair qualifies. Output is
    /// ordered by employee, then chronologically.
    pub fn prune_and_merge(
        sessions: Vec<WorkdaySession>,
        config: &PipelineConfig,
    ) -> Vec<WorkdaySession> {
        let mut kept: Vec<WorkdaySession> = sessions
            .into_iter()
            .filter(|s| s.workday_duration_minutes >= config.min_workday_duration_minutes)
            .collect();
        FeatureAnnotator::annotate(&mut kept);

        let mut by_employee: BTreeMap<String, Vec<WorkdaySession>> = BTreeMap::new();
        for session in kept {
            by_employee
                .entry(session.base_employee_id.clone())
                .or_default()
                .push(session);
        }

        let mut merged = Vec::new();
        for (_, mut list) in by_employee {
            list.sort_by_key(|s| s.start_time);
            merge_adjacent(&mut list, config);
            recompute_next_gap(&mut list);
            merged.extend(list);
        }
        merged
    }
}

/// Merge loop over one employee's chronologically sorted session list.
/// After a merge the scan stays at the same position, since the extended
/// session may now reach the one that follows.
fn merge_adjacent(list: &mut Vec<WorkdaySession>, config: &PipelineConfig) {
    let mut idx = 0;
    while idx + 1 < list.len() {
        let gap_hours = hours_between(list[idx].end_time, list[idx + 1].start_time);

        // Overlapping sessions (identical start times) merge immediately.
        if gap_hours < config.merge_proximity_hours {
            let absorbed = list.remove(idx + 1);
            let survivor = &mut list[idx];

            // A zero gap still gets its bridging segment, degenerate to
            // zero length. Only an overlap skips it.
            if gap_hours >= 0.0 {
                survivor.segments.push(AppSegment::filler(
                    PAUSE_LABEL,
                    survivor.end_time,
                    absorbed.start_time,
                ));
            }
            survivor.segments.extend(absorbed.segments);
            survivor.workday_duration_minutes +=
                absorbed.workday_duration_minutes + gap_hours.max(0.0) * 60.0;
            survivor.end_time = absorbed.end_time;
        } else {
            idx += 1;
        }
    }
}

/// Rewrite `hours_until_next_workday` across a settled per-employee list
fn recompute_next_gap(list: &mut [WorkdaySession]) {
    for idx in 0..list.len() {
        list[idx].hours_until_next_workday = if idx + 1 < list.len() {
            hours_between(list[idx].end_time, list[idx + 1].start_time)
        } else {
            -1.0
        };
    }
}
