//! Pipeline orchestration
//!
//! Public API for the workday engine. Runs the full batch pipeline:
//! normalization → segmentation → gap reconciliation → rejection window →
//! feature annotation → prune/merge. Every stage consumes the complete
//! employee population before the next stage runs.

use crate::catalog::NameCatalog;
use crate::config::PipelineConfig;
use crate::encoder::{RowEncoder, WorkdayRow};
use crate::error::PipelineError;
use crate::features::FeatureAnnotator;
use crate::merger::WorkdaySessionMerger;
use crate::normalizer::EventNormalizer;
use crate::reconciler::GapReconciler;
use crate::segmenter::WorkdaySegmenter;
use crate::types::{RawActivityRecord, WorkdaySession};

/// Run the full pipeline over one raw batch (one-shot).
///
/// # Arguments
/// * `records` - Raw activity log records, in any order
/// * `catalog` - Resolved app/site name tables
/// * `config` - Thresholds and optional rejection window
///
/// # Returns
/// Consolidated workday sessions, ordered by employee then chronologically.
pub fn events_to_workdays(
    records: &[RawActivityRecord],
    catalog: &NameCatalog,
    config: &PipelineConfig,
) -> Result<Vec<WorkdaySession>, PipelineError> {
    // Stage 1: Normalize raw records into clean per-employee event streams
    let events = EventNormalizer::normalize(records, catalog)?;

    // Stage 2: Partition into day-bounded sessions with gap fillers
    let mut sessions = WorkdaySegmenter::segment(events, config);

    // Stage 3: Absorb log-lost fillers and duplicate adjacent segments
    GapReconciler::reconcile(&mut sessions)?;

    // Business exclusion: drop sessions starting inside the rejection window
    sessions.retain(|s| !config.rejects(s.start_time));

    // Stage 4: Derive timing features
    FeatureAnnotator::annotate(&mut sessions);

    // Stage 5: Prune short sessions and merge near-adjacent ones
    Ok(WorkdaySessionMerger::prune_and_merge(sessions, config))
}

/// Configured processor bundling catalog, thresholds and the row encoder.
///
/// Use this when running several batches with the same configuration.
pub struct WorkdayProcessor {
    catalog: NameCatalog,
    config: PipelineConfig,
    encoder: RowEncoder,
}

impl WorkdayProcessor {
    /// Create a processor with the given name tables and thresholds
    pub fn new(catalog: NameCatalog, config: PipelineConfig) -> Self {
        Self {
            catalog,
            config,
            encoder: RowEncoder::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline over one raw batch
    pub fn process(
        &self,
        records: &[RawActivityRecord],
    ) -> Result<Vec<WorkdaySession>, PipelineError> {
        events_to_workdays(records, &self.catalog, &self.config)
    }

    /// Run the pipeline and flatten the result into output rows
    pub fn process_to_rows(
        &self,
        records: &[RawActivityRecord],
    ) -> Result<Vec<WorkdayRow>, PipelineError> {
        let sessions = self.process(records)?;
        Ok(sessions.iter().map(|s| self.encoder.encode(s)).collect())
    }

    /// Run the pipeline and serialize the result as newline-delimited JSON
    pub fn process_to_ndjson(
        &self,
        records: &[RawActivityRecord],
    ) -> Result<String, PipelineError> {
        let sessions = self.process(records)?;
        self.encoder.encode_batch_ndjson(&sessions)
    }
}
