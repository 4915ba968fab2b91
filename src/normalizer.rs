//! Event normalization
//!
//! First pipeline stage: validates raw records, resolves inactive-app and
//! private-link labels, applies the canonical name catalog, fills missing
//! metrics, and merges immediately-adjacent duplicate-app events per employee.
//!
//! Validation fails the whole batch rather than skipping records: gap
//! arithmetic downstream is unsafe over silently dropped events.

use chrono::{DateTime, TimeZone, Utc};

use crate::catalog::NameCatalog;
use crate::error::PipelineError;
use crate::types::{
    ActivityEvent, RawActivityRecord, CONCENTRATION_LOST_LABEL, PRIVATE_LINKS_LABEL,
};

/// Normalizer for converting raw records to clean per-employee event streams
pub struct EventNormalizer;

impl EventNormalizer {
    /// Normalize a raw batch: validate, resolve names, fill metrics, sort
    /// per employee, drop exact duplicates and merge contiguous same-app
    /// events. The output is sorted by `(employee_id, start)`.
    pub fn normalize(
        records: &[RawActivityRecord],
        catalog: &NameCatalog,
    ) -> Result<Vec<ActivityEvent>, PipelineError> {
        let mut events = Vec::with_capacity(records.len());
        for record in records {
            events.push(convert_record(record, catalog)?);
        }

        events.sort_by(|a, b| {
            a.employee_id
                .cmp(&b.employee_id)
                .then(a.start.cmp(&b.start))
        });
        events.dedup();

        Ok(merge_consecutive(events))
    }
}

/// Validate one record and resolve its app label
fn convert_record(
    record: &RawActivityRecord,
    catalog: &NameCatalog,
) -> Result<ActivityEvent, PipelineError> {
    let raw_app = record
        .app
        .as_deref()
        .ok_or_else(|| PipelineError::MissingField("app".to_string()))?;
    let start_ms = record
        .start
        .ok_or_else(|| PipelineError::MissingField("start".to_string()))?;
    let end_ms = record
        .end
        .ok_or_else(|| PipelineError::MissingField("end".to_string()))?;

    let start = millis_to_datetime(start_ms)?;
    let end = millis_to_datetime(end_ms)?;
    if end < start {
        return Err(PipelineError::MalformedRecord(format!(
            "event for {} ends before it starts ({} < {})",
            record.employee_id, end, start
        )));
    }

    // Synthetic labels bypass catalog resolution so their documented values
    // survive the whitespace canonicalization applied to real app names.
    // A mapped site still takes precedence even over an inactive interval.
    let app = if record.active == Some(false) {
        if record
            .site
            .as_deref()
            .is_some_and(|s| catalog.has_site_mapping(s))
        {
            catalog.resolve(raw_app, record.site.as_deref())
        } else {
            CONCENTRATION_LOST_LABEL.to_string()
        }
    } else if catalog.is_local_app(raw_app) && record.site.is_none() {
        PRIVATE_LINKS_LABEL.to_string()
    } else {
        catalog.resolve(raw_app, record.site.as_deref())
    };

    Ok(ActivityEvent {
        employee_id: record.employee_id.clone(),
        app,
        site: record.site.clone(),
        start,
        end,
        mouse_clicks: record.mouse_clicks.unwrap_or(0),
        keystrokes: record.keystrokes.unwrap_or(0),
        mouse_scroll: record.mouse_scroll.unwrap_or(0),
        mic: record.mic.unwrap_or(false),
        camera: record.camera.unwrap_or(false),
    })
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, PipelineError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| PipelineError::InvalidTimestamp(format!("{ms} ms")))
}

/// Merge consecutive events that share an employee and app and are exactly
/// time-contiguous. Counters sum, booleans OR, the end time extends.
fn merge_consecutive(events: Vec<ActivityEvent>) -> Vec<ActivityEvent> {
    let mut merged: Vec<ActivityEvent> = Vec::with_capacity(events.len());
    for event in events {
        match merged.last_mut() {
            Some(prev)
                if prev.employee_id == event.employee_id
                    && prev.app == event.app
                    && prev.end == event.start =>
            {
                prev.end = event.end;
                prev.mouse_clicks += event.mouse_clicks;
                prev.keystrokes += event.keystrokes;
                prev.mouse_scroll += event.mouse_scroll;
                prev.mic = prev.mic || event.mic;
                prev.camera = prev.camera || event.camera;
            }
            _ => merged.push(event),
        }
    }
    merged
}
