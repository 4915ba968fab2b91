//! Workday Engine - batch consolidation of raw activity logs into workday sessions
//!
//! The engine turns per-app/site usage intervals into de-noised, day-bounded
//! activity timelines through a deterministic pipeline: normalization →
//! workday segmentation → gap reconciliation → feature annotation →
//! prune/merge.
//!
//! ## Modules
//!
//! - **catalog**: canonical app/site name resolution tables
//! - **normalizer**: raw record validation, label resolution, duplicate merging
//! - **segmenter**: day-bounded session splitting with gap fillers
//! - **reconciler**: log-lost absorption and adjacent-segment merging
//! - **features**: per-session duration and next-session gap
//! - **merger**: minimum-duration pruning and proximity merging
//! - **encoder**: flat parallel-array output rows

pub mod catalog;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod reconciler;
pub mod segmenter;
pub mod types;

pub use catalog::{CatalogTables, NameCatalog};
pub use config::PipelineConfig;
pub use encoder::{RowEncoder, WorkdayRow};
pub use error::PipelineError;
pub use pipeline::{events_to_workdays, WorkdayProcessor};
pub use types::{ActivityEvent, AppSegment, RawActivityRecord, WorkdaySession};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
