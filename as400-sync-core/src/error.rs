//! Error types shared by the planner, transformer and orchestrator.

use crate::plan::DateRange;
use crate::synchronise::SyncState;

/// Boxed error returned by opaque trait seams (loaders, watermark stores).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure raised by an [`Extractor`](crate::contract::Extractor).
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The source system could not be reached or refused the login.
    #[error("source connection failed: {0}")]
    Connection(String),

    /// Connected, but preparing, executing or fetching the query failed.
    #[error("source query failed: {0}")]
    Query(String),
}

/// Data-shape mismatch between the extracted rows and a record's mapping table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("row {row}: mapped source column `{column}` is missing")]
    MissingColumn { column: &'static str, row: usize },
}

/// Why a run ended in the `Aborted` state.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("cannot connect to source system: {0}")]
    SourceConnection(String),

    #[error("source query failed: {0}")]
    SourceQuery(String),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("load into `{table}` failed: {source}")]
    Load {
        table: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("reading watermark failed: {0}")]
    WatermarkRead(#[source] BoxError),

    #[error("committing watermark {date} failed after {rows_loaded} rows were loaded: {source}")]
    WatermarkCommit {
        date: chrono::NaiveDate,
        rows_loaded: u64,
        #[source]
        source: BoxError,
    },
}

impl From<ExtractError> for SyncError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Connection(msg) => SyncError::SourceConnection(msg),
            ExtractError::Query(msg) => SyncError::SourceQuery(msg),
        }
    }
}

/// A run that terminated in `Aborted`, with enough context for manual reconciliation.
#[derive(Debug, thiserror::Error)]
#[error("job `{job}` aborted while {failed_in}{}: {error}", range_suffix(.range))]
pub struct SyncAbort {
    pub job: String,
    pub range: Option<DateRange>,
    /// State that was active when the failure happened.
    pub failed_in: SyncState,
    #[source]
    pub error: SyncError,
}

fn range_suffix(range: &Option<DateRange>) -> String {
    match range {
        Some(r) => format!(" ({r})"),
        None => String::new(),
    }
}
