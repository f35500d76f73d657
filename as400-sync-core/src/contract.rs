#![allow(unused)]

//! # contract: seams between the sync pipeline and the outside world
//!
//! The orchestrator in [`crate::synchronise`] only talks to three traits:
//! - [`Extractor`]: runs a read-only query against the source system (DB2 on AS/400).
//! - [`Loader`]: writes typed rows into the target store (MySQL).
//! - [`WatermarkStore`]: reads and upserts the per-job `last_sync_date`.
//!
//! Concrete clients live in the `as400-sync` binary crate.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; with the default `test-export-mocks` feature the
//!   generated `MockExtractor`, `MockLoader` and `MockWatermarkStore` are exported for
//!   integration tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use mockall::{automock, predicate::*};

use crate::error::{BoxError, ExtractError};
use crate::plan::DateRange;
use crate::record::{FieldValue, TargetRecord};

/// A query to run against the source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceQuery {
    pub sql: &'static str,
    /// When set, bound as two inclusive `YYYYMMDD` integer parameters.
    pub range: Option<DateRange>,
}

impl SourceQuery {
    pub fn full(sql: &'static str) -> Self {
        Self { sql, range: None }
    }

    pub fn ranged(sql: &'static str, range: DateRange) -> Self {
        Self {
            sql,
            range: Some(range),
        }
    }
}

/// Typed rows lowered to bindable values, ready for a single bulk write.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBatch {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<FieldValue>>,
}

impl LoadBatch {
    pub fn from_records<R: TargetRecord>(records: Vec<R>) -> Self {
        Self {
            table: R::TABLE,
            columns: R::target_columns(),
            rows: records.into_iter().map(TargetRecord::into_values).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trait for reading rows from the source system.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Execute one read-only query. An empty result is not an error.
    async fn extract(&self, query: &SourceQuery) -> Result<Vec<crate::record::RawRecord>, ExtractError>;
}

/// Trait for writing rows into the target store.
///
/// Both methods must be all-or-nothing: on error no row of the batch may remain visible.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Loader: Send + Sync {
    /// Append every row of the batch. Returns the number of rows written.
    async fn append(&self, batch: &LoadBatch) -> Result<u64, BoxError>;

    /// Replace the whole table content with the batch. Returns the number of rows written.
    async fn replace(&self, batch: &LoadBatch) -> Result<u64, BoxError>;
}

/// Trait for the persisted per-job watermark.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Last date synced by `job`, or `None` if the job never completed a run.
    async fn last_synced(&self, job: &str) -> Result<Option<NaiveDate>, BoxError>;

    /// Insert or update the watermark of `job`.
    async fn commit(&self, job: &str, date: NaiveDate) -> Result<(), BoxError>;
}
