//! Transform step: raw source rows -> typed target records.
//!
//! Pure and deterministic; no I/O. Column renaming, date parsing and numeric coercion are
//! driven by each record's mapping table (see [`crate::record::TargetRecord::COLUMNS`]).

use tracing::{debug, error};

use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::record::{RawRecord, TargetRecord};

/// Transform every record, preserving order. The output has the same length as the input.
///
/// Values never make this fail; only a record missing a mapped column does.
pub fn transform<R: TargetRecord>(
    records: &[RawRecord],
    options: &TransformOptions,
) -> Result<Vec<R>, TransformError> {
    debug!(table = R::TABLE, rows = records.len(), "Transforming rows");
    records
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            R::from_raw(raw, options).map_err(|e| match e {
                TransformError::MissingColumn { column, .. } => {
                    error!(table = R::TABLE, column, row, "Source row lacks a mapped column");
                    TransformError::MissingColumn { column, row }
                }
            })
        })
        .collect()
}

/// Source columns of `record` that the mapping of `R` drops.
pub fn unmapped_columns<R: TargetRecord>(record: &RawRecord) -> Vec<&str> {
    record
        .names()
        .filter(|name| {
            !R::COLUMNS
                .iter()
                .any(|c| c.source.eq_ignore_ascii_case(name))
        })
        .collect()
}
