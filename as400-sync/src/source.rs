//! AS/400 source: runs read-only DB2 queries through the IBM i Access ODBC driver.
//!
//! odbc-api is synchronous, so each query runs on tokio's blocking pool with its own
//! connection. Values are fetched as text and coerced later by the transform step.

use std::sync::Arc;

use as400_sync_core::contract::{Extractor, SourceQuery};
use as400_sync_core::error::ExtractError;
use as400_sync_core::record::{RawRecord, RawValue};
use async_trait::async_trait;
use odbc_api::buffers::TextRowSet;
use odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tracing::{debug, info};

/// Upper bound for a single text cell. AS/400 columns are far shorter.
const MAX_TEXT_LEN: usize = 4096;

pub struct Db2Extractor {
    env: Arc<Environment>,
    connection_string: String,
    fetch_batch: usize,
}

impl Db2Extractor {
    pub fn new(connection_string: String, fetch_batch: usize) -> Result<Self, ExtractError> {
        let env = Environment::new()
            .map_err(|e| ExtractError::Connection(format!("ODBC environment: {e}")))?;
        Ok(Self {
            env: Arc::new(env),
            connection_string,
            fetch_batch: fetch_batch.max(1),
        })
    }
}

#[async_trait]
impl Extractor for Db2Extractor {
    async fn extract(&self, query: &SourceQuery) -> Result<Vec<RawRecord>, ExtractError> {
        let env = Arc::clone(&self.env);
        let connection_string = self.connection_string.clone();
        let fetch_batch = self.fetch_batch;
        let query = *query;

        tokio::task::spawn_blocking(move || {
            run_query(&env, &connection_string, &query, fetch_batch)
        })
        .await
        .map_err(|e| ExtractError::Query(format!("extraction task failed: {e}")))?
    }
}

fn run_query(
    env: &Environment,
    connection_string: &str,
    query: &SourceQuery,
    fetch_batch: usize,
) -> Result<Vec<RawRecord>, ExtractError> {
    let conn = env
        .connect_with_connection_string(connection_string, ConnectionOptions::default())
        .map_err(|e| ExtractError::Connection(e.to_string()))?;
    debug!("[EXTRACT] Connected to AS/400");

    let query_err = |e: odbc_api::Error| ExtractError::Query(e.to_string());
    let cursor = match query.range {
        Some(range) => {
            let (from, to) = range.db2_bounds();
            info!(range = %range, from, to, "[EXTRACT] Running ranged query");
            conn.execute(query.sql, (&from, &to))
                .map_err(query_err)?
        }
        None => {
            info!("[EXTRACT] Running full query");
            conn.execute(query.sql, ()).map_err(query_err)?
        }
    };
    let Some(mut cursor) = cursor else {
        return Ok(Vec::new());
    };

    let names = cursor
        .column_names()
        .map_err(query_err)?
        .collect::<Result<Vec<String>, _>>()
        .map_err(query_err)?;
    let buffer = TextRowSet::for_cursor(fetch_batch, &mut cursor, Some(MAX_TEXT_LEN))
        .map_err(query_err)?;
    let mut row_set = cursor.bind_buffer(buffer).map_err(query_err)?;

    let mut records = Vec::new();
    // A cell longer than MAX_TEXT_LEN fails the fetch instead of being cut short.
    while let Some(batch) = row_set
        .fetch_with_truncation_check(true)
        .map_err(query_err)?
    {
        for row in 0..batch.num_rows() {
            records.push(to_record(&names, |col| batch.at(col, row)));
        }
        debug!(rows = records.len(), "[EXTRACT] Fetched batch");
    }
    Ok(records)
}

/// Builds one record from the cells of a fetched row. A missing cell is SQL `NULL`.
fn to_record<'a>(names: &[String], cell: impl Fn(usize) -> Option<&'a [u8]>) -> RawRecord {
    let fields = names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let value = match cell(col) {
                Some(bytes) => RawValue::Text(String::from_utf8_lossy(bytes).into_owned()),
                None => RawValue::Null,
            };
            (name.clone(), value)
        })
        .collect();
    RawRecord::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_cells_keep_column_names_and_nulls() {
        let names = vec!["TCOMAG".to_string(), "DCESSP".to_string(), "DDEART".to_string()];
        let cells: [Option<&[u8]>; 3] = [Some(&b"001"[..]), None, Some(&b"Detersivo 1L  "[..])];

        let record = to_record(&names, |col| cells[col]);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("tcomag"), Some(&RawValue::from("001")));
        assert_eq!(record.get("DCESSP"), Some(&RawValue::Null));
        assert_eq!(record.get("DDEART"), Some(&RawValue::from("Detersivo 1L  ")));
    }
}
