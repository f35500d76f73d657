//! High-level pipeline: orchestrates plan → extract → transform → load → commit for one job.
//!
//! This module provides the top-level orchestration for a single sync run. Two flavours exist:
//!   - [`synchronise_incremental`]: watermarked, date-chunked, append-only (the sales feed)
//!   - [`refresh_reference`]: unranged extract that replaces the target table (master data)
//!
//! # Run state machine
//! `Idle → Planning → Extracting → Transforming → Loading → Committing → Done`, with
//! `Aborted` reachable from every state but `Done`. An up-to-date plan goes straight to `Done`;
//! an empty extract skips `Transforming`/`Loading` but still commits the watermark.
//!
//! # Responsibilities
//! - The watermark is upserted exactly once per run and only after the load succeeded
//! - Every failure ends the run: no retries, no backoff (the scheduler owns retry cadence)
//! - Every transition and failure is logged with `job` and `range` for manual reconciliation
//!
//! # Known gap
//! Load and watermark commit are separate statements. If the commit fails after a successful
//! load, the next run re-extracts and re-appends the same range (at-least-once).

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::config::{IncrementalJob, TransformOptions};
use crate::contract::{Extractor, LoadBatch, Loader, SourceQuery, WatermarkStore};
use crate::error::{SyncAbort, SyncError};
use crate::plan::{plan_chunk, ChunkPlan, DateRange};
use crate::record::TargetRecord;
use crate::transform::{transform, unmapped_columns};

/// States of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncState {
    Idle,
    Planning,
    Extracting,
    Transforming,
    Loading,
    Committing,
    Done,
    Aborted,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncState::Idle => "idle",
            SyncState::Planning => "planning",
            SyncState::Extracting => "extracting",
            SyncState::Transforming => "transforming",
            SyncState::Loading => "loading",
            SyncState::Committing => "committing",
            SyncState::Done => "done",
            SyncState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncOutcome {
    /// Nothing left to sync up to yesterday; watermark unchanged.
    UpToDate,
    /// A chunk was processed and the watermark advanced.
    Synced,
    /// A reference table was replaced (or left alone on an empty extract).
    Refreshed,
}

/// Summary of a run that reached `Done`.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub job: String,
    pub table: &'static str,
    pub outcome: SyncOutcome,
    pub final_state: SyncState,
    pub range: Option<DateRange>,
    pub rows_extracted: usize,
    pub rows_loaded: u64,
    pub previous_watermark: Option<NaiveDate>,
    pub watermark: Option<NaiveDate>,
}

/// Tracks the current state and builds [`SyncAbort`]s from it.
struct Run<'a> {
    job: &'a str,
    range: Option<DateRange>,
    state: SyncState,
}

impl<'a> Run<'a> {
    fn new(job: &'a str) -> Self {
        Self {
            job,
            range: None,
            state: SyncState::Idle,
        }
    }

    fn enter(&mut self, next: SyncState) {
        debug!(job = self.job, from = %self.state, to = %next, "[SYNC] State transition");
        self.state = next;
    }

    fn abort(&mut self, error: SyncError) -> SyncAbort {
        let failed_in = self.state;
        self.state = SyncState::Aborted;
        match &self.range {
            Some(range) => {
                error!(job = self.job, range = %range, state = %failed_in, error = %error, "[SYNC][ERROR] Run aborted")
            }
            None => {
                error!(job = self.job, state = %failed_in, error = %error, "[SYNC][ERROR] Run aborted")
            }
        }
        SyncAbort {
            job: self.job.to_string(),
            range: self.range,
            failed_in,
            error,
        }
    }
}

/// Run one chunk of an incremental job for record type `R`.
///
/// `today` bounds the plan: the last processable day is `today - 1`.
pub async fn synchronise_incremental<R, E, L, W>(
    job: &IncrementalJob,
    today: NaiveDate,
    extractor: &E,
    loader: &L,
    store: &W,
) -> Result<SyncReport, SyncAbort>
where
    R: TargetRecord,
    E: Extractor + ?Sized,
    L: Loader + ?Sized,
    W: WatermarkStore + ?Sized,
{
    let mut run = Run::new(&job.name);
    info!(job = %job.name, table = R::TABLE, "[SYNC] Starting incremental run");

    // --- Planning ---
    run.enter(SyncState::Planning);
    let previous = match store.last_synced(&job.name).await {
        Ok(previous) => previous,
        Err(e) => return Err(run.abort(SyncError::WatermarkRead(e))),
    };
    let range = match plan_chunk(previous, job.start_date, job.chunk_size_days, today) {
        ChunkPlan::UpToDate => {
            run.enter(SyncState::Done);
            info!(
                job = %job.name,
                watermark = ?previous,
                "[SYNC] Already synced up to yesterday, nothing to do"
            );
            return Ok(SyncReport {
                job: job.name.clone(),
                table: R::TABLE,
                outcome: SyncOutcome::UpToDate,
                final_state: SyncState::Done,
                range: None,
                rows_extracted: 0,
                rows_loaded: 0,
                previous_watermark: previous,
                watermark: previous,
            });
        }
        ChunkPlan::Range(range) => range,
    };
    run.range = Some(range);
    info!(job = %job.name, range = %range, watermark = ?previous, "[SYNC] Planned chunk");

    // --- Extracting ---
    run.enter(SyncState::Extracting);
    let raw = match extractor
        .extract(&SourceQuery::ranged(R::SOURCE_QUERY, range))
        .await
    {
        Ok(raw) => raw,
        Err(e) => return Err(run.abort(e.into())),
    };
    info!(job = %job.name, range = %range, rows = raw.len(), "[SYNC] Extracted rows");

    // --- Transforming / Loading ---
    let mut rows_loaded = 0;
    if raw.is_empty() {
        info!(job = %job.name, range = %range, "[SYNC] No rows in range, advancing watermark only");
    } else {
        run.enter(SyncState::Transforming);
        let batch = match transform_batch::<R>(&raw, &job.transform) {
            Ok(batch) => batch,
            Err(e) => return Err(run.abort(e)),
        };

        run.enter(SyncState::Loading);
        rows_loaded = match loader.append(&batch).await {
            Ok(n) => n,
            Err(source) => {
                return Err(run.abort(SyncError::Load {
                    table: R::TABLE,
                    source,
                }))
            }
        };
        info!(job = %job.name, range = %range, rows = rows_loaded, table = R::TABLE, "[SYNC] Appended rows");
    }

    // --- Committing ---
    run.enter(SyncState::Committing);
    if let Err(source) = store.commit(&job.name, range.end).await {
        if rows_loaded > 0 {
            warn!(
                job = %job.name,
                range = %range,
                rows_loaded,
                "[SYNC] Rows are loaded but the watermark is not; the next run will append this range again"
            );
        }
        return Err(run.abort(SyncError::WatermarkCommit {
            date: range.end,
            rows_loaded,
            source,
        }));
    }
    run.enter(SyncState::Done);
    info!(job = %job.name, watermark = %range.end, "[SYNC] Watermark committed");

    Ok(SyncReport {
        job: job.name.clone(),
        table: R::TABLE,
        outcome: SyncOutcome::Synced,
        final_state: SyncState::Done,
        range: Some(range),
        rows_extracted: raw.len(),
        rows_loaded,
        previous_watermark: previous,
        watermark: Some(range.end),
    })
}

/// Replace a reference table with the current content of the source system.
///
/// An empty extract leaves the table untouched: a source that suddenly returns nothing is far
/// more likely broken than empty.
pub async fn refresh_reference<R, E, L>(
    job_name: &str,
    options: &TransformOptions,
    extractor: &E,
    loader: &L,
) -> Result<SyncReport, SyncAbort>
where
    R: TargetRecord,
    E: Extractor + ?Sized,
    L: Loader + ?Sized,
{
    let mut run = Run::new(job_name);
    info!(job = job_name, table = R::TABLE, "[SYNC] Starting reference refresh");

    run.enter(SyncState::Extracting);
    let raw = match extractor.extract(&SourceQuery::full(R::SOURCE_QUERY)).await {
        Ok(raw) => raw,
        Err(e) => return Err(run.abort(e.into())),
    };
    info!(job = job_name, rows = raw.len(), "[SYNC] Extracted rows");

    let mut rows_loaded = 0;
    if raw.is_empty() {
        warn!(
            job = job_name,
            table = R::TABLE,
            "[SYNC] Source returned no rows, keeping the current table content"
        );
    } else {
        run.enter(SyncState::Transforming);
        let batch = match transform_batch::<R>(&raw, options) {
            Ok(batch) => batch,
            Err(e) => return Err(run.abort(e)),
        };

        run.enter(SyncState::Loading);
        rows_loaded = match loader.replace(&batch).await {
            Ok(n) => n,
            Err(source) => {
                return Err(run.abort(SyncError::Load {
                    table: R::TABLE,
                    source,
                }))
            }
        };
        info!(job = job_name, rows = rows_loaded, table = R::TABLE, "[SYNC] Replaced table content");
    }
    run.enter(SyncState::Done);

    Ok(SyncReport {
        job: job_name.to_string(),
        table: R::TABLE,
        outcome: SyncOutcome::Refreshed,
        final_state: SyncState::Done,
        range: None,
        rows_extracted: raw.len(),
        rows_loaded,
        previous_watermark: None,
        watermark: None,
    })
}

fn transform_batch<R: TargetRecord>(
    raw: &[crate::record::RawRecord],
    options: &TransformOptions,
) -> Result<LoadBatch, SyncError> {
    if let Some(first) = raw.first() {
        let dropped = unmapped_columns::<R>(first);
        if !dropped.is_empty() {
            debug!(table = R::TABLE, ?dropped, "Dropping unmapped source columns");
        }
    }
    let records = transform::<R>(raw, options)?;
    Ok(LoadBatch::from_records(records))
}
