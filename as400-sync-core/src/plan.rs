//! Chunk planning: turns a watermark into the next bounded date window.
//!
//! Each run of an incremental job processes at most `chunk_size_days` days, starting the day
//! after the watermark and never reaching today (the source only has finalized data up to
//! yesterday). A job far behind walks forward one chunk per run.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Bounds in the numeric `YYYYMMDD` form the AS/400 tables store dates in.
    pub fn db2_bounds(&self) -> (i64, i64) {
        (yyyymmdd(self.start), yyyymmdd(self.end))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

fn yyyymmdd(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Result of planning the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPlan {
    /// Everything up to yesterday is already synced.
    UpToDate,
    Range(DateRange),
}

/// Compute the next window to process.
///
/// `range_start` is the day after `last_synced`, floored at `start_date`; `range_end` is
/// `range_start + chunk_size_days - 1`, capped at the day before `today`.
pub fn plan_chunk(
    last_synced: Option<NaiveDate>,
    start_date: NaiveDate,
    chunk_size_days: u32,
    today: NaiveDate,
) -> ChunkPlan {
    let yesterday = today - Duration::days(1);
    let range_start = match last_synced {
        Some(last) => (last + Duration::days(1)).max(start_date),
        None => start_date,
    };

    if range_start > yesterday {
        return ChunkPlan::UpToDate;
    }

    let span = i64::from(chunk_size_days.max(1)) - 1;
    // Saturates: a chunk reaching past chrono's calendar still stops at yesterday.
    let range_end = range_start
        .checked_add_signed(Duration::days(span))
        .map_or(yesterday, |end| end.min(yesterday));

    ChunkPlan::Range(DateRange {
        start: range_start,
        end: range_end,
    })
}
