use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Options steering value coercion in the transform step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Substituted for unparseable or missing values in fields marked as required.
    pub numeric_default: i64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self { numeric_default: 0 }
    }
}

/// Settings for one incremental (watermarked) job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalJob {
    /// Watermark key, e.g. `sync_vendite`.
    pub name: String,
    /// First date ever synced when the job has no watermark yet.
    pub start_date: NaiveDate,
    /// Maximum number of days processed by one run.
    pub chunk_size_days: u32,
    pub transform: TransformOptions,
}

impl IncrementalJob {
    pub fn trace_loaded(&self) {
        info!(
            job = %self.name,
            start_date = %self.start_date,
            chunk_size_days = self.chunk_size_days,
            numeric_default = self.transform.numeric_default,
            "Loaded incremental job"
        );
        debug!(?self, "Incremental job loaded (full debug)");
    }
}
