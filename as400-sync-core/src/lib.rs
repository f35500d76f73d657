#![doc = "as400-sync-core: core logic library for as400-sync."]

//! This crate contains the driver-independent logic for moving AS/400 (DB2) data
//! into the MySQL warehouse: chunk planning over watermarks, typed target records,
//! the transform step and the run orchestration.
//! Concrete ODBC and MySQL clients live in the `as400-sync` crate and plug in
//! through the traits in [`contract`].
//!
//! # Usage
//! Add this as a dependency for anything that plans, transforms or orchestrates a sync job.

pub mod config;
pub mod contract;
pub mod error;
pub mod jobs;
pub mod plan;
pub mod record;
pub mod synchronise;
pub mod transform;

// Lets `target_record!` name this crate by path from inside it too.
extern crate self as as400_sync_core;

#[doc(hidden)]
pub use chrono;
#[doc(hidden)]
pub use serde;
