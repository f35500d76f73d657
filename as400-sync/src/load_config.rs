/// `load_config` module: Builds the run configuration from the process environment.
///
/// This module is the only place where environment variables are read. Everything downstream
/// receives the typed [`AppConfig`] built here, once, at process start.
///
/// # Responsibilities
/// - Load a `.env` file (if any) before reading variables
/// - Read the DB2 connection settings and the MySQL connection URL, all mandatory
/// - Read job tuning (start date floor, chunk size, numeric default, batch sizes) with defaults
/// - Fail with a message naming the offending variable
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{anyhow, Context, Result};
use as400_sync_core::config::{IncrementalJob, TransformOptions};
use chrono::NaiveDate;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error, info};

pub const DEFAULT_START_DATE: &str = "2023-01-01";
pub const DEFAULT_CHUNK_DAYS: u32 = 30;
pub const DEFAULT_LOAD_BATCH_ROWS: usize = 1000;
pub const DEFAULT_FETCH_BATCH: usize = 5000;

/// Connection settings for the AS/400 ODBC driver.
#[derive(Clone)]
pub struct Db2Config {
    pub system: String,
    pub user: String,
    pub password: String,
    pub driver_name: String,
    /// Library list, appended as `DBQ=, <libs>;`.
    pub libs: Option<String>,
}

impl Db2Config {
    /// DSN-less ODBC connection string.
    pub fn connection_string(&self) -> String {
        let mut conn = format!(
            "DRIVER={{{}}};SYSTEM={};UID={};PWD={};",
            self.driver_name,
            self.system,
            self.user,
            odbc_value(&self.password)
        );
        if let Some(libs) = &self.libs {
            conn.push_str(&format!("DBQ=, {libs};"));
        }
        conn
    }
}

/// Braces a value that would otherwise break the `KEY=value;` syntax.
fn odbc_value(value: &str) -> String {
    if value.contains(';') || value.starts_with('{') {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

impl fmt::Debug for Db2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2Config")
            .field("system", &self.system)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("driver_name", &self.driver_name)
            .field("libs", &self.libs)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub db2: Db2Config,
    pub database_url: String,
    pub start_date: NaiveDate,
    pub chunk_size_days: u32,
    pub transform: TransformOptions,
    pub load_batch_rows: usize,
    pub fetch_batch: usize,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("db2", &self.db2)
            .field("database_url", &redact_url(&self.database_url))
            .field("start_date", &self.start_date)
            .field("chunk_size_days", &self.chunk_size_days)
            .field("transform", &self.transform)
            .field("load_batch_rows", &self.load_batch_rows)
            .field("fetch_batch", &self.fetch_batch)
            .finish()
    }
}

/// Drops the `user:password@` part of a URL.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

impl AppConfig {
    /// Settings for the incremental job called `name`.
    pub fn incremental_job(&self, name: &str) -> IncrementalJob {
        IncrementalJob {
            name: name.to_string(),
            start_date: self.start_date,
            chunk_size_days: self.chunk_size_days,
            transform: self.transform,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            db2_system = %self.db2.system,
            db2_driver = %self.db2.driver_name,
            db2_libs = self.db2.libs.as_deref().unwrap_or("-"),
            start_date = %self.start_date,
            chunk_size_days = self.chunk_size_days,
            load_batch_rows = self.load_batch_rows,
            "Loaded AppConfig"
        );
        debug!(?self, "AppConfig loaded (full debug)");
    }
}

/// Loads `.env` from the working directory (or a parent), then reads the environment.
pub fn load_config() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => info!(env_file = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => debug!("No .env file found, using process environment"),
        Err(e) => {
            error!(error = ?e, "Failed to parse .env file");
            return Err(anyhow!("Failed to parse .env file: {e}"));
        }
    }
    from_env()
}

/// Loads an explicit dotenv file, then reads the environment.
///
/// Variables already set in the process take precedence over the file.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(env_file = ?path_ref, "Loading environment from file");
    dotenvy::from_path(path_ref).map_err(|e| {
        error!(error = ?e, env_file = ?path_ref, "Failed to read env file");
        anyhow!("Failed to read env file {:?}: {}", path_ref, e)
    })?;
    from_env()
}

/// Reads the configuration from the current process environment only.
pub fn from_env() -> Result<AppConfig> {
    let db2 = Db2Config {
        system: required("DB2_SYSTEM")?,
        user: required("DB2_USER")?,
        password: required("DB2_PASSWORD")?,
        driver_name: required("DB2_DRIVER_NAME")?,
        libs: optional("DB2_LIBS"),
    };
    let database_url = required("DATABASE_URL")?;

    let start_date = parsed_or("SYNC_START_DATE", || {
        NaiveDate::from_str(DEFAULT_START_DATE).context("default start date")
    })?;
    let chunk_size_days = positive("SYNC_CHUNK_DAYS", DEFAULT_CHUNK_DAYS)?;
    let numeric_default = parsed_or("SYNC_NUMERIC_DEFAULT", || Ok(0i64))?;
    let load_batch_rows = positive("LOAD_BATCH_ROWS", DEFAULT_LOAD_BATCH_ROWS)?;
    let fetch_batch = positive("DB2_FETCH_BATCH", DEFAULT_FETCH_BATCH)?;

    let config = AppConfig {
        db2,
        database_url,
        start_date,
        chunk_size_days,
        transform: TransformOptions { numeric_default },
        load_batch_rows,
        fetch_batch,
    };
    config.trace_loaded();
    Ok(config)
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String> {
    match optional(key) {
        Some(value) => Ok(value),
        None => {
            error!(var = key, "Required environment variable not set");
            Err(anyhow!("{key} environment variable not set"))
        }
    }
}

fn parsed_or<T, F>(key: &str, default: F) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: FnOnce() -> Result<T>,
{
    match optional(key) {
        None => default(),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            error!(var = key, value = %raw, error = %e, "Invalid environment variable");
            anyhow!("{key} has an invalid value {raw:?}: {e}")
        }),
    }
}

fn positive<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + PartialOrd + Default + Copy,
    T::Err: fmt::Display,
{
    let value = parsed_or(key, || Ok(default))?;
    if value <= T::default() {
        error!(var = key, "Environment variable must be greater than zero");
        return Err(anyhow!("{key} must be greater than zero"));
    }
    Ok(value)
}
