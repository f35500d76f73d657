//! MySQL warehouse: bulk loader and `sync_control` watermark store.
//!
//! Every batch is written inside one transaction, split into multi-row `INSERT`s that stay
//! under MySQL's 65 535 placeholder limit. A failed statement drops the transaction, so no
//! row of the batch survives.

use as400_sync_core::contract::{LoadBatch, Loader, WatermarkStore};
use as400_sync_core::error::BoxError;
use as400_sync_core::record::FieldValue;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, QueryBuilder, Transaction};
use tracing::{debug, info};

/// Placeholder limit of a single prepared statement.
const MAX_BIND_PARAMS: usize = 65_535;
const MAX_CONNECTIONS: u32 = 2;

const CREATE_SYNC_CONTROL: &str = "CREATE TABLE IF NOT EXISTS sync_control (\
    job_name VARCHAR(64) NOT NULL PRIMARY KEY, \
    last_sync_date DATE NOT NULL)";
const SELECT_WATERMARK: &str = "SELECT last_sync_date FROM sync_control WHERE job_name = ?";
const UPSERT_WATERMARK: &str = "INSERT INTO sync_control (job_name, last_sync_date) VALUES (?, ?) \
    ON DUPLICATE KEY UPDATE last_sync_date = VALUES(last_sync_date)";

#[derive(Clone)]
pub struct MySqlTarget {
    pool: MySqlPool,
    batch_rows: usize,
}

impl MySqlTarget {
    #[tracing::instrument(level = "debug", skip(database_url))]
    pub async fn connect(database_url: &str, batch_rows: usize) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        info!("[LOAD] Connected to MySQL");
        Ok(Self::new(pool, batch_rows))
    }

    pub fn new(pool: MySqlPool, batch_rows: usize) -> Self {
        Self {
            pool,
            batch_rows: batch_rows.max(1),
        }
    }

    /// Create the watermark table when it does not exist yet.
    pub async fn ensure_sync_control(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_SYNC_CONTROL).execute(&self.pool).await?;
        debug!("[LOAD] sync_control table present");
        Ok(())
    }

    async fn insert_all(
        &self,
        tx: &mut Transaction<'_, MySql>,
        batch: &LoadBatch,
    ) -> Result<u64, sqlx::Error> {
        let prefix = insert_prefix(batch.table, &batch.columns);
        let per_statement = rows_per_statement(batch.columns.len(), self.batch_rows);
        let mut written = 0;

        for chunk in batch.rows.chunks(per_statement) {
            let mut qb: QueryBuilder<MySql> = QueryBuilder::new(&prefix);
            qb.push_values(chunk, |mut b, row| {
                for value in row {
                    match value {
                        FieldValue::Null => b.push_bind(None::<String>),
                        FieldValue::Text(s) => b.push_bind(s.clone()),
                        FieldValue::Int(i) => b.push_bind(*i),
                        FieldValue::Decimal(d) => b.push_bind(*d),
                        FieldValue::Date(d) => b.push_bind(*d),
                    };
                }
            });
            written += qb.build().execute(&mut **tx).await?.rows_affected();
            debug!(table = batch.table, rows = chunk.len(), "[LOAD] Inserted chunk");
        }
        Ok(written)
    }
}

#[async_trait]
impl Loader for MySqlTarget {
    async fn append(&self, batch: &LoadBatch) -> Result<u64, BoxError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let written = self.insert_all(&mut tx, batch).await?;
        tx.commit().await?;
        info!(table = batch.table, rows = written, "[LOAD] Append committed");
        Ok(written)
    }

    async fn replace(&self, batch: &LoadBatch) -> Result<u64, BoxError> {
        let mut tx = self.pool.begin().await?;
        // DELETE rather than TRUNCATE: TRUNCATE commits implicitly.
        let deleted = sqlx::query(&format!("DELETE FROM {}", quote_ident(batch.table)))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let written = self.insert_all(&mut tx, batch).await?;
        tx.commit().await?;
        info!(
            table = batch.table,
            deleted,
            rows = written,
            "[LOAD] Replace committed"
        );
        Ok(written)
    }
}

#[async_trait]
impl WatermarkStore for MySqlTarget {
    async fn last_synced(&self, job: &str) -> Result<Option<NaiveDate>, BoxError> {
        let date = sqlx::query_scalar::<_, NaiveDate>(SELECT_WATERMARK)
            .bind(job)
            .fetch_optional(&self.pool)
            .await?;
        Ok(date)
    }

    async fn commit(&self, job: &str, date: NaiveDate) -> Result<(), BoxError> {
        sqlx::query(UPSERT_WATERMARK)
            .bind(job)
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn insert_prefix(table: &str, columns: &[&str]) -> String {
    let columns: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!("INSERT INTO {} ({}) ", quote_ident(table), columns.join(", "))
}

/// Rows per `INSERT`, bounded by the configured batch size and the placeholder limit.
fn rows_per_statement(columns: usize, batch_rows: usize) -> usize {
    let by_params = MAX_BIND_PARAMS / columns.max(1);
    by_params.min(batch_rows).max(1)
}
