/// # as400-sync CLI Interface (Module)
///
/// This module implements the command line of as400-sync: argument parsing, wiring of the
/// concrete DB2 source and MySQL target, and dispatch to the orchestrator in
/// [`as400-sync-core`].
///
/// All planning, transform and run-state logic lives in the core crate. This module is
/// strictly glue: build clients from [`AppConfig`], pick the record type for the requested
/// job, report the outcome.
///
/// ## How To Use
/// - From cron: `as400-sync sync vendite` (exit code 0 on success, non-zero on abort).
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`as400-sync-core`]: ../../as400-sync-core/
/// [`AppConfig`]: crate::load_config::AppConfig
use crate::load_config::{load_config, AppConfig};
use crate::source::Db2Extractor;
use crate::target::MySqlTarget;
use anyhow::{Context, Result};
use as400_sync_core::jobs::{AgenteRow, ArticoloRow, ClienteRow, JobKind, VenditaRow};
use as400_sync_core::synchronise::{refresh_reference, synchronise_incremental, SyncReport};
use clap::{Parser, Subcommand, ValueEnum};

/// CLI for as400-sync: copy AS/400 (DB2) data into the MySQL warehouse.
#[derive(Parser)]
#[clap(
    name = "as400-sync",
    version,
    about = "Synchronise AS/400 sales and master data into MySQL"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one job: a chunk of the sales feed, or a full refresh of a reference table
    Sync {
        #[clap(value_enum)]
        job: JobArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobArg {
    /// Sales lines, incremental by document date
    Vendite,
    /// Sales agents
    Agenti,
    /// Articles with stock and prices
    Articoli,
    /// Clients with SDI and payment terms
    Clienti,
}

impl From<JobArg> for JobKind {
    fn from(arg: JobArg) -> Self {
        match arg {
            JobArg::Vendite => JobKind::Vendite,
            JobArg::Agenti => JobKind::Agenti,
            JobArg::Articoli => JobKind::Articoli,
            JobArg::Clienti => JobKind::Clienti,
        }
    }
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { job } => {
            let job = JobKind::from(job);
            let config = load_config()?;
            tracing::info!(command = "sync", %job, "Starting synchronisation");
            let report = sync_job(job, &config).await?;
            let summary = serde_json::to_string(&report).context("serialising sync report")?;
            tracing::info!(command = "sync", %job, report = %summary, "Synchronisation complete");
            Ok(())
        }
    }
}

async fn sync_job(job: JobKind, config: &AppConfig) -> Result<SyncReport> {
    let target = MySqlTarget::connect(&config.database_url, config.load_batch_rows)
        .await
        .context("connecting to MySQL")?;
    let extractor = Db2Extractor::new(config.db2.connection_string(), config.fetch_batch)
        .context("initialising ODBC")?;
    let options = &config.transform;

    if job.is_incremental() {
        target
            .ensure_sync_control()
            .await
            .context("creating sync_control")?;
    }

    let result = match job {
        JobKind::Vendite => {
            let settings = config.incremental_job(job.name());
            settings.trace_loaded();
            let today = chrono::Local::now().date_naive();
            synchronise_incremental::<VenditaRow, _, _, _>(
                &settings, today, &extractor, &target, &target,
            )
            .await
        }
        JobKind::Agenti => {
            refresh_reference::<AgenteRow, _, _>(job.name(), options, &extractor, &target).await
        }
        JobKind::Articoli => {
            refresh_reference::<ArticoloRow, _, _>(job.name(), options, &extractor, &target)
                .await
        }
        JobKind::Clienti => {
            refresh_reference::<ClienteRow, _, _>(job.name(), options, &extractor, &target).await
        }
    };

    result.map_err(|abort| {
        tracing::error!(command = "sync", %job, error = %abort, "Synchronisation failed");
        anyhow::Error::new(abort)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_sales_feed_needs_the_watermark_table() {
        let jobs = [
            (JobArg::Vendite, "sync_vendite", true),
            (JobArg::Agenti, "sync_agenti", false),
            (JobArg::Articoli, "sync_articoli", false),
            (JobArg::Clienti, "sync_clienti", false),
        ];
        for (arg, name, incremental) in jobs {
            let job = JobKind::from(arg);
            assert_eq!(job.name(), name);
            assert_eq!(job.to_string(), name);
            assert_eq!(job.is_incremental(), incremental, "{name}");
        }
    }

    #[test]
    fn job_argument_parses_from_command_line() {
        let cli = Cli::try_parse_from(["as400-sync", "sync", "articoli"]).unwrap();
        let Commands::Sync { job } = cli.command;
        assert_eq!(JobKind::from(job), JobKind::Articoli);

        assert!(Cli::try_parse_from(["as400-sync", "sync", "ordini"]).is_err());
    }
}
