//! `harvest`: one pass over the configured sources, then exit.
//!
//! Exit codes: `0` when the run completed (per-source failures are logged, not
//! fatal), `2` when only the final reindex request failed, `1` for invalid
//! configuration or any other startup error.

mod config;
mod setup;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use harvest_engine::{HarvestRun, LoggingSink, RunReport};
use harvest_logging::{harvest_error, harvest_info, harvest_warn, LogDestination};
use log::LevelFilter;

use crate::config::{Credentials, HarvestConfig, PublishTarget};
use crate::setup::Components;

/// Scrape the configured sources, summarize them, store dated text files and
/// hand them to the knowledge store.
#[derive(Debug, Parser)]
#[command(name = "harvest", version)]
struct Args {
    /// RON configuration file. Defaults to `./harvest.ron` when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the dated text artifacts.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Store raw text for every source.
    #[arg(long)]
    no_summary: bool,

    /// Keep artifacts local; no copy and no reindex.
    #[arg(long)]
    no_publish: bool,

    /// Sources processed at once (results still reported in configured order).
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log debug output.
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut HarvestConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_summary {
            config.summarizer.enabled = false;
        }
        if self.no_publish {
            config.publish = PublishTarget::None;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrent_sources = concurrency.max(1);
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    match run(&args) {
        Ok(report) if report.reindex_failed() => {
            harvest_warn!("run completed but the reindex request failed");
            ExitCode::from(2)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            harvest_error!("harvest aborted: {err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<RunReport> {
    let mut config = HarvestConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    let sources = config.resolve_sources()?;

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    harvest_logging::initialize(&LogDestination::Both(config.log_file.clone()), level)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;

    let credentials = Credentials::from_env();
    let components = Components::build(&config, &credentials)?;
    let date = Utc::now().date_naive();
    harvest_info!(
        "harvest starting date={} sources={} output_dir={}",
        date,
        sources.len(),
        config.output_dir.display()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let report = runtime.block_on(async {
        let sink = LoggingSink;
        let mut harvest = HarvestRun::new(
            &components.settings,
            &components.fetcher,
            &components.writer,
            &sink,
        );
        if let Some(summarizer) = &components.summarizer {
            harvest = harvest.with_summarizer(summarizer);
        }
        if let Some(publisher) = components.publisher.as_deref() {
            harvest = harvest.with_publisher(publisher);
        }
        harvest.execute(&sources, date).await
    });

    harvest_info!("harvest finished {}", report.tally);
    Ok(report)
}
