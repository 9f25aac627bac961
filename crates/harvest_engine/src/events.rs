use std::path::PathBuf;

use chrono::NaiveDate;
use harvest_core::RunTally;
use harvest_logging::{harvest_debug, harvest_error, harvest_info, harvest_warn};

/// Progress of a run, one event per stage transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    RunStarted { date: NaiveDate, sources: usize },
    FetchSucceeded { locator: String, chars: usize },
    FetchFailed { locator: String, error: String },
    Summarized { locator: String, chars: usize },
    SummaryFallback { locator: String, reason: String },
    SummarySkipped { locator: String },
    Written { locator: String, path: PathBuf },
    WriteFailed { locator: String, error: String },
    Published { locator: String, destination: String },
    PublishFailed { locator: String, error: String },
    ReindexSkipped { reason: &'static str },
    ReindexRequested,
    ReindexFailed { error: String },
    RunFinished { tally: RunTally },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Writes every event to the process log as `message key=value ...`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl ProgressSink for LoggingSink {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::RunStarted { date, sources } => {
                harvest_info!("harvest run started date={} sources={}", date, sources);
            }
            HarvestEvent::FetchSucceeded { locator, chars } => {
                harvest_info!("fetched locator={} chars={}", locator, chars);
            }
            HarvestEvent::FetchFailed { locator, error } => {
                harvest_error!("fetch failed locator={} error={}", locator, error);
            }
            HarvestEvent::Summarized { locator, chars } => {
                harvest_info!("summarized locator={} chars={}", locator, chars);
            }
            HarvestEvent::SummaryFallback { locator, reason } => {
                harvest_warn!(
                    "summary fallback, using raw text locator={} reason={}",
                    locator,
                    reason
                );
            }
            HarvestEvent::SummarySkipped { locator } => {
                harvest_debug!("summary skipped locator={}", locator);
            }
            HarvestEvent::Written { locator, path } => {
                harvest_info!("saved locator={} path={}", locator, path.display());
            }
            HarvestEvent::WriteFailed { locator, error } => {
                harvest_error!("write failed locator={} error={}", locator, error);
            }
            HarvestEvent::Published { locator, destination } => {
                harvest_info!("published locator={} destination={}", locator, destination);
            }
            HarvestEvent::PublishFailed { locator, error } => {
                harvest_warn!("publish failed locator={} error={}", locator, error);
            }
            HarvestEvent::ReindexSkipped { reason } => {
                harvest_info!("reindex skipped reason={}", reason);
            }
            HarvestEvent::ReindexRequested => harvest_info!("reindex requested"),
            HarvestEvent::ReindexFailed { error } => {
                harvest_warn!("reindex failed error={}", error);
            }
            HarvestEvent::RunFinished { tally } => {
                harvest_info!("harvest run finished {}", tally);
            }
        }
    }
}
