use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use harvest_core::{
    update, ContentKind, Effect, Msg, RunTally, Source, SourcePlan, SourceState, Stage,
};

use crate::events::{HarvestEvent, ProgressSink};
use crate::fetch::ContentFetcher;
use crate::persist::ArtifactWriter;
use crate::publish::Publisher;
use crate::retry::{retry, RetryPolicy};
use crate::summarize::Summarizer;
use crate::{
    FailureKind, FetchError, HarvestResult, PublishError, ReindexOutcome, RunReport,
    SummaryError, SummaryOutcome,
};

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Upper bound for any single network stage, on top of client timeouts.
    pub stage_timeout: Duration,
    pub fetch_retry: RetryPolicy,
    pub publish_retry: RetryPolicy,
    /// `1` processes sources strictly one after another.
    pub max_concurrent_sources: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            stage_timeout: Duration::from_secs(120),
            fetch_retry: RetryPolicy::default(),
            publish_retry: RetryPolicy::default(),
            max_concurrent_sources: 1,
        }
    }
}

async fn bounded<T, E>(
    limit: Duration,
    fut: impl Future<Output = Result<T, E>>,
    on_timeout: impl FnOnce() -> E,
) -> Result<T, E> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout()),
    }
}

/// One harvest pass over the configured sources.
///
/// Each source runs fetch → summarize → write → publish as driven by
/// [`harvest_core::update`]. Failures end that source's pipeline only. The
/// reindex request is sent once, after every source reached a terminal stage.
pub struct HarvestRun<'a> {
    settings: &'a RunSettings,
    fetcher: &'a dyn ContentFetcher,
    writer: &'a ArtifactWriter,
    sink: &'a dyn ProgressSink,
    summarizer: Option<&'a dyn Summarizer>,
    publisher: Option<&'a dyn Publisher>,
}

impl<'a> HarvestRun<'a> {
    pub fn new(
        settings: &'a RunSettings,
        fetcher: &'a dyn ContentFetcher,
        writer: &'a ArtifactWriter,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            settings,
            fetcher,
            writer,
            sink,
            summarizer: None,
            publisher: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: &'a dyn Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_publisher(mut self, publisher: &'a dyn Publisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub async fn execute(&self, sources: &[Source], date: NaiveDate) -> RunReport {
        self.sink.emit(HarvestEvent::RunStarted {
            date,
            sources: sources.len(),
        });

        // `buffered` keeps results in configured order whatever the concurrency.
        let results: Vec<HarvestResult> = stream::iter(sources)
            .map(|source| self.harvest_source(source, date))
            .buffered(self.settings.max_concurrent_sources.max(1))
            .collect()
            .await;

        let tally = RunTally::from_states(results.iter().map(|result| &result.state));
        let reindex = self.reindex(&tally).await;
        self.sink.emit(HarvestEvent::RunFinished { tally });

        RunReport {
            date,
            results,
            tally,
            reindex,
        }
    }

    fn plan_for(&self, source: &Source) -> SourcePlan {
        SourcePlan {
            summarize: source.summarize() && self.summarizer.is_some(),
            publish: self.publisher.is_some(),
        }
    }

    async fn harvest_source(&self, source: &Source, date: NaiveDate) -> HarvestResult {
        let mut state = SourceState::new(self.plan_for(source));
        let mut result = HarvestResult::new(source.clone(), state.clone());

        let mut next = Some(Effect::Fetch);
        while let Some(effect) = next {
            let msg = match effect {
                Effect::Fetch => self.fetch_stage(source, &mut result).await,
                Effect::Summarize => self.summarize_stage(source, &mut result).await,
                Effect::Write(kind) => self.write_stage(source, date, kind, &mut result),
                Effect::Publish => self.publish_stage(source, &mut result).await,
            };
            (state, next) = update(state, msg);
            if state.stage() == Stage::SummarySkipped {
                self.sink.emit(HarvestEvent::SummarySkipped {
                    locator: source.locator_text().to_string(),
                });
                result.summary = SummaryOutcome::Skipped;
            }
        }

        result.state = state;
        result
    }

    async fn fetch_stage(&self, source: &Source, result: &mut HarvestResult) -> Msg {
        let locator = source.locator_text();
        let limit = self.settings.stage_timeout;
        let fetched = retry(
            &self.settings.fetch_retry,
            "fetch",
            FetchError::is_transient,
            move || {
                bounded(limit, self.fetcher.fetch(source), move || {
                    FetchError::new(locator, FailureKind::Timeout, "fetch stage timed out")
                })
            },
        )
        .await;

        let msg = match &fetched {
            Ok(text) => {
                self.sink.emit(HarvestEvent::FetchSucceeded {
                    locator: locator.to_string(),
                    chars: text.chars().count(),
                });
                Msg::FetchSucceeded
            }
            Err(err) => {
                self.sink.emit(HarvestEvent::FetchFailed {
                    locator: locator.to_string(),
                    error: err.to_string(),
                });
                Msg::FetchFailed
            }
        };
        result.raw = Some(fetched);
        msg
    }

    async fn summarize_stage(&self, source: &Source, result: &mut HarvestResult) -> Msg {
        let locator = source.locator_text().to_string();
        let (Some(summarizer), Some(raw)) =
            (self.summarizer, result.raw_text().map(str::to_owned))
        else {
            result.summary = SummaryOutcome::Fallback(SummaryError::Empty);
            return Msg::SummaryFailed;
        };

        let summarized = bounded(
            self.settings.stage_timeout,
            summarizer.summarize(&raw, Some(source.category().as_str())),
            || SummaryError::Timeout,
        )
        .await
        .and_then(|text| {
            if text.trim().is_empty() {
                Err(SummaryError::Empty)
            } else {
                Ok(text)
            }
        });

        match summarized {
            Ok(text) => {
                self.sink.emit(HarvestEvent::Summarized {
                    locator,
                    chars: text.chars().count(),
                });
                result.summary = SummaryOutcome::Summarized(text);
                Msg::SummarySucceeded
            }
            Err(err) => {
                self.sink.emit(HarvestEvent::SummaryFallback {
                    locator,
                    reason: err.to_string(),
                });
                result.summary = SummaryOutcome::Fallback(err);
                Msg::SummaryFailed
            }
        }
    }

    fn write_stage(
        &self,
        source: &Source,
        date: NaiveDate,
        kind: ContentKind,
        result: &mut HarvestResult,
    ) -> Msg {
        let content = match (kind, &result.summary) {
            (ContentKind::Summary, SummaryOutcome::Summarized(text)) => text.as_str(),
            _ => result.raw_text().unwrap_or_default(),
        };

        let written = self.writer.write(&source.logical_name(), date, content);
        let locator = source.locator_text().to_string();
        let msg = match &written {
            Ok(path) => {
                self.sink.emit(HarvestEvent::Written {
                    locator,
                    path: path.clone(),
                });
                Msg::WriteSucceeded
            }
            Err(err) => {
                self.sink.emit(HarvestEvent::WriteFailed {
                    locator,
                    error: err.to_string(),
                });
                Msg::WriteFailed
            }
        };
        result.artifact = Some(written);
        msg
    }

    async fn publish_stage(&self, source: &Source, result: &mut HarvestResult) -> Msg {
        let locator = source.locator_text().to_string();
        let (Some(publisher), Some(artifact)) =
            (self.publisher, result.artifact_path().map(Path::to_path_buf))
        else {
            return Msg::PublishFailed;
        };
        let artifact = artifact.as_path();

        let limit = self.settings.stage_timeout;
        let published = retry(
            &self.settings.publish_retry,
            "publish",
            PublishError::is_transient,
            move || {
                bounded(limit, publisher.publish(artifact, source.category()), || {
                    PublishError::Timeout("publish")
                })
            },
        )
        .await;

        let msg = match &published {
            Ok(destination) => {
                self.sink.emit(HarvestEvent::Published {
                    locator,
                    destination: destination.clone(),
                });
                Msg::PublishSucceeded
            }
            Err(err) => {
                self.sink.emit(HarvestEvent::PublishFailed {
                    locator,
                    error: err.to_string(),
                });
                Msg::PublishFailed
            }
        };
        result.publication = Some(published);
        msg
    }

    async fn reindex(&self, tally: &RunTally) -> ReindexOutcome {
        let Some(publisher) = self.publisher else {
            self.sink.emit(HarvestEvent::ReindexSkipped {
                reason: "publishing disabled",
            });
            return ReindexOutcome::Disabled;
        };
        if !publisher.reindex_enabled() {
            self.sink.emit(HarvestEvent::ReindexSkipped {
                reason: "no reindex endpoint",
            });
            return ReindexOutcome::Disabled;
        }
        if !tally.should_notify_reindex() {
            self.sink.emit(HarvestEvent::ReindexSkipped {
                reason: "no artifacts written",
            });
            return ReindexOutcome::NothingWritten;
        }

        match bounded(
            self.settings.stage_timeout,
            publisher.notify_reindex(),
            || PublishError::Timeout("reindex"),
        )
        .await
        {
            Ok(()) => {
                self.sink.emit(HarvestEvent::ReindexRequested);
                ReindexOutcome::Sent
            }
            Err(err) => {
                self.sink.emit(HarvestEvent::ReindexFailed {
                    error: err.to_string(),
                });
                ReindexOutcome::Failed(err)
            }
        }
    }
}
