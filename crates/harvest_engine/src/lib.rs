//! Harvest engine: fetch, summarize, persist and publish adapters, plus the run orchestrator.
mod events;
mod fetch;
mod filename;
mod firecrawl;
mod page;
mod persist;
mod publish;
mod reddit;
mod retry;
mod run;
mod summarize;
mod types;

pub use events::{HarvestEvent, LoggingSink, ProgressSink};
pub use fetch::{
    empty_content_placeholder, ContentFetcher, FetchSettings, PageFetcher, SourceFetcher,
    DEFAULT_USER_AGENT,
};
pub use filename::{artifact_filename, artifact_stem};
pub use firecrawl::{FirecrawlFetcher, FirecrawlSettings, DEFAULT_FIRECRAWL_URL};
pub use page::{page_to_text, DecodeError, PageText};
pub use persist::{ensure_output_dir, ArtifactWriter, AtomicFileWriter};
pub use publish::{
    CategoryDirs, ContainerPublisher, ContainerSettings, DirectoryPublisher, Publisher,
    ReindexNotifier, DEFAULT_REINDEX_URL,
};
pub use reddit::{RedditFetcher, RedditSettings, DEFAULT_REDDIT_URL, REDDIT_USER_AGENT};
pub use retry::{retry, RetryPolicy};
pub use run::{HarvestRun, RunSettings};
pub use summarize::{
    truncate_chars, ChatSummarizer, Summarizer, SummarizerSettings, DEFAULT_MAX_INPUT_CHARS,
    DEFAULT_SUMMARIZER_MODEL, DEFAULT_SUMMARIZER_URL,
};
pub use types::{
    FailureKind, FetchError, HarvestResult, PublishError, ReindexOutcome, RunReport,
    SummaryError, SummaryOutcome, WriteError,
};
