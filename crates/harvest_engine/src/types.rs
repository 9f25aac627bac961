use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use harvest_core::{RunTally, Source, SourceState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidLocator,
    MissingCredential,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    Backend,
    MalformedResponse,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidLocator => write!(f, "invalid locator"),
            FailureKind::MissingCredential => write!(f, "missing credential"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Backend => write!(f, "backend error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A source could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fetching {locator} failed ({kind}): {message}")]
pub struct FetchError {
    pub locator: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(locator: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            kind,
            message: message.into(),
        }
    }

    /// Network hiccups, timeouts, throttling and server errors may succeed on a retry.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            FailureKind::Network | FailureKind::Timeout => true,
            FailureKind::HttpStatus(code) => code == 429 || (500..=599).contains(&code),
            _ => false,
        }
    }
}

/// Summarization failed; the pipeline falls back to the raw text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("summarizer api key is not configured")]
    MissingCredential,
    #[error("summarizer returned http status {0}")]
    HttpStatus(u16),
    #[error("summarizer timed out")]
    Timeout,
    #[error("summarizer request failed: {0}")]
    Network(String),
    #[error("summarizer response malformed: {0}")]
    Malformed(String),
    #[error("summarizer returned empty content")]
    Empty,
}

/// An artifact could not be written locally.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// An artifact could not be handed to the downstream store, or reindex failed.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to create {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("reindex request failed: {0}")]
    Reindex(String),
    #[error("{0} timed out")]
    Timeout(&'static str),
}

impl PublishError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PublishError::Command { .. } | PublishError::Timeout(_))
    }
}

/// What went into the artifact for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The source never got past fetching.
    NotAttempted,
    Skipped,
    Summarized(String),
    Fallback(SummaryError),
}

/// Per-source outcome; logged and reported, never persisted.
#[derive(Debug)]
pub struct HarvestResult {
    pub source: Source,
    pub state: SourceState,
    pub raw: Option<Result<String, FetchError>>,
    pub summary: SummaryOutcome,
    pub artifact: Option<Result<PathBuf, WriteError>>,
    pub publication: Option<Result<String, PublishError>>,
}

impl HarvestResult {
    pub(crate) fn new(source: Source, state: SourceState) -> Self {
        Self {
            source,
            state,
            raw: None,
            summary: SummaryOutcome::NotAttempted,
            artifact: None,
            publication: None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match &self.raw {
            Some(Ok(text)) => Some(text),
            _ => None,
        }
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        match &self.artifact {
            Some(Ok(path)) => Some(path),
            _ => None,
        }
    }

    pub fn published(&self) -> bool {
        matches!(self.publication, Some(Ok(_)))
    }
}

/// End-of-run reindex handshake.
#[derive(Debug)]
pub enum ReindexOutcome {
    /// No publisher, or no reindex endpoint, configured for this run.
    Disabled,
    /// Nothing was written, so nothing was requested.
    NothingWritten,
    Sent,
    Failed(PublishError),
}

#[derive(Debug)]
pub struct RunReport {
    pub date: NaiveDate,
    pub results: Vec<HarvestResult>,
    pub tally: RunTally,
    pub reindex: ReindexOutcome,
}

impl RunReport {
    pub fn reindex_failed(&self) -> bool {
        matches!(self.reindex, ReindexOutcome::Failed(_))
    }
}
