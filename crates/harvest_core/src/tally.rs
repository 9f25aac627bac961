use std::fmt;

use crate::{SourceState, SummaryStatus};

/// Advisory per-run counters for operator review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub sources: usize,
    pub fetched: usize,
    pub summarized: usize,
    pub raw_fallback: usize,
    pub summary_skipped: usize,
    pub written: usize,
    pub published: usize,
    pub failed: usize,
}

impl RunTally {
    pub fn from_states<'a>(states: impl IntoIterator<Item = &'a SourceState>) -> Self {
        let mut tally = Self::default();
        for state in states {
            tally.record(state);
        }
        tally
    }

    pub fn record(&mut self, state: &SourceState) {
        self.sources += 1;
        self.fetched += usize::from(state.fetched());
        match state.summary() {
            Some(SummaryStatus::Summarized) => self.summarized += 1,
            Some(SummaryStatus::Fallback) => self.raw_fallback += 1,
            Some(SummaryStatus::Skipped) => self.summary_skipped += 1,
            None => {}
        }
        self.written += usize::from(state.written());
        self.published += usize::from(state.published());
        self.failed += usize::from(state.failed());
    }

    /// Reindex is only worth requesting when something new landed on disk.
    pub fn should_notify_reindex(&self) -> bool {
        self.written > 0
    }
}

impl fmt::Display for RunTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sources={} fetched={} summarized={} raw_fallback={} summary_skipped={} written={} published={} failed={}",
            self.sources,
            self.fetched,
            self.summarized,
            self.raw_fallback,
            self.summary_skipped,
            self.written,
            self.published,
            self.failed
        )
    }
}
