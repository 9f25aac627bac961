/// What the pipeline should do for one source, fixed before the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePlan {
    pub summarize: bool,
    pub publish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Fetched,
    FetchFailed,
    Summarized,
    SummaryFallback,
    SummarySkipped,
    Written,
    WriteFailed,
    Published,
    PublishFailed,
}

/// How the artifact content was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatus {
    Summarized,
    Fallback,
    Skipped,
}

/// Per-source pipeline state. Advanced only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceState {
    plan: SourcePlan,
    stage: Stage,
    summary: Option<SummaryStatus>,
    fetched: bool,
    written: bool,
}

impl SourceState {
    /// A fresh source in [`Stage::Pending`]; the first effect is always a fetch.
    pub fn new(plan: SourcePlan) -> Self {
        Self {
            plan,
            stage: Stage::Pending,
            summary: None,
            fetched: false,
            written: false,
        }
    }

    pub fn plan(&self) -> SourcePlan {
        self.plan
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn summary(&self) -> Option<SummaryStatus> {
        self.summary
    }

    pub fn fetched(&self) -> bool {
        self.fetched
    }

    pub fn written(&self) -> bool {
        self.written
    }

    pub fn published(&self) -> bool {
        self.stage == Stage::Published
    }

    /// True when any stage ended in failure.
    pub fn failed(&self) -> bool {
        matches!(
            self.stage,
            Stage::FetchFailed | Stage::WriteFailed | Stage::PublishFailed
        )
    }

    pub fn is_terminal(&self) -> bool {
        match self.stage {
            Stage::FetchFailed | Stage::WriteFailed | Stage::Published | Stage::PublishFailed => {
                true
            }
            Stage::Written => !self.plan.publish,
            Stage::Pending
            | Stage::Fetched
            | Stage::Summarized
            | Stage::SummaryFallback
            | Stage::SummarySkipped => false,
        }
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub(crate) fn set_summary(&mut self, status: SummaryStatus) {
        self.summary = Some(status);
    }

    pub(crate) fn mark_fetched(&mut self) {
        self.fetched = true;
    }

    pub(crate) fn mark_written(&mut self) {
        self.written = true;
    }
}
