/// Outcome of one stage, reported back by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    FetchSucceeded,
    FetchFailed,
    /// Summarizer returned non-empty text.
    SummarySucceeded,
    /// Summarizer failed or returned nothing; the raw text is used instead.
    SummaryFailed,
    WriteSucceeded,
    WriteFailed,
    PublishSucceeded,
    PublishFailed,
}
