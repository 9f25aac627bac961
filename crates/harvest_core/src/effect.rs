/// Which text ends up in the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// The condensed text returned by the summarizer.
    Summary,
    /// The fetched text, unchanged.
    Raw,
}

/// Next stage the engine must run for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Fetch,
    Summarize,
    Write(ContentKind),
    Publish,
}
