use crate::{ContentKind, Effect, Msg, SourceState, Stage, SummaryStatus};

/// Pure update function: applies a stage outcome and returns the next effect.
///
/// `None` means the source reached a terminal stage. A message that does not
/// apply to the current stage leaves the state untouched and yields `None`.
pub fn update(mut state: SourceState, msg: Msg) -> (SourceState, Option<Effect>) {
    let effect = match (state.stage(), msg) {
        (Stage::Pending, Msg::FetchSucceeded) => {
            state.mark_fetched();
            if state.plan().summarize {
                state.set_stage(Stage::Fetched);
                Some(Effect::Summarize)
            } else {
                state.set_stage(Stage::SummarySkipped);
                state.set_summary(SummaryStatus::Skipped);
                Some(Effect::Write(ContentKind::Raw))
            }
        }
        (Stage::Pending, Msg::FetchFailed) => {
            state.set_stage(Stage::FetchFailed);
            None
        }
        (Stage::Fetched, Msg::SummarySucceeded) => {
            state.set_stage(Stage::Summarized);
            state.set_summary(SummaryStatus::Summarized);
            Some(Effect::Write(ContentKind::Summary))
        }
        (Stage::Fetched, Msg::SummaryFailed) => {
            state.set_stage(Stage::SummaryFallback);
            state.set_summary(SummaryStatus::Fallback);
            Some(Effect::Write(ContentKind::Raw))
        }
        (
            Stage::Summarized | Stage::SummaryFallback | Stage::SummarySkipped,
            Msg::WriteSucceeded,
        ) => {
            state.set_stage(Stage::Written);
            state.mark_written();
            state.plan().publish.then_some(Effect::Publish)
        }
        (Stage::Summarized | Stage::SummaryFallback | Stage::SummarySkipped, Msg::WriteFailed) => {
            state.set_stage(Stage::WriteFailed);
            None
        }
        (Stage::Written, Msg::PublishSucceeded) if state.plan().publish => {
            state.set_stage(Stage::Published);
            None
        }
        (Stage::Written, Msg::PublishFailed) if state.plan().publish => {
            state.set_stage(Stage::PublishFailed);
            None
        }
        _ => None,
    };
    (state, effect)
}
