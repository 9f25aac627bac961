use std::sync::Once;

use harvest_core::{update, ContentKind, Effect, Msg, SourcePlan, SourceState, Stage, SummaryStatus};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(harvest_logging::initialize_for_tests);
}

const FULL: SourcePlan = SourcePlan {
    summarize: true,
    publish: true,
};

/// Feed `msgs` in order, collecting every effect the state machine asked for.
fn drive(plan: SourcePlan, msgs: &[Msg]) -> (SourceState, Vec<Effect>) {
    let mut state = SourceState::new(plan);
    let mut effects = Vec::new();
    for msg in msgs {
        let (next, effect) = update(state, *msg);
        state = next;
        effects.extend(effect);
    }
    (state, effects)
}

#[test]
fn happy_path_summarizes_writes_and_publishes() {
    init_logging();
    let (state, effects) = drive(
        FULL,
        &[
            Msg::FetchSucceeded,
            Msg::SummarySucceeded,
            Msg::WriteSucceeded,
            Msg::PublishSucceeded,
        ],
    );

    assert_eq!(
        effects,
        vec![
            Effect::Summarize,
            Effect::Write(ContentKind::Summary),
            Effect::Publish,
        ]
    );
    assert_eq!(state.stage(), Stage::Published);
    assert_eq!(state.summary(), Some(SummaryStatus::Summarized));
    assert!(state.is_terminal());
    assert!(!state.failed());
}

#[test]
fn summary_failure_falls_back_to_raw_content() {
    init_logging();
    let (state, effects) = drive(FULL, &[Msg::FetchSucceeded, Msg::SummaryFailed]);

    assert_eq!(effects, vec![Effect::Summarize, Effect::Write(ContentKind::Raw)]);
    assert_eq!(state.stage(), Stage::SummaryFallback);
    assert_eq!(state.summary(), Some(SummaryStatus::Fallback));
    assert!(!state.is_terminal());
}

#[test]
fn scrape_only_plan_skips_summary() {
    init_logging();
    let plan = SourcePlan {
        summarize: false,
        publish: true,
    };
    let (state, effects) = drive(plan, &[Msg::FetchSucceeded]);

    assert_eq!(effects, vec![Effect::Write(ContentKind::Raw)]);
    assert_eq!(state.stage(), Stage::SummarySkipped);
    assert_eq!(state.summary(), Some(SummaryStatus::Skipped));
}

#[test]
fn fetch_failure_is_terminal() {
    init_logging();
    let (state, effects) = drive(FULL, &[Msg::FetchFailed]);

    assert!(effects.is_empty());
    assert_eq!(state.stage(), Stage::FetchFailed);
    assert!(state.is_terminal());
    assert!(state.failed());
    assert!(!state.fetched());
}

#[test]
fn write_failure_stops_before_publish() {
    init_logging();
    let (state, effects) = drive(
        FULL,
        &[Msg::FetchSucceeded, Msg::SummaryFailed, Msg::WriteFailed],
    );

    assert_eq!(effects, vec![Effect::Summarize, Effect::Write(ContentKind::Raw)]);
    assert_eq!(state.stage(), Stage::WriteFailed);
    assert!(state.is_terminal());
    assert!(!state.written());
}

#[test]
fn written_is_terminal_when_publishing_disabled() {
    init_logging();
    let plan = SourcePlan {
        summarize: false,
        publish: false,
    };
    let (state, effects) = drive(plan, &[Msg::FetchSucceeded, Msg::WriteSucceeded]);

    assert_eq!(effects, vec![Effect::Write(ContentKind::Raw)]);
    assert_eq!(state.stage(), Stage::Written);
    assert!(state.is_terminal());
    assert!(state.written());
}

#[test]
fn publish_failure_keeps_written_flag() {
    init_logging();
    let (state, _) = drive(
        FULL,
        &[
            Msg::FetchSucceeded,
            Msg::SummarySucceeded,
            Msg::WriteSucceeded,
            Msg::PublishFailed,
        ],
    );

    assert_eq!(state.stage(), Stage::PublishFailed);
    assert!(state.written());
    assert!(!state.published());
    assert!(state.failed());
}

#[test]
fn out_of_order_message_is_ignored() {
    init_logging();
    let state = SourceState::new(FULL);
    let (next, effect) = update(state.clone(), Msg::WriteSucceeded);

    assert_eq!(next, state);
    assert_eq!(effect, None);
}
