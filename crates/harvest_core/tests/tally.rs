use harvest_core::{update, Msg, RunTally, SourcePlan, SourceState};

fn finished(plan: SourcePlan, msgs: &[Msg]) -> SourceState {
    msgs.iter()
        .fold(SourceState::new(plan), |state, msg| update(state, *msg).0)
}

#[test]
fn tally_counts_each_outcome_once() {
    let plan = SourcePlan {
        summarize: true,
        publish: true,
    };
    let states = vec![
        finished(
            plan,
            &[
                Msg::FetchSucceeded,
                Msg::SummarySucceeded,
                Msg::WriteSucceeded,
                Msg::PublishSucceeded,
            ],
        ),
        finished(
            plan,
            &[
                Msg::FetchSucceeded,
                Msg::SummaryFailed,
                Msg::WriteSucceeded,
                Msg::PublishFailed,
            ],
        ),
        finished(plan, &[Msg::FetchFailed]),
    ];

    let tally = RunTally::from_states(&states);
    assert_eq!(
        tally,
        RunTally {
            sources: 3,
            fetched: 2,
            summarized: 1,
            raw_fallback: 1,
            summary_skipped: 0,
            written: 2,
            published: 1,
            failed: 2,
        }
    );
    assert!(tally.should_notify_reindex());
}

#[test]
fn no_reindex_without_written_artifacts() {
    let plan = SourcePlan {
        summarize: false,
        publish: true,
    };
    let states = vec![
        finished(plan, &[Msg::FetchFailed]),
        finished(plan, &[Msg::FetchSucceeded, Msg::WriteFailed]),
    ];

    let tally = RunTally::from_states(&states);
    assert_eq!(tally.written, 0);
    assert_eq!(tally.summary_skipped, 1);
    assert!(!tally.should_notify_reindex());
    assert_eq!(
        tally.to_string(),
        "sources=2 fetched=1 summarized=0 raw_fallback=0 summary_skipped=1 written=0 published=0 failed=2"
    );
}
