use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use relay_core::{update, ErrorCounters, ErrorKind, JobPhase, JobState, Msg, ProgressEvent};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn started(targets: usize, comments: usize) -> JobState {
    let (state, _) = update(
        JobState::new(),
        Msg::Started {
            targets,
            comments,
            delay: Duration::ZERO,
            unresolved: Vec::new(),
        },
    );
    state
}

fn failed(target: &str, kind: ErrorKind) -> Msg {
    Msg::AttemptFailed {
        target: target.to_string(),
        kind,
        message: "boom".to_string(),
        transport: false,
    }
}

#[test]
fn start_moves_idle_to_running_and_reports_unresolved_links() {
    init_logging();
    let (state, events) = update(
        JobState::new(),
        Msg::Started {
            targets: 2,
            comments: 3,
            delay: Duration::from_millis(1500),
            unresolved: vec!["https://example.com/x".to_string()],
        },
    );

    assert_eq!(state.phase(), JobPhase::Running);
    assert_eq!(state.planned(), 6);
    assert_eq!(state.unresolved_links(), 1);
    assert_eq!(
        events,
        vec![
            ProgressEvent::info("Starting: 2 post(s) x 3 comment(s), 1.5s delay"),
            ProgressEvent::warn("Could not resolve a post id from link: https://example.com/x"),
        ]
    );
}

#[test]
fn every_failure_increments_exactly_one_counter() {
    init_logging();
    let (state, events) = update(started(1, 2), failed("T1", ErrorKind::InvalidToken));
    assert_eq!(events, vec![ProgressEvent::error("T1: INVALID_TOKEN: boom")]);
    let (state, _) = update(state, failed("T1", ErrorKind::InvalidToken));

    assert_eq!(state.counters().invalid_token, 2);
    assert_eq!(state.counters().total(), 2);
    assert_eq!(state.attempts(), 2);
    assert_eq!(state.successes(), 0);
}

#[test]
fn transport_failures_warn_and_count_as_unknown() {
    init_logging();
    let (state, events) = update(
        started(1, 1),
        Msg::AttemptFailed {
            target: "T1".to_string(),
            kind: ErrorKind::Unknown,
            message: "connection refused".to_string(),
            transport: true,
        },
    );
    assert_eq!(
        events,
        vec![ProgressEvent::warn("T1: network error (UNKNOWN): connection refused")]
    );
    assert_eq!(state.counters().get(ErrorKind::Unknown), 1);
}

#[test]
fn exhaustion_emits_summary_with_counters() {
    init_logging();
    let state = started(1, 2);
    let (state, _) = update(
        state,
        Msg::AttemptSucceeded {
            target: "T1".to_string(),
            comment: "a".to_string(),
        },
    );
    let (state, _) = update(state, failed("T1", ErrorKind::WrongPostId));
    let (state, events) = update(state, Msg::Exhausted);

    let mut expected = ErrorCounters::default();
    expected.increment(ErrorKind::WrongPostId);
    assert_eq!(state.phase(), JobPhase::Completed);
    assert_eq!(
        events,
        vec![ProgressEvent::Summary {
            text: "Finished: 1 succeeded, 1 failed".to_string(),
            counters: expected,
            unresolved_links: 0,
        }]
    );
    assert_eq!(
        state.successes() as usize + state.counters().total() as usize,
        state.planned()
    );
}

#[test]
fn stop_moves_running_to_stopped() {
    init_logging();
    let (state, _) = update(started(2, 2), failed("T1", ErrorKind::Unknown));
    let (state, events) = update(state, Msg::StopObserved);

    assert_eq!(state.phase(), JobPhase::Stopped);
    assert_eq!(events, vec![ProgressEvent::info("Stopped after 1 of 4 attempt(s)")]);
}

#[test]
fn messages_outside_a_running_job_are_ignored() {
    init_logging();
    let idle = JobState::new();
    for msg in [
        Msg::StopObserved,
        Msg::Exhausted,
        failed("T1", ErrorKind::Unknown),
    ] {
        let (next, events) = update(idle.clone(), msg);
        assert_eq!(next, idle);
        assert!(events.is_empty());
    }

    let (stopped, _) = update(started(1, 1), Msg::StopObserved);
    let (after, events) = update(stopped.clone(), Msg::Exhausted);
    assert_eq!(after, stopped);
    assert!(events.is_empty());
}

#[test]
fn second_start_is_ignored_until_reset() {
    init_logging();
    let state = started(1, 1);
    let (state, events) = update(
        state,
        Msg::Started {
            targets: 5,
            comments: 5,
            delay: Duration::ZERO,
            unresolved: Vec::new(),
        },
    );
    assert!(events.is_empty());
    assert_eq!(state.planned(), 1);

    let (mut state, _) = update(state, Msg::Exhausted);
    state.reset();
    assert_eq!(state, JobState::new());
}

#[test]
fn summary_serializes_to_feed_payload() {
    let mut counters = ErrorCounters::default();
    counters.increment(ErrorKind::InvalidToken);
    counters.increment(ErrorKind::InvalidToken);
    let event = ProgressEvent::Summary {
        text: "done".to_string(),
        counters,
        unresolved_links: 3,
    };

    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "type": "summary",
            "text": "done",
            "counters": {
                "INVALID_TOKEN": 2,
                "WRONG_POST_ID": 0,
                "NO_PERMISSION": 0,
                "COMMENT_BLOCKED": 0,
                "ID_LOCKED": 0,
                "UNKNOWN": 0
            },
            "unresolvedLinks": 3
        })
    );
    assert_eq!(
        serde_json::to_value(ProgressEvent::warn("careful")).unwrap(),
        serde_json::json!({"type": "warn", "text": "careful"})
    );
}
