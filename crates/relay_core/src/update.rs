use crate::{JobPhase, JobState, Msg, ProgressEvent};

/// Pure update function: applies a message to the job tally and returns the
/// progress events it produces.
pub fn update(mut state: JobState, msg: Msg) -> (JobState, Vec<ProgressEvent>) {
    let running = state.phase() == JobPhase::Running;
    let events = match msg {
        Msg::Started {
            targets,
            comments,
            delay,
            unresolved,
        } => {
            if state.phase() != JobPhase::Idle {
                return (state, Vec::new());
            }
            state.begin(targets * comments, unresolved.len());
            let mut events = Vec::with_capacity(1 + unresolved.len());
            events.push(ProgressEvent::info(format!(
                "Starting: {targets} post(s) x {comments} comment(s), {:.1}s delay",
                delay.as_secs_f64()
            )));
            for link in unresolved {
                events.push(ProgressEvent::warn(format!(
                    "Could not resolve a post id from link: {link}"
                )));
            }
            events
        }
        Msg::AttemptSucceeded { target, comment } if running => {
            state.record_success();
            vec![ProgressEvent::success(format!(
                "Commented on {target}: {comment}"
            ))]
        }
        Msg::AttemptFailed {
            target,
            kind,
            message,
            transport,
        } if running => {
            state.record_failure(kind);
            if transport {
                vec![ProgressEvent::warn(format!(
                    "{target}: network error ({kind}): {message}"
                ))]
            } else {
                vec![ProgressEvent::error(format!("{target}: {kind}: {message}"))]
            }
        }
        Msg::StopObserved if running => {
            state.set_phase(JobPhase::Stopped);
            vec![ProgressEvent::info(format!(
                "Stopped after {} of {} attempt(s)",
                state.attempts(),
                state.planned()
            ))]
        }
        Msg::Exhausted if running => {
            state.set_phase(JobPhase::Completed);
            let counters = state.counters();
            vec![ProgressEvent::Summary {
                text: format!(
                    "Finished: {} succeeded, {} failed",
                    state.successes(),
                    counters.total()
                ),
                counters,
                unresolved_links: state.unresolved_links(),
            }]
        }
        Msg::AttemptSucceeded { .. }
        | Msg::AttemptFailed { .. }
        | Msg::StopObserved
        | Msg::Exhausted => Vec::new(),
    };

    (state, events)
}
