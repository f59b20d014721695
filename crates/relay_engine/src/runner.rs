use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use relay_core::{update, JobPhase, JobRequest, JobState, Msg, StartForm};
use tokio::task::{JoinError, JoinHandle};

use crate::{ExternalPoster, JobControl, JobId, JobPermit, ProgressSink, RunReport, StartError};

/// Starts jobs in the background and routes stop requests to them.
#[derive(Clone)]
pub struct JobRunner {
    poster: Arc<dyn ExternalPoster>,
    sink: Arc<dyn ProgressSink>,
    control: Arc<JobControl>,
}

/// Handle to a started job. Dropping it leaves the job running.
#[derive(Debug)]
pub struct JobTicket {
    id: JobId,
    handle: JoinHandle<RunReport>,
}

impl JobTicket {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub async fn wait(self) -> Result<RunReport, JoinError> {
        self.handle.await
    }
}

impl JobRunner {
    pub fn new(
        poster: Arc<dyn ExternalPoster>,
        sink: Arc<dyn ProgressSink>,
        control: Arc<JobControl>,
    ) -> Self {
        Self {
            poster,
            sink,
            control,
        }
    }

    pub fn control(&self) -> &Arc<JobControl> {
        &self.control
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    /// Validate raw intake fields, then [`JobRunner::start`].
    pub fn start_form(&self, form: StartForm) -> Result<JobTicket, StartError> {
        let request = JobRequest::from_form(form)?;
        self.start(request)
    }

    /// Spawn the job on the current tokio runtime and return immediately.
    pub fn start(&self, request: JobRequest) -> Result<JobTicket, StartError> {
        let permit = self
            .control
            .try_acquire()
            .ok_or(StartError::AlreadyRunning)?;
        let id = permit.id();
        engine_info!(
            "Job {} starting: {} target(s) x {} comment(s), delay {:?}",
            id,
            request.targets.len(),
            request.comments.len(),
            request.delay
        );

        let poster = Arc::clone(&self.poster);
        let sink = Arc::clone(&self.sink);
        let handle = tokio::spawn(async move {
            run_job(poster.as_ref(), sink.as_ref(), request, permit).await
        });
        Ok(JobTicket { id, handle })
    }

    /// Signal the running job to stop before its next attempt.
    /// Always succeeds; returns whether a job was running.
    pub fn stop(&self) -> bool {
        let signalled = self.control.stop();
        if signalled {
            engine_info!("Stop requested for job {:?}", self.control.current_job());
        } else {
            engine_debug!("Stop requested with no job running");
        }
        signalled
    }
}

/// Post every comment to every target, target-major, pausing `request.delay`
/// between attempts. The stop signal is checked before each attempt; an
/// attempt already in flight is allowed to finish.
pub async fn run_job(
    poster: &dyn ExternalPoster,
    sink: &dyn ProgressSink,
    request: JobRequest,
    permit: JobPermit,
) -> RunReport {
    let cancel = permit.cancel_token().clone();
    let mut state = JobState::new();
    apply(
        &mut state,
        sink,
        Msg::Started {
            targets: request.targets.len(),
            comments: request.comments.len(),
            delay: request.delay,
            unresolved: request.unresolved.clone(),
        },
    );

    let mut first_attempt = true;
    'targets: for target in request.targets.iter() {
        for comment in request.comments.iter() {
            if !first_attempt && !request.delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(request.delay) => {}
                }
            }
            first_attempt = false;

            if cancel.is_cancelled() {
                apply(&mut state, sink, Msg::StopObserved);
                break 'targets;
            }

            let msg = match poster.post(target, comment, &request.credential).await {
                Ok(receipt) => {
                    engine_debug!(
                        "Job {} posted to {} (comment id {:?})",
                        permit.id(),
                        target,
                        receipt.comment_id
                    );
                    Msg::AttemptSucceeded {
                        target: target.to_string(),
                        comment: comment.to_string(),
                    }
                }
                Err(failure) => {
                    engine_warn!(
                        "Job {} attempt on {} failed: {} (transport: {})",
                        permit.id(),
                        target,
                        failure,
                        failure.transport
                    );
                    Msg::AttemptFailed {
                        target: target.to_string(),
                        kind: failure.kind,
                        message: failure.message,
                        transport: failure.transport,
                    }
                }
            };
            apply(&mut state, sink, msg);
        }
    }

    if state.phase() == JobPhase::Running {
        apply(&mut state, sink, Msg::Exhausted);
    }

    let report = RunReport::from_state(permit.id(), &state);
    engine_info!(
        "Job {} {:?}: {} attempt(s), {} succeeded, counters {:?}",
        report.job_id,
        report.phase,
        report.attempts,
        report.successes,
        report.counters
    );
    permit.release();
    report
}

fn apply(state: &mut JobState, sink: &dyn ProgressSink, msg: Msg) {
    let (next, events) = update(std::mem::take(state), msg);
    *state = next;
    for event in events {
        sink.emit(event);
    }
}
