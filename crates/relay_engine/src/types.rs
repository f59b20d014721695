use relay_core::{ErrorCounters, ErrorKind, JobPhase, JobState, RequestError};
use thiserror::Error;

pub type JobId = u64;

/// Provider acknowledgement of one created comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub target: String,
    /// Identifier of the created comment, when the provider returned one.
    pub comment_id: Option<String>,
}

/// A classified failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct PostFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub transport: bool,
}

impl PostFailure {
    pub fn provider(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            transport: false,
        }
    }

    /// The provider could not be reached or its reply could not be read.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: message.into(),
            transport: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("invalid request: a job is already running")]
    AlreadyRunning,
}

/// Final tally of a finished or stopped job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub job_id: JobId,
    pub phase: JobPhase,
    pub attempts: u32,
    pub successes: u32,
    pub counters: ErrorCounters,
    pub unresolved_links: usize,
}

impl RunReport {
    pub(crate) fn from_state(job_id: JobId, state: &JobState) -> Self {
        Self {
            job_id,
            phase: state.phase(),
            attempts: state.attempts(),
            successes: state.successes(),
            counters: state.counters(),
            unresolved_links: state.unresolved_links(),
        }
    }
}
