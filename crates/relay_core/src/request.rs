use std::time::Duration;

use thiserror::Error;

use crate::{CommentBatch, TargetList};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("comment file contains no comments")]
    EmptyBatch,
    #[error("no usable post ids")]
    EmptyTargets,
}

/// Raw start fields as submitted by the intake layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartForm {
    pub credential: Option<String>,
    pub targets: Option<String>,
    pub delay: Option<String>,
    pub comments_text: Option<String>,
}

/// A validated job submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub credential: String,
    pub comments: CommentBatch,
    pub targets: TargetList,
    pub delay: Duration,
    /// Link entries dropped because no post id could be extracted.
    pub unresolved: Vec<String>,
}

impl JobRequest {
    pub fn from_form(form: StartForm) -> Result<Self, RequestError> {
        let credential = form
            .credential
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RequestError::InvalidRequest("missing credential".into()))?;
        let raw_targets = form
            .targets
            .ok_or_else(|| RequestError::InvalidRequest("missing post ids".into()))?;
        let raw_delay = form
            .delay
            .ok_or_else(|| RequestError::InvalidRequest("missing delay".into()))?;
        let comments_text = form
            .comments_text
            .ok_or_else(|| RequestError::InvalidRequest("missing comment file".into()))?;

        let delay = parse_delay(&raw_delay)?;
        let comments = CommentBatch::parse(&comments_text)?;
        let resolved = TargetList::parse(&raw_targets)?.resolve()?;

        Ok(Self {
            credential,
            comments,
            targets: resolved.targets,
            delay,
            unresolved: resolved.unresolved,
        })
    }

    /// Total number of attempts the job will make if not stopped.
    pub fn planned_attempts(&self) -> usize {
        self.targets.len() * self.comments.len()
    }
}

/// Parse a delay in (possibly fractional) seconds.
pub(crate) fn parse_delay(raw: &str) -> Result<Duration, RequestError> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidRequest(format!("delay is not a number: {raw:?}")))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| RequestError::InvalidRequest(format!("delay must be >= 0, got {raw:?}")))
}
