use std::time::Duration;

use crate::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Runner accepted a job and is about to post the first comment.
    Started {
        targets: usize,
        comments: usize,
        delay: Duration,
        unresolved: Vec<String>,
    },
    /// The provider accepted one comment.
    AttemptSucceeded { target: String, comment: String },
    /// One attempt failed and was classified.
    AttemptFailed {
        target: String,
        kind: ErrorKind,
        message: String,
        /// The provider was never reached (connect error, timeout, unreadable body).
        transport: bool,
    },
    /// The stop signal was seen between attempts.
    StopObserved,
    /// Every (target, comment) pair has been attempted.
    Exhausted,
}
