use serde::{Deserialize, Serialize};

use crate::ErrorKind;

/// Per-kind failure counts for one job. All start at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCounters {
    #[serde(rename = "INVALID_TOKEN")]
    pub invalid_token: u32,
    #[serde(rename = "WRONG_POST_ID")]
    pub wrong_post_id: u32,
    #[serde(rename = "NO_PERMISSION")]
    pub no_permission: u32,
    #[serde(rename = "COMMENT_BLOCKED")]
    pub comment_blocked: u32,
    #[serde(rename = "ID_LOCKED")]
    pub id_locked: u32,
    #[serde(rename = "UNKNOWN")]
    pub unknown: u32,
}

impl ErrorCounters {
    pub fn increment(&mut self, kind: ErrorKind) {
        *self.slot_mut(kind) += 1;
    }

    pub fn get(&self, kind: ErrorKind) -> u32 {
        match kind {
            ErrorKind::InvalidToken => self.invalid_token,
            ErrorKind::WrongPostId => self.wrong_post_id,
            ErrorKind::NoPermission => self.no_permission,
            ErrorKind::CommentBlocked => self.comment_blocked,
            ErrorKind::IdLocked => self.id_locked,
            ErrorKind::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> u32 {
        ErrorKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }

    fn slot_mut(&mut self, kind: ErrorKind) -> &mut u32 {
        match kind {
            ErrorKind::InvalidToken => &mut self.invalid_token,
            ErrorKind::WrongPostId => &mut self.wrong_post_id,
            ErrorKind::NoPermission => &mut self.no_permission,
            ErrorKind::CommentBlocked => &mut self.comment_blocked,
            ErrorKind::IdLocked => &mut self.id_locked,
            ErrorKind::Unknown => &mut self.unknown,
        }
    }
}

/// One observer-facing status update emitted while a job runs.
///
/// Serializes to `{"type": ..., "text": ...}`; the summary variant also
/// carries `counters` and `unresolvedLinks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    Info {
        text: String,
    },
    Success {
        text: String,
    },
    Warn {
        text: String,
    },
    Error {
        text: String,
    },
    Summary {
        text: String,
        counters: ErrorCounters,
        #[serde(rename = "unresolvedLinks")]
        unresolved_links: usize,
    },
}

impl ProgressEvent {
    pub fn info(text: impl Into<String>) -> Self {
        ProgressEvent::Info { text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        ProgressEvent::Success { text: text.into() }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        ProgressEvent::Warn { text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ProgressEvent::Error { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            ProgressEvent::Info { text }
            | ProgressEvent::Success { text }
            | ProgressEvent::Warn { text }
            | ProgressEvent::Error { text }
            | ProgressEvent::Summary { text, .. } => text,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, ProgressEvent::Summary { .. })
    }
}
