use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification label for a failed posting attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidToken,
    WrongPostId,
    NoPermission,
    CommentBlocked,
    IdLocked,
    Unknown,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::InvalidToken,
        ErrorKind::WrongPostId,
        ErrorKind::NoPermission,
        ErrorKind::CommentBlocked,
        ErrorKind::IdLocked,
        ErrorKind::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::InvalidToken => "INVALID_TOKEN",
            ErrorKind::WrongPostId => "WRONG_POST_ID",
            ErrorKind::NoPermission => "NO_PERMISSION",
            ErrorKind::CommentBlocked => "COMMENT_BLOCKED",
            ErrorKind::IdLocked => "ID_LOCKED",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The `error` object of a provider error response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, rename = "error_subcode")]
    pub subcode: Option<i64>,
}

impl ProviderError {
    fn message_mentions(&self, needle: &str) -> bool {
        self.message.to_ascii_lowercase().contains(needle)
    }

    fn code_is(&self, codes: &[i64]) -> bool {
        self.code.is_some_and(|code| codes.contains(&code))
    }

    fn subcode_is(&self, codes: &[i64]) -> bool {
        self.subcode.is_some_and(|code| codes.contains(&code))
    }
}

type Rule = (fn(&ProviderError) -> bool, ErrorKind);

// First match wins.
const RULES: [Rule; 5] = [
    (
        |e| e.code_is(&[190]) || e.subcode_is(&[463, 467]) || e.message_mentions("access token"),
        ErrorKind::InvalidToken,
    ),
    (
        |e| e.code_is(&[368]) || e.message_mentions("blocked") || e.message_mentions("spam"),
        ErrorKind::CommentBlocked,
    ),
    (
        |e| {
            e.subcode_is(&[459, 464, 490])
                || e.message_mentions("checkpoint")
                || e.message_mentions("locked")
        },
        ErrorKind::IdLocked,
    ),
    (
        |e| {
            e.code_is(&[100, 803])
                || e.message_mentions("does not exist")
                || e.message_mentions("unsupported post request")
        },
        ErrorKind::WrongPostId,
    ),
    (
        |e| {
            e.code_is(&[10])
                || e.code.is_some_and(|code| (200..=299).contains(&code))
                || e.message_mentions("permission")
        },
        ErrorKind::NoPermission,
    ),
];

/// Map a provider error to its [`ErrorKind`]; unrecognised errors are `Unknown`.
pub fn classify(error: &ProviderError) -> ErrorKind {
    RULES
        .iter()
        .find(|(matches, _)| matches(error))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::Unknown)
}
