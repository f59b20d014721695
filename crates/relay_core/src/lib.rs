//! Relay core: pure parsing, classification and job tally state machine.
mod access;
mod classify;
mod comments;
mod event;
mod msg;
mod request;
mod state;
mod targets;
mod update;

pub use access::{UserRecord, UserStatus};
pub use classify::{classify, ErrorKind, ProviderError};
pub use comments::CommentBatch;
pub use event::{ErrorCounters, ProgressEvent};
pub use msg::Msg;
pub use request::{JobRequest, RequestError, StartForm};
pub use state::{JobPhase, JobState};
pub use targets::{resolve_target, ResolvedTargets, TargetList};
pub use update::update;
