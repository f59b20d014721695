//! Relay engine: outbound posting, job execution and progress fan-out.
mod broadcast;
mod control;
mod persist;
mod poster;
mod runner;
mod types;

pub use broadcast::{ProgressBroadcaster, ProgressSink, Subscription};
pub use control::{JobControl, JobPermit};
pub use persist::{AtomicFileWriter, PersistError};
pub use poster::{ExternalPoster, GraphPoster, PosterError, PosterSettings};
pub use runner::{run_job, JobRunner, JobTicket};
pub use types::{JobId, PostFailure, PostReceipt, RunReport, StartError};
