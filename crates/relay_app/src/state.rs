use std::sync::Arc;

use relay_engine::{ExternalPoster, JobControl, JobRunner, ProgressBroadcaster};

use crate::users::UserStore;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub runner: JobRunner,
    pub broadcaster: Arc<ProgressBroadcaster>,
    pub users: Arc<UserStore>,
    /// Required `x-admin-key` value; `None` disables the admin routes.
    pub admin_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        poster: Arc<dyn ExternalPoster>,
        users: UserStore,
        admin_key: Option<String>,
        feed_capacity: usize,
    ) -> Self {
        let broadcaster = Arc::new(ProgressBroadcaster::new(feed_capacity));
        let runner = JobRunner::new(
            poster,
            broadcaster.clone(),
            Arc::new(JobControl::new()),
        );
        Self {
            runner,
            broadcaster,
            users: Arc::new(users),
            admin_key: admin_key.map(Arc::from),
        }
    }
}
