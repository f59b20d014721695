use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::JobId;

struct ActiveJob {
    id: JobId,
    cancel: CancellationToken,
}

/// Single-slot registry for the one job allowed to run at a time.
///
/// The slot is taken with [`JobControl::try_acquire`] and freed when the
/// returned [`JobPermit`] is dropped.
#[derive(Default)]
pub struct JobControl {
    slot: Mutex<Option<ActiveJob>>,
    last_id: AtomicU64,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set under one lock: returns `None` while another job holds the slot.
    pub fn try_acquire(self: &Arc<Self>) -> Option<JobPermit> {
        let mut slot = self.lock_slot();
        if slot.is_some() {
            return None;
        }
        let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        *slot = Some(ActiveJob {
            id,
            cancel: cancel.clone(),
        });
        Some(JobPermit {
            id,
            cancel,
            control: Arc::clone(self),
        })
    }

    pub fn is_running(&self) -> bool {
        self.lock_slot().is_some()
    }

    pub fn current_job(&self) -> Option<JobId> {
        self.lock_slot().as_ref().map(|job| job.id)
    }

    /// Raise the stop signal for the running job. Returns `false` when idle.
    pub fn stop(&self) -> bool {
        match self.lock_slot().as_ref() {
            Some(job) => {
                job.cancel.cancel();
                true
            }
            None => false,
        }
    }

    fn release(&self, id: JobId) {
        let mut slot = self.lock_slot();
        if slot.as_ref().is_some_and(|job| job.id == id) {
            *slot = None;
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<ActiveJob>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive right to run a job; frees the slot on drop.
pub struct JobPermit {
    id: JobId,
    cancel: CancellationToken,
    control: Arc<JobControl>,
}

impl JobPermit {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn release(self) {}
}

impl Drop for JobPermit {
    fn drop(&mut self) {
        self.control.release(self.id);
    }
}
