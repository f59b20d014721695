use crate::ErrorCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Stopped,
}

/// Tally of one job as the runner works through it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobState {
    phase: JobPhase,
    counters: ErrorCounters,
    successes: u32,
    attempts: u32,
    planned: usize,
    unresolved_links: usize,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn counters(&self) -> ErrorCounters {
        self.counters
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Number of (target, comment) pairs the job was started with.
    pub fn planned(&self) -> usize {
        self.planned
    }

    pub fn unresolved_links(&self) -> usize {
        self.unresolved_links
    }

    /// Clears the run record once the job is finished.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn begin(&mut self, planned: usize, unresolved_links: usize) {
        *self = Self {
            phase: JobPhase::Running,
            planned,
            unresolved_links,
            ..Self::default()
        };
    }

    pub(crate) fn set_phase(&mut self, phase: JobPhase) {
        self.phase = phase;
    }

    pub(crate) fn record_success(&mut self) {
        self.attempts += 1;
        self.successes += 1;
    }

    pub(crate) fn record_failure(&mut self, kind: crate::ErrorKind) {
        self.attempts += 1;
        self.counters.increment(kind);
    }
}
