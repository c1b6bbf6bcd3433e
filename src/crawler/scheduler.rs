//! Periodic runner for standard-mode crawls
//!
//! The scheduler fires on a fixed interval, starting immediately. Each job
//! runs on its own task, which makes the `Running` state observable: a tick
//! that arrives while the previous job is still running is skipped, never
//! queued and never run alongside it.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Whether a scheduled job is in progress
#[derive(Debug, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running(JoinHandle<()>),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running(handle) if !handle.is_finished())
    }
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new run was started
    Started,
    /// The previous run was still in progress
    Skipped,
}

pub struct Scheduler {
    interval: Duration,
    state: RunState,
    runs_started: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: RunState::Idle,
            runs_started: 0,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    /// Starts `job` unless a previous run is still in progress
    pub fn tick<F, Fut>(&mut self, job: &mut F) -> TickOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.state.is_running() {
            tracing::warn!("Previous crawl still running, skipping this tick");
            return TickOutcome::Skipped;
        }

        self.runs_started += 1;
        tracing::info!("Starting scheduled crawl #{}", self.runs_started);
        self.state = RunState::Running(tokio::spawn(job()));
        TickOutcome::Started
    }

    /// Waits for the current run, if any, and returns to `Idle`
    pub async fn wait_idle(&mut self) {
        if let RunState::Running(handle) = std::mem::take(&mut self.state) {
            if let Err(e) = handle.await {
                tracing::error!("Scheduled crawl task failed: {}", e);
            }
        }
    }

    /// Runs `job` on every interval tick
    ///
    /// With `max_runs` set, returns once that many runs have started and the
    /// last one has finished; otherwise loops until the process is stopped.
    pub async fn run<F, Fut>(&mut self, mut job: F, max_runs: Option<u64>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if max_runs.is_some_and(|max| self.runs_started >= max) {
                self.wait_idle().await;
                return;
            }
            ticker.tick().await;
            self.tick(&mut job);
        }
    }
}
