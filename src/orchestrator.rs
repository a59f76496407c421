//! Two-phase batch driver: run every scan once, optionally retry the
//! failures, then report.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::RunConfig;
use crate::error::{BatchError, Result};
use crate::report;
use crate::task::{self, ScanJob};
use crate::worker::{AdmissionController, ScanExecutor};

/// Mutable state for one batch run, owned by the orchestrator and returned
/// to the caller. Nothing here is process-global, so independent runs
/// (including runs inside the same test process) never contaminate each
/// other.
#[derive(Debug)]
pub struct RunState {
    /// Number of tasks loaded from the job source.
    pub total: usize,
    pub retries_enabled: bool,
    pub started_at: DateTime<Utc>,
    /// First-pass results, in completion order.
    pub finished: Vec<ScanJob>,
    /// Retry-pass results, in completion order. A task failing both passes
    /// appears once in each collection.
    pub retried: Vec<ScanJob>,
    pub failed_count: usize,
    pub retries_failed_count: usize,
    pub elapsed: Duration,
    /// Set when a shutdown signal stopped admission before every task ran.
    pub cancelled: bool,
}

impl RunState {
    fn new(total: usize, retries_enabled: bool) -> Self {
        Self {
            total,
            retries_enabled,
            started_at: Utc::now(),
            finished: Vec::new(),
            retried: Vec::new(),
            failed_count: 0,
            retries_failed_count: 0,
            elapsed: Duration::ZERO,
            cancelled: false,
        }
    }

    /// Failures that determine the run's exit status: the retry pass when it
    /// ran, the initial pass otherwise.
    pub fn final_failures(&self) -> usize {
        if self.retries_enabled && !self.retried.is_empty() {
            self.retries_failed_count
        } else {
            self.failed_count
        }
    }
}

/// Drives one batch: load tasks, run them all under the admission limit,
/// retry the failures when enabled, and render the report.
pub struct Orchestrator {
    config: RunConfig,
    admission: AdmissionController,
    executor: ScanExecutor,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: RunConfig) -> Self {
        let admission = AdmissionController::new(config.workers);
        let executor = ScanExecutor::new(&config);
        Self {
            config,
            admission,
            executor,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop admitting queued tasks when `cancel` fires. In-flight runners
    /// drain normally; only the per-task timeout interrupts a running scan.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Run the batch to completion and return its state. Errors only for
    /// setup problems (missing or empty job source); task failures are
    /// recorded in the state, never raised from here.
    pub async fn run(&self) -> Result<RunState> {
        let timer = Instant::now();

        let jobs = task::load_jobs(&self.config.source)?;
        if jobs.is_empty() {
            return Err(BatchError::NoTasks(self.config.source.clone()));
        }
        tracing::info!(
            tasks = jobs.len(),
            workers = self.admission.limit(),
            retries = self.config.retries,
            "running accessibility scans"
        );

        let mut state = RunState::new(jobs.len(), self.config.retries);
        state.finished = self.run_phase(jobs).await;
        state.failed_count = report::summarize(&state.finished).failed;

        if self.config.retries && state.failed_count > 0 && !self.cancel.is_cancelled() {
            let retry_jobs: Vec<ScanJob> = state
                .finished
                .iter()
                .filter(|j| j.is_failed())
                .map(ScanJob::as_retry)
                .collect();
            for job in &retry_jobs {
                tracing::info!(task = %job.name, "retrying task");
            }
            state.retried = self.run_phase(retry_jobs).await;
            state.retries_failed_count = report::summarize(&state.retried).failed;
        }

        state.cancelled = self.cancel.is_cancelled();
        state.elapsed = timer.elapsed();
        report::render(&mut state);
        Ok(state)
    }

    /// Submit every job through admission control and wait for all of them
    /// to settle. Results come back in completion order; a single task's
    /// failure never aborts the phase.
    async fn run_phase(&self, jobs: Vec<ScanJob>) -> Vec<ScanJob> {
        let total = jobs.len();
        let mut running: JoinSet<ScanJob> = JoinSet::new();

        for job in jobs {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::warn!("shutdown requested, not admitting further tasks");
                    break;
                }
                permit = self.admission.admit() => permit,
            };
            let executor = self.executor.clone();
            running.spawn(async move {
                let _permit = permit;
                executor.execute(job).await
            });
        }

        let mut completed = Vec::with_capacity(total);
        while let Some(result) = running.join_next().await {
            match result {
                Ok(job) => {
                    let remaining = total - completed.len() - 1;
                    if job.is_failed() {
                        tracing::error!(
                            task = %job.name,
                            retry = job.is_retry,
                            remaining,
                            "FAILED: runner exited"
                        );
                    } else {
                        tracing::info!(
                            task = %job.name,
                            retry = job.is_retry,
                            remaining,
                            "FINISHED: runner exited"
                        );
                    }
                    completed.push(job);
                }
                Err(e) => {
                    tracing::error!(error = %e, "scan task panicked");
                }
            }
        }
        completed
    }
}
