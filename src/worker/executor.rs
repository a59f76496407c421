use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::process::Command;
use tokio::time::timeout;

use crate::config::{RunConfig, INIT_FAILURE_EXIT_CODE};
use crate::error::Result;
use crate::task::{Outcome, ScanJob};

/// Process-wide artifact sequence number. Combined with a millisecond
/// timestamp it keeps artifact names unique even for tasks admitted within
/// the same millisecond.
static ARTIFACT_SEQ: AtomicU64 = AtomicU64::new(0);

/// How a runner process ended, resolved exactly once per invocation.
#[derive(Debug)]
enum ExitClass {
    /// Exit 0: stdout carries the completed task.
    Normal,
    /// Killed by the wall-clock timeout.
    TimedOut,
    /// Reserved exit code: the runner could not load its input.
    InitFailure,
    /// Any other non-zero exit, or killed by a signal (code `None`). The
    /// runner may still have written its captured error to stdout.
    Failed(Option<i32>),
}

/// Spawns and supervises one runner process per scan job.
///
/// Every failure mode (timeout, spawn error, init failure, malformed
/// output) is recovered into an [`Outcome`] here; `execute` never returns
/// an error and never panics the orchestrator.
#[derive(Debug, Clone)]
pub struct ScanExecutor {
    runner_command: Vec<String>,
    artifact_dir: PathBuf,
    default_timeout_ms: u64,
    debug: bool,
}

impl ScanExecutor {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            runner_command: config.runner_command.clone(),
            artifact_dir: config.artifact_dir.clone(),
            default_timeout_ms: config.timeout_ms,
            debug: config.debug,
        }
    }

    /// Run one scan: write the task artifact, spawn the runner with the
    /// artifact path as its final argument, enforce the timeout, classify
    /// the exit, and return the completed job. The artifact is removed on
    /// every exit path once the runner has terminated.
    pub async fn execute(&self, mut job: ScanJob) -> ScanJob {
        let started = Instant::now();
        let timeout_ms = job.timeout_millis.unwrap_or(self.default_timeout_ms);
        job.timeout_millis = Some(timeout_ms);
        job.debug = job.debug || self.debug;

        let artifact = match self.write_artifact(&job).await {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(task = %job.name, error = %e, "failed to write task artifact");
                job.outcome = Some(Outcome::failure(format!("could not write task input: {e}")));
                return finish(job, started);
            }
        };

        let completed = self.run_runner(&job, &artifact, timeout_ms).await;

        if let Err(e) = tokio::fs::remove_file(&artifact).await {
            tracing::warn!(
                artifact = %artifact.display(),
                error = %e,
                "failed to remove task artifact"
            );
        }

        finish(completed, started)
    }

    async fn run_runner(&self, job: &ScanJob, artifact: &Path, timeout_ms: u64) -> ScanJob {
        let Some((program, args)) = self.runner_command.split_first() else {
            return with_failure(job.clone(), "no runner command configured");
        };

        let child = Command::new(program)
            .args(args)
            .arg(artifact)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(task = %job.name, error = %e, "could not start runner");
                return with_failure(job.clone(), format!("could not start runner: {e}"));
            }
        };

        // Dropping the wait future on timeout kills the child (kill_on_drop).
        match timeout(Duration::from_millis(timeout_ms), child.wait_with_output()).await {
            Err(_) => self.resolve(job, ExitClass::TimedOut, &[], timeout_ms),
            Ok(Err(e)) => {
                tracing::error!(task = %job.name, error = %e, "runner process error");
                with_failure(job.clone(), format!("runner process error: {e}"))
            }
            Ok(Ok(output)) => {
                let class = if output.status.success() {
                    ExitClass::Normal
                } else if output.status.code() == Some(INIT_FAILURE_EXIT_CODE) {
                    ExitClass::InitFailure
                } else {
                    ExitClass::Failed(output.status.code())
                };
                self.resolve(job, class, &output.stdout, timeout_ms)
            }
        }
    }

    /// Turn a classified exit plus the runner's stdout into a completed job.
    fn resolve(&self, job: &ScanJob, class: ExitClass, stdout: &[u8], timeout_ms: u64) -> ScanJob {
        match class {
            ExitClass::Normal => match parse_returned(job, stdout) {
                Ok(mut returned) => {
                    let mut outcome = returned.outcome.take().unwrap_or_default();
                    outcome.success = outcome.error_message.is_none();
                    if let Some(msg) = &outcome.error_message {
                        tracing::error!(task = %returned.name, "runner reported error: {msg}");
                    }
                    returned.outcome = Some(outcome);
                    returned
                }
                Err(e) => {
                    tracing::error!(task = %job.name, error = %e, "unparseable runner output");
                    with_failure(job.clone(), "runner produced unparseable output")
                }
            },
            ExitClass::TimedOut => {
                tracing::error!(task = %job.name, timeout_ms, "runner timed out");
                with_failure(job.clone(), format!("timed out, limit={timeout_ms}"))
            }
            ExitClass::InitFailure => {
                tracing::error!(task = %job.name, "runner could not initialize task");
                with_failure(job.clone(), "runner could not initialize task")
            }
            ExitClass::Failed(code) => match parse_returned(job, stdout) {
                Ok(mut returned) => {
                    let mut outcome = returned.outcome.take().unwrap_or_default();
                    outcome.success = false;
                    if let Some(msg) = &outcome.error_message {
                        tracing::error!(task = %returned.name, "runner reported error: {msg}");
                    }
                    returned.outcome = Some(outcome);
                    returned
                }
                Err(e) => {
                    tracing::error!(
                        task = %job.name,
                        exit_code = ?code,
                        error = %e,
                        "runner exited abnormally with unparseable output"
                    );
                    with_failure(
                        job.clone(),
                        format!("runner exited abnormally (exit code {code:?})"),
                    )
                }
            },
        }
    }

    /// Write the task as a one-element JSON array, the shape runners load
    /// their input from.
    async fn write_artifact(&self, job: &ScanJob) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.artifact_dir).await?;
        let path = self.artifact_dir.join(artifact_name(&job.name));
        let payload = serde_json::to_vec(&[job])?;
        tokio::fs::write(&path, payload).await?;
        Ok(path)
    }
}

/// Parse the completed task a runner printed to stdout, carrying over the
/// fields only the orchestrator knows.
fn parse_returned(job: &ScanJob, stdout: &[u8]) -> serde_json::Result<ScanJob> {
    let mut returned: ScanJob = serde_json::from_slice(stdout)?;
    returned.is_retry = job.is_retry;
    if returned.source_path.is_none() {
        returned.source_path = job.source_path.clone();
    }
    Ok(returned)
}

fn with_failure(mut job: ScanJob, message: impl Into<String>) -> ScanJob {
    job.outcome = Some(Outcome::failure(message));
    job
}

/// Stamp the executor's own elapsed measurement on the outcome.
fn finish(mut job: ScanJob, started: Instant) -> ScanJob {
    let elapsed = started.elapsed().as_millis() as u64;
    match &mut job.outcome {
        Some(outcome) => outcome.elapsed_millis = elapsed,
        None => {
            // resolve() always attaches an outcome; keep the invariant anyway.
            let mut outcome = Outcome::failure("runner produced no outcome");
            outcome.elapsed_millis = elapsed;
            job.outcome = Some(outcome);
        }
    }
    job
}

fn artifact_name(task_name: &str) -> String {
    let sanitized: String = task_name.split_whitespace().collect();
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let seq = ARTIFACT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{sanitized}-{millis}-{seq}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_strip_whitespace_and_never_collide() {
        let a = artifact_name("home page");
        let b = artifact_name("home page");
        assert!(a.starts_with("homepage-"));
        assert!(a.ends_with(".json"));
        assert_ne!(a, b);
    }
}
