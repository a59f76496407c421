use std::path::PathBuf;

/// Default number of concurrent worker processes.
pub const DEFAULT_WORKERS: usize = 4;

/// Default per-scan wall-clock timeout in milliseconds (5 minutes).
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Reserved exit code a runner uses to signal it could not load its input.
pub const INIT_FAILURE_EXIT_CODE: i32 = 2;

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the task file or directory to load scans from.
    pub source: PathBuf,
    /// Maximum number of worker processes running at once.
    pub workers: usize,
    /// Default per-scan timeout in milliseconds, used when a task does not
    /// carry its own.
    pub timeout_ms: u64,
    /// Re-run failed scans once as a second pass.
    pub retries: bool,
    /// Debug mode, propagated to each task the runner receives.
    pub debug: bool,
    /// Command used to launch a runner process. The transient task artifact
    /// path is appended as the final argument.
    pub runner_command: Vec<String>,
    /// Directory for transient per-task input artifacts.
    pub artifact_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            workers: DEFAULT_WORKERS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: false,
            debug: false,
            runner_command: vec!["a11y-scan-runner".to_string()],
            artifact_dir: std::env::temp_dir().join("a11y-batch"),
        }
    }
}

impl RunConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retries(mut self, retries: bool) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_runner_command(mut self, command: Vec<String>) -> Self {
        self.runner_command = command;
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }
}
