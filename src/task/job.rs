use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One accessibility scan to run: a target URL plus whatever options the
/// runner understands. Tasks are loaded from JSON task files, serialized
/// back out as the runner's input artifact, and echoed back (with an
/// [`Outcome`] attached) on the runner's stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJob {
    /// Task name, used for artifact and report file names. Need not be
    /// unique, but collisions risk report overwrite.
    pub name: String,
    /// Target URL to scan.
    pub url: String,
    /// Opaque scan options forwarded to the runner (ignore rules, viewport,
    /// login settings). The orchestrator never inspects these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    /// Set when this task was re-queued after an initial failure.
    #[serde(default)]
    pub is_retry: bool,
    /// Per-task timeout override in milliseconds. The global default applies
    /// when absent; the executor fills in the effective value before the
    /// runner sees the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_millis: Option<u64>,
    /// Debug mode for the runner (e.g. headful browser).
    #[serde(default)]
    pub debug: bool,
    /// Task file this job was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Execution result, absent until the job has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl ScanJob {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            options: None,
            is_retry: false,
            timeout_millis: None,
            debug: false,
            source_path: None,
            outcome: None,
        }
    }

    /// A job counts as failed when it never produced an outcome, the run
    /// itself failed, or the scan completed but reported issues.
    pub fn is_failed(&self) -> bool {
        match &self.outcome {
            Some(o) => !o.success || o.issue_count > 0,
            None => true,
        }
    }

    /// Clone this job for the retry pass: outcome cleared, retry flag set.
    pub fn as_retry(&self) -> Self {
        let mut job = self.clone();
        job.outcome = None;
        job.is_retry = true;
        job
    }
}

/// Result of one runner invocation, attached to the job that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Whether the runner completed the scan without error. A successful run
    /// can still report issues, which counts as a failed job.
    #[serde(default)]
    pub success: bool,
    /// Number of accessibility issues the scan found.
    #[serde(default)]
    pub issue_count: u64,
    /// Set when the runner timed out, could not start, or reported an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock run time, measured by the executor.
    #[serde(default)]
    pub elapsed_millis: u64,
    /// Runner-produced report artifact, opaque to the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<PathBuf>,
}

impl Outcome {
    /// A failure outcome carrying only an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_without_outcome_is_failed() {
        let job = ScanJob::new("home", "https://example.com");
        assert!(job.is_failed());
    }

    #[test]
    fn clean_success_is_not_failed() {
        let mut job = ScanJob::new("home", "https://example.com");
        job.outcome = Some(Outcome {
            success: true,
            ..Default::default()
        });
        assert!(!job.is_failed());
    }

    #[test]
    fn successful_run_with_issues_is_failed() {
        let mut job = ScanJob::new("home", "https://example.com");
        job.outcome = Some(Outcome {
            success: true,
            issue_count: 3,
            ..Default::default()
        });
        assert!(job.is_failed());
    }

    #[test]
    fn as_retry_clears_outcome_and_sets_flag() {
        let mut job = ScanJob::new("home", "https://example.com");
        job.outcome = Some(Outcome::failure("boom"));
        let retry = job.as_retry();
        assert!(retry.is_retry);
        assert!(retry.outcome.is_none());
        assert_eq!(retry.name, "home");
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let mut job = ScanJob::new("home", "https://example.com");
        job.timeout_millis = Some(5_000);
        job.outcome = Some(Outcome {
            success: false,
            issue_count: 2,
            error_message: Some("scan error".into()),
            elapsed_millis: 120,
            result_path: Some(PathBuf::from("results/home.html")),
        });
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"timeoutMillis\":5000"));
        assert!(json.contains("\"isRetry\":false"));
        assert!(json.contains("\"issueCount\":2"));
        assert!(json.contains("\"errorMessage\":\"scan error\""));
        assert!(json.contains("\"resultPath\""));
    }

    #[test]
    fn deserializes_minimal_task() {
        let job: ScanJob =
            serde_json::from_str(r#"{"name":"home","url":"https://example.com"}"#).unwrap();
        assert_eq!(job.name, "home");
        assert!(!job.is_retry);
        assert!(job.outcome.is_none());
        assert!(job.timeout_millis.is_none());
    }
}
