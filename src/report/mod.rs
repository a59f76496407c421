//! Result aggregation and the end-of-run report.

use std::time::Duration;

use crate::orchestrator::RunState;
use crate::task::ScanJob;

/// Pass/fail tally over one result collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

/// Count passed and failed jobs. A job fails when its run failed or the
/// scan reported any issues. Pure function of the collection; re-running it
/// yields the same counts.
pub fn summarize(jobs: &[ScanJob]) -> Summary {
    let failed = jobs.iter().filter(|j| j.is_failed()).count();
    Summary {
        passed: jobs.len() - failed,
        failed,
    }
}

/// Order a collection for display: failed jobs grouped at the end, relative
/// order otherwise preserved. The single stable key replaces the original
/// tool's ambiguous multi-key comparison. Presentation only; counts are
/// unaffected.
pub fn sort_for_display(jobs: &mut [ScanJob]) {
    jobs.sort_by_key(ScanJob::is_failed);
}

/// Print the human-readable end-of-run report to stdout.
pub fn render(state: &mut RunState) {
    println!(":::::::::::::::::::::::::::::::::::SCAN RESULTS:::::::::::::::::::::::::::::::::::");
    let summary = summarize(&state.finished);
    sort_for_display(&mut state.finished);
    render_jobs(&state.finished, summary.failed);
    println!("---");
    println!("PASSED: {} of {}", summary.passed, state.finished.len());
    println!("FAILED: {} of {}", summary.failed, state.finished.len());

    if state.retries_enabled && !state.retried.is_empty() {
        println!(
            "::::::::::::::::::::::::::::::::RETRY SCAN RESULTS::::::::::::::::::::::::::::::::"
        );
        let summary = summarize(&state.retried);
        sort_for_display(&mut state.retried);
        render_jobs(&state.retried, summary.failed);
        println!("---");
        println!("RETRY PASSED: {} of {}", summary.passed, state.retried.len());
        println!("RETRY FAILED: {} of {}", summary.failed, state.retried.len());
    }

    println!("Total scan time: {}", format_duration(state.elapsed));
}

fn render_jobs(jobs: &[ScanJob], total_fails: usize) {
    let mut fail_index = 0;
    for job in jobs {
        let Some(outcome) = &job.outcome else {
            continue;
        };
        if !job.is_failed() {
            println!(
                "SUCCESSFUL SCAN --- {} - {} --- TASK RUN TIME: {}",
                job.name,
                job.url,
                format_duration(Duration::from_millis(outcome.elapsed_millis))
            );
            continue;
        }
        fail_index += 1;
        println!(
            "---------- FAILED SCAN {fail_index} of {total_fails}: {} - {} ----------",
            job.name, job.url
        );
        if let Some(source) = &job.source_path {
            println!("Task found at file path: {}", source.display());
        }
        if let Some(result) = &outcome.result_path {
            println!("Report written to: {}", result.display());
        }
        if outcome.issue_count > 0 {
            println!("{} accessibility issues found!", outcome.issue_count);
        }
        if let Some(error) = &outcome.error_message {
            println!("{error}");
        }
    }
}

/// Format an elapsed duration as `HH:MM:SS.t` (tenths of a second).
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let tenths = (millis % 1_000) / 100;
    let seconds = (millis / 1_000) % 60;
    let minutes = (millis / 60_000) % 60;
    let hours = (millis / 3_600_000) % 24;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{tenths}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Outcome;

    fn passed(name: &str) -> ScanJob {
        let mut job = ScanJob::new(name, "https://example.com");
        job.outcome = Some(Outcome {
            success: true,
            ..Default::default()
        });
        job
    }

    fn failed(name: &str) -> ScanJob {
        let mut job = ScanJob::new(name, "https://example.com");
        job.outcome = Some(Outcome::failure("scan error"));
        job
    }

    fn with_issues(name: &str, issues: u64) -> ScanJob {
        let mut job = ScanJob::new(name, "https://example.com");
        job.outcome = Some(Outcome {
            success: true,
            issue_count: issues,
            ..Default::default()
        });
        job
    }

    #[test]
    fn summarize_counts_issues_as_failures() {
        let jobs = vec![passed("a"), with_issues("b", 2), failed("c")];
        let summary = summarize(&jobs);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
    }

    #[test]
    fn summarize_is_idempotent() {
        let jobs = vec![passed("a"), failed("b")];
        assert_eq!(summarize(&jobs), summarize(&jobs));
    }

    #[test]
    fn summarize_empty_collection() {
        let summary = summarize(&[]);
        assert_eq!(summary.passed, 0);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn sort_groups_failures_at_the_end_preserving_order() {
        let mut jobs = vec![
            failed("f1"),
            passed("p1"),
            with_issues("f2", 1),
            passed("p2"),
            failed("f3"),
        ];
        sort_for_display(&mut jobs);
        let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["p1", "p2", "f1", "f2", "f3"]);
    }

    #[test]
    fn sort_does_not_change_counts() {
        let mut jobs = vec![failed("a"), passed("b"), failed("c")];
        let before = summarize(&jobs);
        sort_for_display(&mut jobs);
        assert_eq!(before, summarize(&jobs));
    }

    #[test]
    fn format_duration_is_hours_minutes_seconds_tenths() {
        assert_eq!(format_duration(Duration::from_millis(0)), "00:00:00.0");
        assert_eq!(format_duration(Duration::from_millis(1_500)), "00:00:01.5");
        assert_eq!(
            format_duration(Duration::from_millis(3_661_200)),
            "01:01:01.2"
        );
    }
}
