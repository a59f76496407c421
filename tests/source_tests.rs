
use std::fs;
use std::path::PathBuf;

use a11y_batch::error::BatchError;
use a11y_batch::task::load_jobs;
use tempfile::tempdir;
use test_harness::write_task_file;

#[test]
fn missing_path_is_a_distinct_error() {
    let err = load_jobs(&PathBuf::from("/nonexistent/tasks.json")).unwrap_err();
    assert!(matches!(err, BatchError::SourceNotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn loads_task_objects_from_a_file() {
    let dir = tempdir().unwrap();
    let path = write_task_file(
        dir.path(),
        "tasks.json",
        r#"[
            {"name":"home","url":"https://example.com"},
            {"name":"about","url":"https://example.com/about","timeoutMillis":1000}
        ]"#,
    );

    let jobs = load_jobs(&path).unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].name, "home");
    assert_eq!(jobs[1].timeout_millis, Some(1000));
}

#[test]
fn stamps_source_path_unless_already_set() {
    let dir = tempdir().unwrap();
    let path = write_task_file(
        dir.path(),
        "tasks.json",
        r#"[
            {"name":"home","url":"https://example.com"},
            {"name":"pinned","url":"https://example.com","sourcePath":"original.json"}
        ]"#,
    );

    let jobs = load_jobs(&path).unwrap();
    assert_eq!(jobs[0].source_path.as_deref(), Some(path.as_path()));
    assert_eq!(
        jobs[1].source_path,
        Some(PathBuf::from("original.json"))
    );
}

#[test]
fn follows_path_string_entries() {
    let dir = tempdir().unwrap();
    let nested = write_task_file(
        dir.path(),
        "nested.json",
        r#"[{"name":"nested","url":"https://example.com"}]"#,
    );
    let suite = write_task_file(
        dir.path(),
        "suite.json",
        &format!(
            r#"[{{"name":"inline","url":"https://example.com"}},"{}"]"#,
            nested.display()
        ),
    );

    let jobs = load_jobs(&suite).unwrap();
    let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["inline", "nested"]);
    assert_eq!(jobs[1].source_path.as_deref(), Some(nested.as_path()));
}

#[test]
fn traverses_directories_recursively() {
    let dir = tempdir().unwrap();
    write_task_file(
        dir.path(),
        "a.json",
        r#"[{"name":"a","url":"https://example.com"}]"#,
    );
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write_task_file(&sub, "b.json", r#"[{"name":"b","url":"https://example.com"}]"#);

    let mut names: Vec<String> = load_jobs(dir.path())
        .unwrap()
        .into_iter()
        .map(|j| j.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn rejects_entries_that_are_neither_objects_nor_paths() {
    let dir = tempdir().unwrap();
    let path = write_task_file(
        dir.path(),
        "tasks.json",
        r#"[{"name":"home","url":"https://example.com"}, 42]"#,
    );

    let err = load_jobs(&path).unwrap_err();
    match err {
        BatchError::MalformedSource { reason, .. } => assert!(reason.contains("a number")),
        other => panic!("expected MalformedSource, got {other:?}"),
    }
}

#[test]
fn rejects_task_objects_missing_required_fields() {
    let dir = tempdir().unwrap();
    let path = write_task_file(dir.path(), "tasks.json", r#"[{"name":"no-url"}]"#);

    let err = load_jobs(&path).unwrap_err();
    assert!(matches!(err, BatchError::MalformedSource { .. }));
}

#[test]
fn empty_file_yields_no_jobs() {
    let dir = tempdir().unwrap();
    let path = write_task_file(dir.path(), "tasks.json", "[]");
    assert!(load_jobs(&path).unwrap().is_empty());
}
