use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{BatchError, Result};
use crate::task::ScanJob;

/// Load the scan jobs named by `path`.
///
/// `path` may be a directory (every file under it, recursively, must hold a
/// JSON array of task objects) or a single file holding a JSON array whose
/// elements are task objects, or strings naming further task files or
/// directories to traverse.
pub fn load_jobs(path: &Path) -> Result<Vec<ScanJob>> {
    if !path.exists() {
        return Err(BatchError::SourceNotFound(path.to_path_buf()));
    }

    let mut jobs = Vec::new();
    if path.is_dir() {
        for file in files_recursively(path)? {
            jobs.extend(load_task_file(&file)?);
        }
        return Ok(jobs);
    }

    let entries: Vec<Value> = serde_json::from_slice(&fs::read(path)?)?;
    for entry in entries {
        match entry {
            Value::String(nested) => jobs.extend(traverse(Path::new(&nested))?),
            Value::Object(_) => jobs.push(parse_job(entry, path)?),
            other => {
                return Err(BatchError::MalformedSource {
                    path: path.to_path_buf(),
                    reason: format!(
                        "expected a task object or a file path string, found {}",
                        type_name(&other)
                    ),
                });
            }
        }
    }
    Ok(jobs)
}

/// Resolve a nested path entry: a directory yields every task file under it,
/// a file yields its own tasks.
fn traverse(path: &Path) -> Result<Vec<ScanJob>> {
    if !path.exists() {
        return Err(BatchError::SourceNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        let mut jobs = Vec::new();
        for file in files_recursively(path)? {
            jobs.extend(load_task_file(&file)?);
        }
        Ok(jobs)
    } else {
        load_task_file(path)
    }
}

/// Parse one task file: a JSON array of task objects.
fn load_task_file(path: &Path) -> Result<Vec<ScanJob>> {
    let entries: Vec<Value> = serde_json::from_slice(&fs::read(path)?)?;
    entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(_) => parse_job(entry, path),
            other => Err(BatchError::MalformedSource {
                path: path.to_path_buf(),
                reason: format!("expected a task object, found {}", type_name(&other)),
            }),
        })
        .collect()
}

fn parse_job(entry: Value, path: &Path) -> Result<ScanJob> {
    let mut job: ScanJob =
        serde_json::from_value(entry).map_err(|e| BatchError::MalformedSource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if job.source_path.is_none() {
        job.source_path = Some(path.to_path_buf());
    }
    Ok(job)
}

fn files_recursively(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(files_recursively(&path)?);
        } else {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
