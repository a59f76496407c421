use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("no task file or directory found at {0}")]
    SourceNotFound(PathBuf),

    #[error("no tasks found in {0}")]
    NoTasks(PathBuf),

    #[error("invalid task entry in {path}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },

    #[error("failed to read task source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse task source: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} scan(s) failed")]
    ScansFailed(usize),
}

impl BatchError {
    /// Process exit code for this error: 1 for an aggregate scan failure,
    /// 2 for any setup error that prevented the batch from running.
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchError::ScansFailed(_) => 1,
            _ => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
