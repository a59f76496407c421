pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod shutdown;
pub mod task;
pub mod worker;

pub use config::RunConfig;
pub use error::{BatchError, Result};
pub use orchestrator::{Orchestrator, RunState};
