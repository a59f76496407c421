pub mod job;
pub mod source;

pub use job::{Outcome, ScanJob};
pub use source::load_jobs;
