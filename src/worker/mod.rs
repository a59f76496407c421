//! Worker-process supervision.
//!
//! [`AdmissionController`] bounds how many runner processes are in flight at
//! once; [`ScanExecutor`] owns the lifecycle of a single runner invocation:
//! transient input artifact, spawn, timeout, exit classification, output
//! parsing, and cleanup.

pub mod admission;
pub mod executor;

pub use admission::{AdmissionController, AdmissionPermit};
pub use executor::ScanExecutor;
