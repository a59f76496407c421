use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use a11y_batch::config::{RunConfig, DEFAULT_TIMEOUT_MS, DEFAULT_WORKERS};
use a11y_batch::orchestrator::Orchestrator;
use a11y_batch::shutdown::install_shutdown_handler;
use a11y_batch::BatchError;

#[derive(Parser, Debug)]
#[command(name = "a11y-batch")]
#[command(version)]
#[command(about = "Runs batches of accessibility scans across a pool of worker processes")]
struct Args {
    /// A JSON file with an array of scan task objects or file paths to scan
    /// task files, or a directory of task files
    file: PathBuf,

    /// Run in debug mode (verbose logging, headful runners)
    #[arg(short = 'd', long)]
    debug: bool,

    /// Maximum number of concurrent worker processes
    #[arg(short = 't', long = "threads", default_value_t = DEFAULT_WORKERS)]
    threads: usize,

    /// Retry failed scans once as a second pass
    #[arg(short = 'r', long)]
    retries: bool,

    /// Runner command the scans are handed to (the task artifact path is
    /// appended as the final argument)
    #[arg(long, default_value = "a11y-scan-runner")]
    runner: String,

    /// Directory for transient per-task input files
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Default per-scan timeout in milliseconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = RunConfig::new(args.file)
        .with_workers(args.threads)
        .with_timeout_ms(args.timeout_ms)
        .with_retries(args.retries)
        .with_runner_command(args.runner.split_whitespace().map(String::from).collect());
    config.debug = args.debug;
    if let Some(dir) = args.artifact_dir {
        config = config.with_artifact_dir(dir);
    }

    let cancel = install_shutdown_handler();
    let orchestrator = Orchestrator::new(config).with_cancellation(cancel);

    match orchestrator.run().await {
        Ok(state) => {
            let failures = state.final_failures();
            if failures > 0 {
                let err = BatchError::ScansFailed(failures);
                tracing::error!("{err}");
                std::process::exit(err.exit_code());
            }
        }
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}
