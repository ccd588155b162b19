//! Shared plumbing for the `generate-makeflow` and `join-logs` binaries.

use pythia_core::{PythiaError, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so stdout stays free for flow or JSON output.
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // A second install (tests, embedding) keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Outcome of inspecting the joiner's positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinRequest {
    /// Wrong argument count; carries the message to print
    Usage(String),

    /// Join inputs `0..task_count`
    Run { task_count: u64 },
}

/// Interprets the joiner's positional arguments.
///
/// Exactly one is expected. Any other count yields [`JoinRequest::Usage`]
/// listing `argv`. A non-integer count is an error. A negative count joins
/// nothing.
pub fn join_request(positionals: &[String], argv: &[String]) -> Result<JoinRequest> {
    match positionals {
        [count] => {
            let task_count: i64 = count.trim().parse().map_err(|_| {
                PythiaError::usage(format!("task count must be an integer, got {:?}", count))
            })?;
            Ok(JoinRequest::Run {
                task_count: task_count.max(0) as u64,
            })
        }
        _ => Ok(JoinRequest::Usage(format!("Wrong number of parameters {:?}", argv))),
    }
}
