//! Tracing initialization built on `tracing_subscriber::fmt()`, with an
//! optional file sink via `tracing-appender` for long-running crew/swarm
//! runs where stdout is also consumed as CLI output.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Maps a CLI verbosity count to four tiers: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
fn filter_for_verbosity(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Initialize a stdout-only subscriber at the given verbosity.
pub fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for_verbosity(verbose))
        .with_target(false)
        .init();
}

/// Initialize a subscriber that writes to both stdout and a rolling log
/// file. Returns the [`WorkerGuard`] the caller must keep alive for the
/// duration of the process — dropping it flushes the non-blocking writer.
pub fn init_tracing_with_file(verbose: u8, log_dir: &Path, file_prefix: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter_for_verbosity(verbose))
        .with_target(false)
        .with_writer(non_blocking)
        .init();

    guard
}
