use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "TASKDECK_LOG";

/// Filter from `TASKDECK_LOG`, else the configured level, else `warn`.
pub fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// CLI logging: compact lines on stderr, so stdout stays parseable.
pub fn init_cli(configured: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// TUI logging: append to a file in the workspace directory, since the
/// terminal is owned by the UI. Falls back to no logging if the file cannot
/// be opened.
pub fn init_tui(log_path: &Path, configured: Option<&str>) {
    let file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("warning: could not open {}: {}", log_path.display(), e);
            return;
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
