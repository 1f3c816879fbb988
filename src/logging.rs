use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the `--log-level` flag.
pub const LOG_ENV: &str = "GRIDPOINT_LOG";

/// Install the global subscriber. The terminal renderer owns stdout, so logs
/// go to stderr or, when given, to an append-mode file.
pub fn init(level: &str, file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_thread_ids(true)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
