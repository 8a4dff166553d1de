//! Logging Infrastructure
//!
//! `tracing-subscriber` with an `EnvFilter`, optional JSON output and an
//! optional daily rolling file.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. With `log_dir`, output goes to
/// `{log_dir}/tavola-server.YYYY-MM-DD` instead of stdout.
pub fn init_logger(log_level: &str, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tavola_server={log_level},shared={log_level},security={log_level},tower_http={log_level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    let file_dir = log_dir.filter(|dir| {
        let path = Path::new(dir);
        path.exists() || std::fs::create_dir_all(path).is_ok()
    });

    let result = match (json, file_dir) {
        (true, Some(dir)) => builder
            .json()
            .with_writer(tracing_appender::rolling::daily(dir, "tavola-server"))
            .try_init(),
        (true, None) => builder.json().try_init(),
        (false, Some(dir)) => builder
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, "tavola-server"))
            .try_init(),
        (false, None) => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}
