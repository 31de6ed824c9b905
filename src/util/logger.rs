use std::path::Path;

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type FileLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Owns the appender guards; dropping it flushes and stops the file writers.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    /// Console output plus daily-rolling files:
    /// `<dir>/poolcare-backend.log`, `<dir>/json/…`, and the same pair under `<dir>/error/`.
    ///
    /// Console verbosity comes from `RUST_LOG`; file levels from `FILE_LOG_LEVEL`
    /// (debug) and `ERROR_FILE_LOG_LEVEL` (error).
    pub fn new(log_dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        let mut guards = Vec::with_capacity(4);
        let mut files = rolling_pair(log_dir, "poolcare-backend", &file_level, &mut guards)?;
        files.extend(rolling_pair(&log_dir.join("error"), "poolcare-backend-error", &error_level, &mut guards)?);

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,poolcare_backend=debug"));
        let console = fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(console_filter);

        tracing_subscriber::registry().with(files).with(console).try_init()?;
        Ok(Logger { guards })
    }
}

/// A plain and a JSON writer for one file family, both filtered at `level`.
fn rolling_pair(
    dir: &Path,
    stem: &str,
    level: &str,
    guards: &mut Vec<WorkerGuard>,
) -> std::io::Result<Vec<FileLayer>> {
    let json_dir = dir.join("json");
    std::fs::create_dir_all(&json_dir)?;

    let (plain, plain_guard) = non_blocking(rolling::daily(dir, format!("{stem}.log")));
    let (json, json_guard) = non_blocking(rolling::daily(&json_dir, format!("{stem}.json")));
    guards.extend([plain_guard, json_guard]);

    Ok(vec![
        fmt::layer()
            .with_writer(plain)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level))
            .boxed(),
        fmt::layer()
            .json()
            .with_writer(json)
            .with_ansi(false)
            .with_filter(EnvFilter::new(level))
            .boxed(),
    ])
}
