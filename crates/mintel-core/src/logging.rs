//! Subscriber setup shared by the binaries: `RUST_LOG` filter (default `info`), a console
//! layer, and an append-only text log under the vault's log directory.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where console output goes. Hook binaries reserve stdout for their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    Stderr,
}

/// Install the global subscriber. Keep the returned guard alive until exit so buffered file
/// lines are flushed; `None` means the log file could not be opened and only the console
/// layer is active.
pub fn init_logging(log_dir: &Path, file_name: &str, console: Console) -> Option<WorkerGuard> {
    let (file_writer, guard) = match open_log_file(log_dir, file_name) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "[mintel] log file {} unavailable: {} (console only)",
                log_dir.join(file_name).display(),
                e
            );
            (None, None)
        }
    };

    let file_layer = file_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(w)
    });
    let stdout_layer = (console == Console::Stdout).then(tracing_subscriber::fmt::layer);
    let stderr_layer = (console == Console::Stderr)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(stdout_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}

fn open_log_file(log_dir: &Path, file_name: &str) -> Result<RollingFileAppender, String> {
    std::fs::create_dir_all(log_dir).map_err(|e| e.to_string())?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
        .map_err(|e| e.to_string())
}
