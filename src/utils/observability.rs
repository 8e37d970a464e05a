use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use super::file_io;
use crate::Result;

/// Whether an existing log file survives process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Append,
    /// Start from an empty file
    Reset,
}

/// Routes `tracing` events to `log_path` through a non-blocking writer.
///
/// The returned guard flushes pending lines on drop and must be held for
/// the lifetime of the process. Filtering follows `RUST_LOG`, `info` by
/// default.
pub fn init_observability(
    log_path: &Path,
    mode: LogMode,
) -> Result<WorkerGuard> {
    let (subscriber, guard) = file_subscriber(log_path, mode)?;
    subscriber.init();

    Ok(guard)
}

/// Builds the file-backed subscriber without installing it.
pub(crate) fn file_subscriber(
    log_path: &Path,
    mode: LogMode,
) -> Result<(impl Subscriber + Send + Sync + 'static, WorkerGuard)> {
    let log_file = match mode {
        LogMode::Append => file_io::open_file_for_append(log_path)?,
        LogMode::Reset => file_io::reset_file_for_append(log_path)?,
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(filter);

    Ok((tracing_subscriber::registry().with(base_subscriber), guard))
}
