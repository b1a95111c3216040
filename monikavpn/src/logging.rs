//! Tracing setup. The dashboard owns the terminal, so logs go to a file.
//!
//! The subscriber is installed before configuration is read, so the config
//! loader's own events are recorded. Once the config is known its
//! `log_level` is swapped in through a reload handle, unless `RUST_LOG` or
//! `-v` already pinned the level.

use crate::error::AppError;
use std::path::Path;
use tracing::{warn, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, EnvFilter, Registry};

const LOG_FILENAME: &str = "monikavpn.log";

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Keeps the file writer flushing and the filter adjustable.
pub struct LogGuard {
    handle: FilterHandle,
    pinned: bool,
    _writer: WorkerGuard,
}

impl LogGuard {
    /// Applies the configured level. A bad directive is logged and skipped.
    pub fn apply_config_level(&self, level: &str) {
        if self.pinned {
            return;
        }
        set_level(&self.handle, level);
    }
}

pub fn set_level(handle: &FilterHandle, level: &str) {
    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                warn!("Could not change log level: {}", e);
            }
        }
        Err(e) => warn!("Ignoring log_level {:?}: {}", level, e),
    }
}

/// `-v` for debug, `-vv` for trace. Without either the level stays open to
/// the config file.
pub fn initial_filter(verbose: u8) -> (EnvFilter, bool) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return (filter, true);
    }
    match verbose {
        0 => (EnvFilter::new("info"), false),
        1 => (EnvFilter::new("debug"), true),
        _ => (EnvFilter::new("trace"), true),
    }
}

pub fn subscriber<W>(
    filter: EnvFilter,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true),
    );
    (subscriber, handle)
}

pub fn init(log_file: Option<&Path>, verbose: u8) -> Result<LogGuard, AppError> {
    let default_path = default_log_path();
    let path = log_file.unwrap_or(&default_path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new(LOG_FILENAME));
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let (filter, pinned) = initial_filter(verbose);
    let (subscriber, handle) = subscriber(filter, writer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Config(format!("logging already initialised: {}", e)))?;

    Ok(LogGuard {
        handle,
        pinned,
        _writer: guard,
    })
}

fn default_log_path() -> std::path::PathBuf {
    directories::ProjectDirs::from("com", "monikavpn", "MonikaVPN")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_FILENAME)
}
