//! Log setup: every event goes to stdout and is appended to a file under the
//! log directory. Each line carries a local `YYYY-mm-dd HH:MM:SS` timestamp,
//! the level, the target, the source file and line, and the message.

use std::path::PathBuf;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::LoggingError;
use crate::paths::create_directories;

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "loggings.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub log_dir: PathBuf,
    pub file_name: String,
    /// `EnvFilter` directive, e.g. `info` or `cnn_classifier_core=debug`.
    pub filter: String,
    /// Also write to stdout.
    pub stdout: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_LOG_FILE.to_string(),
            filter: "info".to_string(),
            stdout: true,
        }
    }
}

impl LogSettings {
    /// Defaults, with the filter taken from `RUST_LOG` when set.
    pub fn from_env() -> Self {
        let mut settings = LogSettings::default();
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                settings.filter = filter;
            }
        }
        settings
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }
}

/// Builds the subscriber without installing it.
///
/// The returned guard flushes the file writer on drop and must outlive every
/// event that should reach the file.
pub fn build_subscriber(
    settings: &LogSettings,
) -> Result<(impl Subscriber + Send + Sync + 'static, WorkerGuard), LoggingError> {
    create_directories(&[&settings.log_dir], false)?;
    let filter = EnvFilter::try_new(&settings.filter)?;

    let file_appender = tracing_appender::rolling::never(&settings.log_dir, &settings.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let stdout_layer = settings.stdout.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer);
    Ok((subscriber, guard))
}

/// Installs the subscriber process-wide. Call once, from `main`.
pub fn init(settings: &LogSettings) -> Result<WorkerGuard, LoggingError> {
    let (subscriber, guard) = build_subscriber(settings)?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_events_reach_the_log_file() {
        let tmp = tempdir().unwrap();
        let settings = LogSettings {
            log_dir: tmp.path().join("logs"),
            stdout: false,
            ..LogSettings::default()
        };

        let (subscriber, guard) = build_subscriber(&settings).expect("subscriber builds");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hello from the log test");
            tracing::debug!("filtered out at info");
        });
        drop(guard);

        let content = std::fs::read_to_string(settings.log_file()).unwrap();
        assert!(content.contains("hello from the log test"));
        assert!(content.contains("INFO"));
        assert!(content.contains("logging.rs"));
        assert!(!content.contains("filtered out at info"));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let tmp = tempdir().unwrap();
        let settings = LogSettings {
            log_dir: tmp.path().to_path_buf(),
            filter: "cnn_classifier_core=notalevel".to_string(),
            stdout: false,
            ..LogSettings::default()
        };
        assert!(matches!(
            build_subscriber(&settings),
            Err(LoggingError::Filter(_))
        ));
    }
}
