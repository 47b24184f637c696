//! Subscriber setup. `RUST_LOG` wins over the configured level.
//!
//! While the terminal UI owns the screen, logs go to a file; in headless
//! mode they go to stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Headless runs log to stderr unless a file is configured; interactive
/// runs always need a file.
pub fn log_target(config: &LoggingConfig, headless: bool) -> LogTarget {
    match (&config.file, headless) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::File(default_log_path()),
    }
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("recinto")
        .join("recinto.log")
}

pub fn env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}")),
    }
}

/// Install the global subscriber. Returns where logs are going.
pub fn init(config: &LoggingConfig, headless: bool) -> anyhow::Result<LogTarget> {
    let filter = env_filter(&config.level)?;
    let target = log_target(config, headless);

    let writer = match &target {
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };
    let ansi = target == LogTarget::Stderr;

    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_defaults_to_stderr() {
        let config = LoggingConfig::default();
        assert_eq!(log_target(&config, true), LogTarget::Stderr);
        assert!(matches!(log_target(&config, false), LogTarget::File(_)));
    }

    #[test]
    fn test_configured_file_always_wins() {
        let config = LoggingConfig {
            file: Some(PathBuf::from("/tmp/recinto-test.log")),
            ..Default::default()
        };
        assert_eq!(
            log_target(&config, true),
            LogTarget::File(PathBuf::from("/tmp/recinto-test.log"))
        );
    }

    #[test]
    fn test_level_directives_are_checked() {
        assert!(EnvFilter::try_new("recinto_overlay=debug,info").is_ok());
        assert!(EnvFilter::try_new("recinto_poll=loud").is_err());
    }
}
