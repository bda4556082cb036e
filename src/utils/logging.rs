//! Logging system initialization
//!
//! Sets up tracing-based logging with file output to
//! `~/Library/Application Support/hudctl/hudctl.log`, rotating on startup
//! and keeping 10 historical sessions. Console output stays clean for the
//! actual command results; diagnostics go to the file unless `RUST_LOG`
//! raises the stderr level.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::Result;

/// Maximum number of historical log files to keep (hudctl.log.1 through .9)
const MAX_LOG_FILES: u8 = 9;

/// Initialize the logging system, writing to `log_dir`.
///
/// Log level defaults to INFO but can be configured via the `RUST_LOG`
/// environment variable. Existing logs rotate on startup so each session
/// is preserved separately.
pub fn init_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let log_path = log_dir.join("hudctl.log");
    rotate_logs_on_startup(&log_path)?;

    // Rotation is handled manually above; the appender writes one file
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("hudctl")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| crate::error::HudctlError::ConfigError(Box::new(e)))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| crate::error::HudctlError::ConfigError(Box::new(e)))?;

    tracing::info!("hudctl v{} started", env!("CARGO_PKG_VERSION"));

    Ok(())
}

/// Rotate log files on startup
///
/// hudctl.log.9 is deleted, each numbered log shifts up by one, and the
/// current hudctl.log becomes hudctl.log.1. A fresh hudctl.log is created
/// by the logger afterwards.
fn rotate_logs_on_startup(log_path: &PathBuf) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path.parent().ok_or_else(|| {
        crate::error::HudctlError::ConfigError(crate::error::StringError::new("Invalid log path"))
    })?;

    let log_name = log_path
        .file_name()
        .ok_or_else(|| {
            crate::error::HudctlError::ConfigError(crate::error::StringError::new(
                "Invalid log filename",
            ))
        })?
        .to_string_lossy();

    let oldest_log = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = log_dir.join(format!("{log_name}.{i}"));
        let next_log = log_dir.join(format!("{log_name}.{}", i + 1));

        if current_log.exists() {
            std::fs::rename(&current_log, &next_log)?;
        }
    }

    let log_1 = log_dir.join(format!("{log_name}.1"));
    std::fs::rename(log_path, &log_1)?;

    Ok(())
}
