#![deny(missing_docs)]
//! Shared logging utilities for the harvest workspace.
//!
//! This crate provides the `harvest_*` logging macros used across the codebase,
//! the process logger (append-only log file mirrored to the terminal) and a
//! minimal test initializer for the global logger.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Append to the given file only.
    File(PathBuf),
    /// Write to the terminal only.
    Terminal,
    /// Append to the given file and mirror every line to the terminal.
    Both(PathBuf),
}

/// Initialize the process logger.
///
/// The log file is opened once in append mode and never truncated, so
/// consecutive runs accumulate in the same file. Lines carry an RFC 3339
/// timestamp followed by the level and the message.
///
/// Returns an error if the log file cannot be opened; in that case no logger is
/// installed and the caller may fall back to [`LogDestination::Terminal`].
pub fn initialize(destination: &LogDestination, level: LevelFilter) -> io::Result<()> {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(2);
    match destination {
        LogDestination::File(path) => {
            loggers.push(WriteLogger::new(level, config, open_append(path)?));
        }
        LogDestination::Terminal => loggers.push(term_logger(level, config)),
        LogDestination::Both(path) => {
            let file = open_append(path)?;
            loggers.push(term_logger(level, config.clone()));
            loggers.push(WriteLogger::new(level, config, file));
        }
    }

    // A second initialization keeps the first logger.
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// Open `path` for appending, creating the file and its parent directory when absent.
pub fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build()
}

fn term_logger(level: LevelFilter, config: Config) -> Box<TermLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::open_append;

    #[test]
    fn open_append_keeps_existing_lines() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("logs").join("harvest.log");

        let mut first = open_append(&path).unwrap();
        writeln!(first, "first run").unwrap();
        drop(first);

        let mut second = open_append(&path).unwrap();
        writeln!(second, "second run").unwrap();
        drop(second);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first run\nsecond run\n");
    }
}
