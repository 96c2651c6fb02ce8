#![deny(missing_docs)]
//! Logging for the intake workspace.
//!
//! The `intake_*` macros forward to the `log` facade through this crate, so
//! callers only depend on `intake_logging`. [`init`] builds the global
//! logger from [`LogOptions`]; the binary and the tests share it.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

pub use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log as __log;

/// HTTP stack crates that flood debug output with connection details.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// Logs a debug-level message.
#[macro_export]
macro_rules! intake_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!($($arg)*);
    }};
}

/// Logs an info-level message.
#[macro_export]
macro_rules! intake_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!($($arg)*);
    }};
}

/// Logs a warn-level message.
#[macro_export]
macro_rules! intake_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!($($arg)*);
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! intake_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!($($arg)*);
    }};
}

/// Where log records go and how much of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Most verbose level written anywhere.
    pub level: LevelFilter,
    /// Mirror records to the terminal (warnings and errors on stderr).
    pub terminal: bool,
    /// Log file, truncated on start. Parent directories are created.
    pub file: Option<PathBuf>,
}

impl LogOptions {
    /// Terminal-only output at `level`.
    pub fn terminal(level: LevelFilter) -> Self {
        Self {
            level,
            terminal: true,
            file: None,
        }
    }
}

/// Installs the global logger.
///
/// A logger installed earlier wins and this call is a no-op. When the log
/// file cannot be created the terminal logger, if requested, is still
/// installed and the IO error is returned.
pub fn init(options: &LogOptions) -> io::Result<()> {
    let config = build_config(options.level);
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if options.terminal {
        loggers.push(TermLogger::new(
            options.level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    let file_result = match &options.file {
        Some(path) => open_log_file(path).map(|file| {
            loggers.push(WriteLogger::new(options.level, config, file));
        }),
        None => Ok(()),
    };

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
    file_result
}

fn build_config(level: LevelFilter) -> Config {
    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error);
    if level >= LevelFilter::Debug {
        for target in QUIET_TARGETS {
            builder.add_filter_ignore_str(*target);
        }
    }
    builder.build()
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Level used by [`initialize_for_tests`]: debug in debug builds, info otherwise.
pub fn test_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Terminal logger for tests. Safe to call from every test.
pub fn initialize_for_tests() {
    let _ = init(&LogOptions::terminal(test_level()));
}
