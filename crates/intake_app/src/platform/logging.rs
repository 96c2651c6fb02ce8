//! Maps the command-line logging flags onto [`LogOptions`].

use std::path::PathBuf;

use intake_logging::{LevelFilter, LogOptions};

use super::cli::Args;

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogDestination {
    /// Only the log file.
    File,
    /// Only the terminal. Warnings and errors go to stderr.
    Terminal,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

pub fn log_options(destination: LogDestination, level: LogLevel, file: PathBuf) -> LogOptions {
    let (terminal, file) = match destination {
        LogDestination::File => (false, Some(file)),
        LogDestination::Terminal => (true, None),
        LogDestination::Both => (true, Some(file)),
    };
    LogOptions {
        level: level.into(),
        terminal,
        file,
    }
}

/// Installs the logger. A log file that cannot be created is reported on
/// stderr and the run continues without it.
pub fn initialize(args: &Args) {
    let options = log_options(args.log, args.log_level, args.log_file.clone());
    if let Err(err) = intake_logging::init(&options) {
        eprintln!(
            "Warning: could not create log file at {:?}: {}",
            args.log_file, err
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn file_destination_writes_only_to_the_file() {
        let options = log_options(
            LogDestination::File,
            LogLevel::Info,
            PathBuf::from("logs/intake.log"),
        );
        assert_eq!(
            options,
            LogOptions {
                level: LevelFilter::Info,
                terminal: false,
                file: Some(PathBuf::from("logs/intake.log")),
            }
        );
    }

    #[test]
    fn terminal_destination_ignores_the_file_path() {
        let options = log_options(
            LogDestination::Terminal,
            LogLevel::Debug,
            PathBuf::from("intake.log"),
        );
        assert!(options.terminal);
        assert_eq!(options.file, None);
        assert_eq!(options.level, LevelFilter::Debug);
    }

    #[test]
    fn both_keeps_terminal_and_file() {
        let options = log_options(LogDestination::Both, LogLevel::Warn, PathBuf::from("x.log"));
        assert!(options.terminal);
        assert_eq!(options.file, Some(PathBuf::from("x.log")));
    }
}
