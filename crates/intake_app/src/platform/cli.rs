use std::path::PathBuf;

use clap::Parser;

use super::logging::{LogDestination, LogLevel};

/// Extract bookkeeping data from receipts and invoices, review it, and send
/// it to the configured webhook.
#[derive(Debug, Parser)]
#[command(name = "intake_app", version)]
pub struct Args {
    /// Configuration file (RON).
    #[arg(long, value_name = "PATH", default_value = "intake.ron")]
    pub config: PathBuf,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log file used by the `file` and `both` destinations.
    #[arg(long, value_name = "PATH", default_value = "intake.log")]
    pub log_file: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Confirm the review automatically and exit once it is sent or failed.
    #[arg(long)]
    pub yes: bool,

    /// Documents to analyze (images or PDFs).
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Args {
    /// Whether `--config` was left at its default, in which case a missing
    /// file just means built-in defaults.
    pub fn config_is_default(&self) -> bool {
        self.config == PathBuf::from("intake.ron")
    }
}
