use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "reclaim",
    about = "Reclaim disk space from browser cache, temp folders, old logs and the trash",
    version
)]
pub struct Cli {
    /// Log what would be deleted without touching anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// TOML config file (default: <config dir>/reclaim/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log filter, e.g. "info" or "reclaim=debug" (RUST_LOG takes precedence)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Delete log entries older than this many days
    #[arg(long)]
    pub max_log_age_days: Option<u64>,

    /// Do not send the end-of-run notification
    #[arg(long)]
    pub no_notify: bool,
}

impl Cli {
    /// Flags win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.log_dir {
            config.logging.log_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(days) = self.max_log_age_days {
            config.targets.max_log_age_days = days;
        }
    }
}
