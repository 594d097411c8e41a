use std::path::PathBuf;

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::LoggingError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log filter (trace, debug, info, warn, error).
    pub level: String,

    /// Directory for the log file. `None` disables file logging.
    pub log_dir: Option<PathBuf>,

    /// Log file name prefix.
    pub file_prefix: String,

    pub rotation: Rotation,

    /// Also write to stderr.
    pub console_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".into(),
            log_dir: Some(default_log_dir()),
            file_prefix: "cleanup".into(),
            rotation: Rotation::Never,
            console_output: true,
        }
    }
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Hourly,
    Daily,
    #[default]
    Never,
}

impl From<Rotation> for rolling::Rotation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Hourly => rolling::Rotation::HOURLY,
            Rotation::Daily => rolling::Rotation::DAILY,
            Rotation::Never => rolling::Rotation::NEVER,
        }
    }
}

/// `<state_dir>/reclaim/logs`, falling back to the local data dir. Kept out
/// of the working directory, which may itself be a swept temp folder.
pub fn default_log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("reclaim").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the global subscriber. Call once at startup and keep the
/// returned guard alive until exit so buffered file records are flushed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console_layer = config
        .console_output
        .then(|| fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = rolling::RollingFileAppender::builder()
                .rotation(config.rotation.into())
                .filename_prefix(&config.file_prefix)
                .filename_suffix("log")
                .build(dir)
                .map_err(|source| LoggingError::Appender {
                    dir: dir.clone(),
                    source,
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
