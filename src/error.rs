//! Error types for sweeping, configuration and notification.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A failure that aborts the sweep of one whole target.
///
/// These escape the sweeper and are recorded by the orchestrator, which then
/// moves on to the next target.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The configured root exists but is not a directory.
    #[error("{} is not a directory", root.display())]
    NotADirectory { root: PathBuf },

    /// The root directory could not be listed.
    #[error("cannot read {}: {source}", root.display())]
    Enumerate {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TargetError {
    pub fn root(&self) -> &PathBuf {
        match self {
            TargetError::NotADirectory { root } | TargetError::Enumerate { root, .. } => root,
        }
    }
}

/// One recorded failure: the path involved and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepError {
    pub path: PathBuf,
    pub reason: String,
}

impl SweepError {
    pub fn new(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

impl From<TargetError> for SweepError {
    fn from(err: TargetError) -> Self {
        let path = err.root().clone();
        SweepError::new(path, err)
    }
}

/// Errors from notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// The request URL carries the bot token, so it is dropped here.
impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Http(err.without_url())
    }
}

/// Errors while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors while installing the log subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot create log file in {}: {source}", dir.display())]
    Appender {
        dir: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    #[error("log subscriber already installed: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
