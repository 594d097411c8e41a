use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::logging::LogConfig;
use crate::notify::DEFAULT_API_BASE;
use crate::paths::PlatformPaths;
use crate::target::{
    days, Target, Targets, BROWSER_CACHE_DIRS, BROWSER_EXCLUDE, DEFAULT_LOG_MAX_AGE_DAYS,
};

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub targets: TargetsConfig,
    pub notify: NotifyConfig,
    pub logging: LogConfig,
}

/// Target roots. Anything left unset falls back to the platform default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub browser_cache: Option<PathBuf>,
    /// Generic folders, swept in this order. An explicit empty list
    /// disables them.
    pub folders: Option<Vec<PathBuf>>,
    pub logs: Option<PathBuf>,
    pub max_log_age_days: u64,
    pub recycle_bin: Option<PathBuf>,
    pub browser_exclude: Vec<String>,
    pub browser_cache_dirs: Vec<String>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        TargetsConfig {
            browser_cache: None,
            folders: None,
            logs: None,
            max_log_age_days: DEFAULT_LOG_MAX_AGE_DAYS,
            recycle_bin: None,
            browser_exclude: BROWSER_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            browser_cache_dirs: BROWSER_CACHE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        NotifyConfig {
            token: None,
            chat_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 15,
        }
    }
}

impl NotifyConfig {
    /// Token and chat id, if both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.token.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let chat_id = self.chat_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((token, chat_id))
    }
}

impl Config {
    /// Load from `path`, or from the default location if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Config::default()),
            },
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Let environment variables override the notification credentials.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV) {
            self.notify.token = Some(token);
        }
        if let Some(chat_id) = lookup(CHAT_ID_ENV) {
            self.notify.chat_id = Some(chat_id);
        }
    }

    /// Resolve the run's targets, filling gaps from `defaults`.
    pub fn targets(&self, defaults: &PlatformPaths) -> Targets {
        let t = &self.targets;
        let browser_root = t.browser_cache.clone().or_else(|| defaults.browser_cache.clone());
        let folders = t.folders.clone().unwrap_or_else(|| defaults.folders.clone());
        let logs_root = t.logs.clone().or_else(|| defaults.logs.clone());
        let bin_root = t.recycle_bin.clone().or_else(|| defaults.recycle_bin.clone());

        Targets {
            browser_cache: browser_root.map(|root| {
                Target::browser_cache(
                    root,
                    t.browser_exclude.iter().cloned(),
                    t.browser_cache_dirs.iter().cloned(),
                )
            }),
            folders: folders.into_iter().map(Target::generic_folder).collect(),
            logs: logs_root.map(|root| Target::aged_logs(root, days(t.max_log_age_days))),
            recycle_bin: bin_root.map(Target::recycle_bin),
        }
    }
}

/// `<config_dir>/reclaim/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reclaim").join("config.toml"))
}
