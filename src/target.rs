use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Names protected from browser-cache cleanup.
pub const BROWSER_EXCLUDE: &[&str] = &["Cookies", "Cookies-journal"];

/// Browser profile subfolders that hold disposable cache data.
pub const BROWSER_CACHE_DIRS: &[&str] = &["Cache", "Cache2", "Code Cache"];

/// Default age after which log entries become eligible.
pub const DEFAULT_LOG_MAX_AGE_DAYS: u64 = 7;

const SECS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    BrowserCache,
    GenericFolder,
    AgedLogs,
    RecycleBin,
}

impl TargetKind {
    /// Machine-readable name (e.g. "browser-cache").
    pub fn name(&self) -> &'static str {
        match self {
            TargetKind::BrowserCache => "browser-cache",
            TargetKind::GenericFolder => "generic-folder",
            TargetKind::AgedLogs => "aged-logs",
            TargetKind::RecycleBin => "recycle-bin",
        }
    }

    /// How far below the root entries are enumerated.
    pub fn traversal(&self) -> Traversal {
        match self {
            TargetKind::BrowserCache | TargetKind::GenericFolder => Traversal::TopLevel,
            TargetKind::AgedLogs => Traversal::Recursive,
            TargetKind::RecycleBin => Traversal::Bulk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Direct children of the root only.
    TopLevel,
    /// Every entry at every depth.
    Recursive,
    /// No enumeration: the whole root is cleared at once.
    Bulk,
}

/// Classification parameters for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub exclude: BTreeSet<String>,
    pub allowed_subfolders: Option<BTreeSet<String>>,
    pub max_age: Option<Duration>,
}

impl RuleSet {
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.contains(name)
    }
}

/// One configured cleanup location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub label: String,
    pub root: PathBuf,
    pub kind: TargetKind,
    pub rules: RuleSet,
}

impl Target {
    /// Browser profile: top-level files except `exclude`, plus the
    /// whitelisted cache subfolders.
    pub fn browser_cache<I, J, S, T>(root: impl Into<PathBuf>, exclude: I, cache_dirs: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            label: "Browser Cache".to_string(),
            root: root.into(),
            kind: TargetKind::BrowserCache,
            rules: RuleSet {
                exclude: exclude.into_iter().map(Into::into).collect(),
                allowed_subfolders: Some(cache_dirs.into_iter().map(Into::into).collect()),
                max_age: None,
            },
        }
    }

    /// Browser profile with the stock exclusion and cache-folder lists.
    pub fn default_browser_cache(root: impl Into<PathBuf>) -> Self {
        Self::browser_cache(
            root,
            BROWSER_EXCLUDE.iter().copied(),
            BROWSER_CACHE_DIRS.iter().copied(),
        )
    }

    /// Every direct child of `root` is removed.
    pub fn generic_folder(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            label: format!("Folder {}", root.display()),
            root,
            kind: TargetKind::GenericFolder,
            rules: RuleSet::default(),
        }
    }

    /// Entries at any depth older than `max_age` are removed.
    pub fn aged_logs(root: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            label: "Old Logs".to_string(),
            root: root.into(),
            kind: TargetKind::AgedLogs,
            rules: RuleSet {
                max_age: Some(max_age),
                ..RuleSet::default()
            },
        }
    }

    /// The trash, emptied in one bulk operation.
    pub fn recycle_bin(root: impl Into<PathBuf>) -> Self {
        Self {
            label: "Recycle Bin".to_string(),
            root: root.into(),
            kind: TargetKind::RecycleBin,
            rules: RuleSet::default(),
        }
    }
}

/// Cutoff in days as a `Duration`.
pub fn days(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(SECS_PER_DAY))
}

/// The full set of targets for one run.
#[derive(Debug, Clone, Default)]
pub struct Targets {
    pub browser_cache: Option<Target>,
    pub folders: Vec<Target>,
    pub logs: Option<Target>,
    pub recycle_bin: Option<Target>,
}

impl Targets {
    /// Targets in sweep order: browser cache, folders, logs, recycle bin.
    pub fn ordered(&self) -> Vec<&Target> {
        self.browser_cache
            .iter()
            .chain(self.folders.iter())
            .chain(self.logs.iter())
            .chain(self.recycle_bin.iter())
            .collect()
    }
}
