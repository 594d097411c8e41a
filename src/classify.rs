use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::target::RuleSet;
use crate::utils;

/// One filesystem node met during a sweep.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    /// True only for real directories. A symlink to a directory is not one.
    pub is_dir: bool,
    pub modified: Option<SystemTime>,
}

impl Entry {
    /// Build from `symlink_metadata`, so links are never followed.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = path.symlink_metadata()?;
        Ok(Self {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            is_dir: meta.file_type().is_dir(),
            modified: meta.modified().ok(),
        })
    }

    /// Bytes held by this entry. Walks the subtree for directories.
    pub fn size(&self) -> u64 {
        utils::entry_size(&self.path, self.is_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    DeleteFile,
    DeleteSubtree,
}

impl Decision {
    pub fn is_delete(&self) -> bool {
        !matches!(self, Decision::Keep)
    }
}

/// Decide what happens to `entry` under `rules`.
///
/// Precedence: exclusion, cache-subfolder allow-list, age cutoff, then
/// delete. With an age cutoff, only entries strictly older than
/// `now - max_age` are eligible; an unreadable mtime keeps the entry.
pub fn classify(entry: &Entry, rules: &RuleSet, now: SystemTime) -> Decision {
    if rules.is_excluded(&entry.name) {
        return Decision::Keep;
    }

    if let Some(allowed) = &rules.allowed_subfolders {
        if entry.is_dir {
            return if allowed.contains(&entry.name) {
                Decision::DeleteSubtree
            } else {
                Decision::Keep
            };
        }
    }

    if let Some(max_age) = rules.max_age {
        let Some(modified) = entry.modified else {
            return Decision::Keep;
        };
        // A cutoff before the epoch means nothing can be old enough.
        let Some(cutoff) = now.checked_sub(max_age) else {
            return Decision::Keep;
        };
        if modified >= cutoff {
            return Decision::Keep;
        }
    }

    if entry.is_dir {
        Decision::DeleteSubtree
    } else {
        Decision::DeleteFile
    }
}
