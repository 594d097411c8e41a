use std::fs;
use std::io;
use std::path::Path;

use crate::error::SweepError;

/// Result of sweeping a single target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// `size_before - size_after` of the target root. Zero in dry-run.
    pub bytes_freed: u64,
    /// Sum of the sizes of entries that were removed, or would be in dry-run.
    pub planned_bytes: u64,
    /// Number of entries removed (or that would be).
    pub removed: usize,
    pub errors: Vec<SweepError>,
}

/// Filesystem side effects of a sweep.
pub trait Remover {
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Empty a recycle bin in one operation.
    fn clear_bin(&self, root: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn clear_bin(&self, root: &Path) -> io::Result<()> {
        // The shell and the OS recreate the bin directory on next use.
        fs::remove_dir_all(root)
    }
}
