use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Home directory, if the platform reports one.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Total size of every regular file under `path`.
///
/// Never fails: unreadable entries count as zero and a missing path
/// measures 0. Symlinks are not followed.
pub fn measure(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Size of a single entry: the file length, or the measured subtree.
pub fn entry_size(path: &Path, is_dir: bool) -> u64 {
    if is_dir {
        measure(path)
    } else {
        path.symlink_metadata().map(|m| m.len()).unwrap_or(0)
    }
}

/// Bytes expressed in mebibytes, as used in the run message.
pub fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Format byte count as human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.2} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.2} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1_024 {
        format!("{:.2} KB", bytes as f64 / 1_024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Shorten a path for display by replacing home dir with ~.
pub fn display_path(path: &Path) -> String {
    match home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(relative) => format!("~/{}", relative.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}
