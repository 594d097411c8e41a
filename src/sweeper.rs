use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::classify::{classify, Decision, Entry};
use crate::cleaner::{Remover, SweepResult};
use crate::error::{SweepError, TargetError};
use crate::target::{Target, Traversal};
use crate::utils;

/// Applies a target's rules to its entries and removes what they select.
pub struct Sweeper<'a> {
    remover: &'a dyn Remover,
    now: SystemTime,
}

impl<'a> Sweeper<'a> {
    pub fn new(remover: &'a dyn Remover, now: SystemTime) -> Self {
        Self { remover, now }
    }

    /// Sweep one target.
    ///
    /// Per-entry failures are collected in the result. Only failures that
    /// make the whole target unusable are returned as `Err`.
    pub fn sweep(&self, target: &Target, dry_run: bool) -> Result<SweepResult, TargetError> {
        let root = target.root.as_path();
        info!(
            target = %target.label,
            kind = target.kind.name(),
            root = %root.display(),
            dry_run,
            "sweep started"
        );

        if !root.exists() {
            warn!(target = %target.label, root = %root.display(), "folder not found, skipping");
            return Ok(SweepResult::default());
        }
        if !root.is_dir() {
            return Err(TargetError::NotADirectory {
                root: root.to_path_buf(),
            });
        }

        let size_before = utils::measure(root);
        let mut result = match target.kind.traversal() {
            Traversal::Bulk => self.clear_bin(root, size_before, dry_run),
            Traversal::TopLevel => self.sweep_top_level(target, dry_run)?,
            Traversal::Recursive => self.sweep_recursive(target, dry_run)?,
        };

        if !dry_run {
            let size_after = utils::measure(root);
            result.bytes_freed = size_before.saturating_sub(size_after);
        }

        info!(
            target = %target.label,
            freed = %utils::format_size(result.bytes_freed),
            planned = %utils::format_size(result.planned_bytes),
            removed = result.removed,
            errors = result.errors.len(),
            "sweep finished"
        );
        Ok(result)
    }

    fn sweep_top_level(&self, target: &Target, dry_run: bool) -> Result<SweepResult, TargetError> {
        let root = target.root.as_path();
        let read_dir = fs::read_dir(root).map_err(|source| TargetError::Enumerate {
            root: root.to_path_buf(),
            source,
        })?;

        let mut result = SweepResult::default();
        for item in read_dir {
            let path = match item {
                Ok(de) => de.path(),
                Err(e) => {
                    error!(root = %root.display(), error = %e, "cannot read entry");
                    result.errors.push(SweepError::new(root, e));
                    continue;
                }
            };
            let Some(entry) = read_entry(&path, &mut result) else {
                continue;
            };

            let decision = classify(&entry, &target.rules, self.now);
            self.apply(&entry, decision, dry_run, &mut result);
        }
        Ok(result)
    }

    fn sweep_recursive(&self, target: &Target, dry_run: bool) -> Result<SweepResult, TargetError> {
        let root = target.root.as_path();
        // Surface an unreadable root as a target failure rather than one
        // walk error among many.
        fs::read_dir(root).map_err(|source| TargetError::Enumerate {
            root: root.to_path_buf(),
            source,
        })?;

        let mut result = SweepResult::default();
        let mut walker = WalkDir::new(root).min_depth(1).follow_links(false).into_iter();

        while let Some(item) = walker.next() {
            let dir_entry = match item {
                Ok(de) => de,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    error!(path = %path.display(), error = %e, "cannot read entry");
                    result.errors.push(SweepError::new(path, e));
                    continue;
                }
            };
            let Some(entry) = read_entry(dir_entry.path(), &mut result) else {
                continue;
            };

            let decision = classify(&entry, &target.rules, self.now);
            self.apply(&entry, decision, dry_run, &mut result);

            // A subtree that was (or would be) removed is not visited again.
            if decision == Decision::DeleteSubtree {
                walker.skip_current_dir();
            }
        }
        Ok(result)
    }

    fn clear_bin(&self, root: &Path, size_before: u64, dry_run: bool) -> SweepResult {
        if dry_run {
            info!(
                root = %root.display(),
                size = %utils::format_size(size_before),
                "[dry run] recycle bin would be emptied"
            );
            return SweepResult {
                planned_bytes: size_before,
                ..SweepResult::default()
            };
        }

        let mut result = SweepResult::default();
        match self.remover.clear_bin(root) {
            Ok(()) => {
                info!(root = %root.display(), "recycle bin emptied");
                result.planned_bytes = size_before;
            }
            Err(e) => {
                error!(root = %root.display(), error = %e, "failed to empty recycle bin");
                result.errors.push(SweepError::new(root, e));
            }
        }
        result
    }

    fn apply(&self, entry: &Entry, decision: Decision, dry_run: bool, result: &mut SweepResult) {
        if !decision.is_delete() {
            return;
        }

        let size = entry.size();
        if dry_run {
            info!(
                path = %entry.path.display(),
                size = %utils::format_size(size),
                "[dry run] would delete"
            );
            result.planned_bytes += size;
            result.removed += 1;
            return;
        }

        let outcome = match decision {
            Decision::DeleteFile => self.remover.remove_file(&entry.path),
            Decision::DeleteSubtree => self.remover.remove_dir_all(&entry.path),
            Decision::Keep => return,
        };
        match outcome {
            Ok(()) => {
                info!(path = %entry.path.display(), size = %utils::format_size(size), "deleted");
                result.planned_bytes += size;
                result.removed += 1;
            }
            Err(e) => {
                error!(path = %entry.path.display(), error = %e, "failed to delete");
                result.errors.push(SweepError::new(&entry.path, e));
            }
        }
    }
}

/// Entries can vanish between listing and stat; record those under their
/// own path.
fn read_entry(path: &Path, result: &mut SweepResult) -> Option<Entry> {
    match Entry::from_path(path) {
        Ok(entry) => Some(entry),
        Err(e) => {
            error!(path = %path.display(), error = %e, "cannot read entry");
            result.errors.push(SweepError::new(path, e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::testing::FakeRemover;
    use crate::cleaner::FsRemover;
    use crate::target::days;
    use std::fs::File;
    use std::path::PathBuf;
    use std::time::Duration;

    fn write(path: &Path, len: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; len]).unwrap();
    }

    fn set_age(path: &Path, age: Duration) {
        File::open(path)
            .unwrap()
            .set_modified(SystemTime::now() - age)
            .unwrap();
    }

    fn sweep(target: &Target, dry_run: bool) -> SweepResult {
        Sweeper::new(&FsRemover, SystemTime::now())
            .sweep(target, dry_run)
            .unwrap()
    }

    #[test]
    fn missing_root_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let target = Target::generic_folder(dir.path().join("gone"));
        assert_eq!(sweep(&target, false), SweepResult::default());
    }

    #[test]
    fn file_root_is_a_target_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        write(&file, 3);
        let target = Target::generic_folder(&file);

        let err = Sweeper::new(&FsRemover, SystemTime::now())
            .sweep(&target, false)
            .unwrap_err();
        assert!(matches!(err, TargetError::NotADirectory { root } if root == file));
    }

    #[test]
    fn generic_folder_removes_test_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test.txt");
        write(&file, 4);

        let result = sweep(&Target::generic_folder(dir.path()), false);
        assert!(!file.exists());
        assert_eq!(result.bytes_freed, 4);
        assert_eq!(result.removed, 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn generic_folder_removes_subtrees_but_keeps_root() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a/b/c.bin"), 100);
        write(&dir.path().join("d.bin"), 10);

        let result = sweep(&Target::generic_folder(dir.path()), false);
        assert!(dir.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(result.bytes_freed, 110);
        assert_eq!(result.planned_bytes, 110);
        assert_eq!(result.removed, 2);
    }

    #[test]
    fn browser_cache_keeps_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache.txt");
        let cookies = dir.path().join("Cookies");
        write(&cache, 20);
        write(&cookies, 30);
        let target = Target::default_browser_cache(dir.path());

        let dry = sweep(&target, true);
        assert!(cache.exists());
        assert!(cookies.exists());
        assert_eq!(dry.bytes_freed, 0);
        assert_eq!(dry.planned_bytes, 20);

        let real = sweep(&target, false);
        assert!(!cache.exists());
        assert!(cookies.exists());
        assert_eq!(real.bytes_freed, 20);
        assert!(real.errors.is_empty());
    }

    #[test]
    fn browser_cache_only_removes_cache_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("Cache/data_0"), 64);
        write(&dir.path().join("Code Cache/js/index"), 16);
        write(&dir.path().join("Extensions/ext/manifest.json"), 8);
        write(&dir.path().join("Cookies-journal"), 2);

        let result = sweep(&Target::default_browser_cache(dir.path()), false);
        assert!(!dir.path().join("Cache").exists());
        assert!(!dir.path().join("Code Cache").exists());
        assert!(dir.path().join("Extensions/ext/manifest.json").exists());
        assert!(dir.path().join("Cookies-journal").exists());
        assert_eq!(result.bytes_freed, 80);
    }

    #[test]
    fn aged_logs_removes_only_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.log");
        let new = dir.path().join("new.log");
        write(&old, 3);
        write(&new, 3);
        set_age(&old, days(10));
        set_age(&new, days(1));

        let result = sweep(&Target::aged_logs(dir.path(), days(7)), false);
        assert!(!old.exists());
        assert!(new.exists());
        assert_eq!(result.bytes_freed, 3);
    }

    #[test]
    fn aged_logs_descends_into_kept_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested_old = dir.path().join("app/2024/old.log");
        let nested_new = dir.path().join("app/2024/new.log");
        write(&nested_old, 5);
        write(&nested_new, 5);
        set_age(&nested_old, days(30));

        let result = sweep(&Target::aged_logs(dir.path(), days(7)), false);
        assert!(!nested_old.exists());
        assert!(nested_new.exists());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn aged_logs_removes_old_directory_without_revisiting_it() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("archive");
        write(&archive.join("a.log"), 7);
        write(&archive.join("b.log"), 7);
        set_age(&archive.join("a.log"), days(20));
        set_age(&archive.join("b.log"), days(20));
        set_age(&archive, days(20));

        let remover = FakeRemover::new();
        let result = Sweeper::new(&remover, SystemTime::now())
            .sweep(&Target::aged_logs(dir.path(), days(7)), false)
            .unwrap();

        assert!(!archive.exists());
        assert_eq!(remover.calls(), vec![archive]);
        assert_eq!(result.removed, 1);
        assert_eq!(result.bytes_freed, 14);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn dry_run_never_mutates() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("tmp/a.tmp"), 11);
        write(&dir.path().join("tmp/sub/b.tmp"), 13);
        write(&dir.path().join("profile/Cache/x"), 17);
        write(&dir.path().join("profile/loose"), 19);
        write(&dir.path().join("logs/old.log"), 23);
        set_age(&dir.path().join("logs/old.log"), days(10));
        write(&dir.path().join("bin/trashed"), 29);

        let targets = [
            Target::generic_folder(dir.path().join("tmp")),
            Target::default_browser_cache(dir.path().join("profile")),
            Target::aged_logs(dir.path().join("logs"), days(7)),
            Target::recycle_bin(dir.path().join("bin")),
        ];
        let remover = FakeRemover::new();
        for target in &targets {
            let before = utils::measure(&target.root);
            let result = Sweeper::new(&remover, SystemTime::now())
                .sweep(target, true)
                .unwrap();
            assert_eq!(utils::measure(&target.root), before, "{}", target.label);
            assert_eq!(result.bytes_freed, 0);
            assert_eq!(result.planned_bytes, before, "{}", target.label);
        }
        assert!(remover.calls().is_empty());
    }

    #[test]
    fn second_sweep_frees_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("one"), 8);
        write(&dir.path().join("two/three"), 8);
        let target = Target::generic_folder(dir.path());

        let first = sweep(&target, false);
        assert_eq!(first.bytes_freed, 16);

        let second = sweep(&target, false);
        assert_eq!(second.bytes_freed, 0);
        assert_eq!(second.removed, 0);
        assert!(second.errors.is_empty());
    }

    #[test]
    fn one_failing_entry_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.tmp", "locked.tmp", "c.tmp"] {
            write(&dir.path().join(name), 10);
        }
        write(&dir.path().join("dir/d.tmp"), 10);

        let remover = FakeRemover::failing_on("locked.tmp");
        let result = Sweeper::new(&remover, SystemTime::now())
            .sweep(&Target::generic_folder(dir.path()), false)
            .unwrap();

        assert!(dir.path().join("locked.tmp").exists());
        assert!(!dir.path().join("a.tmp").exists());
        assert!(!dir.path().join("c.tmp").exists());
        assert!(!dir.path().join("dir").exists());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, dir.path().join("locked.tmp"));
        assert!(result.errors[0].reason.contains("permission denied"));
        assert_eq!(result.bytes_freed, 30);
    }

    #[test]
    fn recycle_bin_is_cleared_in_bulk() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("Trash");
        write(&bin.join("files/a"), 40);
        write(&bin.join("info/a.trashinfo"), 2);

        let remover = FakeRemover::new();
        let result = Sweeper::new(&remover, SystemTime::now())
            .sweep(&Target::recycle_bin(&bin), false)
            .unwrap();

        assert_eq!(remover.calls(), vec![bin.clone()]);
        assert_eq!(utils::measure(&bin), 0);
        assert_eq!(result.bytes_freed, 42);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn recycle_bin_failure_is_one_error() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        write(&bin.join("a"), 5);
        write(&bin.join("b"), 5);

        let remover = FakeRemover::failing_bin();
        let result = Sweeper::new(&remover, SystemTime::now())
            .sweep(&Target::recycle_bin(&bin), false)
            .unwrap();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, PathBuf::from(&bin));
        assert_eq!(result.bytes_freed, 0);
        assert!(bin.join("a").exists());
    }

    #[test]
    fn vanished_entry_is_recorded_under_its_own_path() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.tmp");
        let mut result = SweepResult::default();

        assert!(read_entry(&gone, &mut result).is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, gone);
    }

    /// Drops all permissions on `path`. Returns false when the process can
    /// still list it anyway (running as root), so the caller can bail out.
    #[cfg(unix)]
    fn lock(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(path).is_ok() {
            unlock(path);
            return false;
        }
        true
    }

    #[cfg(unix)]
    fn unlock(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn unlistable_root_is_a_target_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tmp");
        write(&root.join("a.tmp"), 3);
        if !lock(&root) {
            return;
        }

        let outcome = Sweeper::new(&FsRemover, SystemTime::now())
            .sweep(&Target::generic_folder(&root), false);
        let logs = Sweeper::new(&FsRemover, SystemTime::now())
            .sweep(&Target::aged_logs(&root, days(7)), false);
        unlock(&root);

        assert!(matches!(outcome, Err(TargetError::Enumerate { root: r, .. }) if r == root));
        assert!(matches!(logs, Err(TargetError::Enumerate { .. })));
        assert!(root.join("a.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_recorded_and_siblings_still_swept() {
        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        write(&locked.join("inner.log"), 5);
        let old = dir.path().join("old.log");
        write(&old, 8);
        set_age(&old, days(30));
        if !lock(&locked) {
            return;
        }

        let result = sweep(&Target::aged_logs(dir.path(), days(7)), false);
        unlock(&locked);

        assert!(!old.exists());
        assert!(locked.join("inner.log").exists());
        assert_eq!(result.removed, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, locked);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_removed_as_a_link() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        write(&outside.join("keep.me"), 9);
        let tmp = dir.path().join("tmp");
        fs::create_dir_all(&tmp).unwrap();
        std::os::unix::fs::symlink(&outside, tmp.join("link")).unwrap();

        let result = sweep(&Target::generic_folder(&tmp), false);
        assert!(result.errors.is_empty());
        assert!(!tmp.join("link").exists());
        assert!(outside.join("keep.me").exists());
    }
}
