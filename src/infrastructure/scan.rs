//! Filesystem scanner
//!
//! Walks a source directory and builds a [`DirTree`] with every node
//! included. The tree is built bottom-up: a directory's size is set once,
//! after all of its entries are in, and its children are then ordered
//! largest first.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::tree::{DirTree, Node, NodeId};

/// Scan failure; all variants are fatal
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot access {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("cannot list {path}: {source}")]
    Unlistable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scan cancelled")]
    Cancelled,
}

/// Counters collected during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files: usize,
    pub directories: usize,
    /// Entries whose listing or metadata could not be read
    pub unreadable: usize,
    /// Names that are not valid UTF-8 and display lossily
    pub lossy_names: usize,
}

/// Builds a tree from the live filesystem
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    cancel: Option<Arc<AtomicBool>>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort with [`ScanError::Cancelled`] once `flag` becomes true
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn scan(&self, root: &Path) -> Result<DirTree, ScanError> {
        self.scan_with_stats(root).map(|(tree, _)| tree)
    }

    pub fn scan_with_stats(&self, root: &Path) -> Result<(DirTree, ScanStats), ScanError> {
        let started = Instant::now();

        let metadata = fs::metadata(root).map_err(|source| ScanError::Inaccessible {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        // Listability of the root is fatal; below it, failures only warn.
        let entries = fs::read_dir(root).map_err(|source| ScanError::Unlistable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut tree = DirTree::new(root_name(root));
        let mut stats = ScanStats {
            directories: 1,
            ..ScanStats::default()
        };
        let tree_root = tree.root();
        let total = self.scan_entries(&mut tree, tree_root, entries, &mut stats)?;
        tree.set_included_size(tree_root, total);

        info!(
            files = stats.files,
            directories = stats.directories,
            unreadable = stats.unreadable,
            lossy_names = stats.lossy_names,
            "scanned {} in {:.1}s",
            root.display(),
            started.elapsed().as_secs_f64()
        );
        Ok((tree, stats))
    }

    /// Attach `parent`'s entries and return their total size
    fn scan_entries(
        &self,
        tree: &mut DirTree,
        parent: NodeId,
        entries: fs::ReadDir,
        stats: &mut ScanStats,
    ) -> Result<u64, ScanError> {
        let mut total = 0u64;
        for entry in entries {
            self.check_cancelled()?;

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry in {}: {e}", tree.path(parent).display());
                    stats.unreadable += 1;
                    continue;
                }
            };
            let path = entry.path();
            let name = entry.file_name();
            if name.to_str().is_none() {
                warn!("{} is not valid UTF-8 and is shown lossily", path.display());
                stats.lossy_names += 1;
            }

            // DirEntry::file_type does not follow symlinks
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                stats.directories += 1;
                let id = tree.attach(parent, Node::scanned(name, true, 0));
                let size = match fs::read_dir(&path) {
                    Ok(children) => self.scan_entries(tree, id, children, stats)?,
                    Err(e) => {
                        warn!("cannot list {}: {e}", path.display());
                        stats.unreadable += 1;
                        0
                    }
                };
                tree.set_included_size(id, size);
                total = total.saturating_add(size);
            } else {
                stats.files += 1;
                let size = match entry.metadata() {
                    Ok(metadata) => metadata.len(),
                    Err(e) => {
                        debug!("no size for {}: {e}", path.display());
                        stats.unreadable += 1;
                        0
                    }
                };
                tree.attach(parent, Node::scanned(name, false, size));
                total = total.saturating_add(size);
            }
        }

        tree.sort_children_by_size(parent);
        Ok(total)
    }

    fn check_cancelled(&self) -> Result<(), ScanError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ScanError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// The root keeps the path as given, minus trailing separators
fn root_name(root: &Path) -> String {
    let text = root.to_string_lossy();
    let trimmed = text.trim_end_matches('/');
    if trimmed.is_empty() {
        text.into_owned()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::FilterState;
    use tempfile::tempdir;

    fn write(path: &Path, bytes: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; bytes]).unwrap();
    }

    #[test]
    fn scan_sums_sizes_and_orders_largest_first() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("A/a1"), 10);
        write(&dir.path().join("A/a2"), 20);
        write(&dir.path().join("b"), 5);
        fs::create_dir(dir.path().join("empty")).unwrap();

        let (tree, stats) = Scanner::new().scan_with_stats(dir.path()).unwrap();

        let root = tree.root();
        assert_eq!(tree[root].size(), 35);
        assert_eq!(stats.files, 3);
        assert_eq!(stats.directories, 3);
        assert_eq!(stats.unreadable, 0);
        assert_eq!(stats.lossy_names, 0);

        let names: Vec<_> = tree[root]
            .children()
            .iter()
            .map(|&id| tree[id].name())
            .collect();
        assert_eq!(names, vec!["A", "b", "empty"]);

        let a = tree.find("A").unwrap();
        assert!(tree[a].is_directory());
        let names: Vec<_> = tree[a].children().iter().map(|&id| tree[id].name()).collect();
        assert_eq!(names, vec!["a2", "a1"]);

        for id in tree.preorder() {
            assert_eq!(tree[id].filter(), FilterState::IncludeAll);
            assert_eq!(tree[id].filtered_size(), tree[id].size());
        }
    }

    #[test]
    fn root_name_is_the_given_path() {
        let dir = tempdir().unwrap();
        let given = format!("{}/", dir.path().display());

        let tree = Scanner::new().scan(Path::new(&given)).unwrap();

        assert_eq!(tree[tree.root()].name(), dir.path().to_string_lossy());
    }

    #[test]
    fn missing_root_is_inaccessible() {
        let dir = tempdir().unwrap();
        let err = Scanner::new().scan(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ScanError::Inaccessible { .. }));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        write(&file, 1);

        let err = Scanner::new().scan(&file).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn set_cancel_flag_aborts() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("f"), 1);
        let flag = Arc::new(AtomicBool::new(true));

        let err = Scanner::new()
            .with_cancel_flag(flag)
            .scan(dir.path())
            .unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_leaves() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("real/data"), 100);
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let tree = Scanner::new().scan(dir.path()).unwrap();

        let link = tree.find("link").unwrap();
        assert!(!tree[link].is_directory());
        assert!(tree[link].children().is_empty());
        assert!(tree[tree.root()].size() >= 100);
        assert!(tree[tree.root()].size() < 200);
    }

    #[test]
    fn wide_directory_aggregates_every_entry() {
        let dir = tempdir().unwrap();
        for index in 0..2_000 {
            write(&dir.path().join(format!("f{index:04}")), index % 3);
        }

        let (tree, stats) = Scanner::new().scan_with_stats(dir.path()).unwrap();

        let root = tree.root();
        let expected: u64 = (0..2_000u64).map(|index| index % 3).sum();
        assert_eq!(stats.files, 2_000);
        assert_eq!(tree[root].children().len(), 2_000);
        assert_eq!(tree[root].size(), expected);
        assert_eq!(tree[root].filtered_size(), expected);
        assert!(tree.verify_filters().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn unlistable_subdirectory_becomes_an_empty_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        write(&locked.join("secret"), 50);
        write(&dir.path().join("open"), 5);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits
        let listable = fs::read_dir(&locked).is_ok();
        let result = Scanner::new().scan_with_stats(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if listable {
            return;
        }

        let (tree, stats) = result.unwrap();
        let node = tree.find("locked").unwrap();
        assert!(tree[node].is_directory());
        assert_eq!(tree[node].size(), 0);
        assert!(tree[node].children().is_empty());
        assert_eq!(stats.unreadable, 1);
        assert_eq!(tree[tree.root()].size(), 5);
        assert!(tree.verify_filters().is_ok());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_kept_and_counted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let raw = OsStr::from_bytes(b"caf\xe9.jpg");
        write(&dir.path().join(raw), 3);

        let (tree, stats) = Scanner::new().scan_with_stats(dir.path()).unwrap();

        assert_eq!(stats.lossy_names, 1);
        let id = tree[tree.root()].children()[0];
        assert_eq!(tree[id].name_bytes(), b"caf\xe9.jpg");
        assert_eq!(tree[id].name(), "caf\u{fffd}.jpg");
        assert_eq!(tree[tree.root()].size(), 3);
    }
}
