//! Byte size of installed package directories.
//!
//! Every top-level measurement owns a set of `(device, inode)` pairs. An
//! entry whose identity is already in the set contributes nothing and is not
//! descended into, so hardlinks are counted once and symlinked directories
//! pointing back up the tree cannot loop.

use crate::{DetectiveError, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem identity of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InodeKey {
    pub device: u64,
    pub inode: u64,
}

impl InodeKey {
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        Some(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Paths skipped while measuring. An entry is excluded when its full path
/// starts with one of the prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclude {
    prefixes: Vec<PathBuf>,
}

impl Exclude {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::none().with(path)
    }

    pub fn with(mut self, path: impl Into<PathBuf>) -> Self {
        self.prefixes.push(path.into());
        self
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix))
    }
}

#[derive(Debug, Default)]
pub struct SizeResult {
    pub bytes: u64,
    pub visited: HashSet<InodeKey>,
}

/// Walks `directory` depth-first and sums the length of every regular file
/// reached. Unreadable entries count as zero.
pub fn measure(directory: &Path, exclude: &Exclude) -> SizeResult {
    let mut result = SizeResult::default();

    let root = match fs::metadata(directory) {
        Ok(metadata) => metadata,
        Err(error) => {
            debug!(path = %directory.display(), %error, "skipping unreadable directory");
            return result;
        }
    };

    if !root.is_dir() {
        return result;
    }

    if let Some(key) = InodeKey::from_metadata(&root) {
        result.visited.insert(key);
    }

    let mut pending = vec![directory.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) => {
                debug!(path = %dir.display(), %error, "cannot list directory");
                continue;
            }
        };

        let mut children: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        children.sort();

        for path in children.into_iter().rev() {
            if exclude.matches(&path) {
                continue;
            }

            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(error) => {
                    debug!(path = %path.display(), %error, "cannot stat entry");
                    continue;
                }
            };

            if let Some(key) = InodeKey::from_metadata(&metadata)
                && !result.visited.insert(key)
            {
                continue;
            }

            if metadata.is_dir() {
                pending.push(path);
            } else if metadata.is_file() {
                result.bytes += metadata.len();
            }
        }
    }

    result
}

pub fn size(directory: &Path, exclude: &Exclude) -> u64 {
    measure(directory, exclude).bytes
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanJob {
    pub directory: PathBuf,
    pub exclude: Exclude,
}

impl ScanJob {
    pub fn new(directory: impl Into<PathBuf>, exclude: Exclude) -> Self {
        Self {
            directory: directory.into(),
            exclude,
        }
    }

    /// A package's own footprint: its directory without nested installs,
    /// which are accounted to their own nodes.
    pub fn package(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let exclude = Exclude::path(directory.join("node_modules"));
        Self { directory, exclude }
    }
}

/// Runs size jobs on a bounded worker pool.
pub struct SizeScanner {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl SizeScanner {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("size-scan-{index}"))
            .build()
            .map_err(|error| DetectiveError::ThreadPool {
                reason: error.to_string(),
            })?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Sizes in the same order as `jobs`.
    pub fn size_all(&self, jobs: &[ScanJob]) -> Vec<u64> {
        self.pool.install(|| {
            jobs.par_iter()
                .map(|job| size(&job.directory, &job.exclude))
                .collect()
        })
    }
}

impl std::fmt::Debug for SizeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeScanner")
            .field("workers", &self.workers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, bytes: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; bytes]).unwrap();
    }

    #[test]
    fn sums_nested_files() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("index.js"), 100);
        write(&dir.path().join("lib/a.js"), 20);
        write(&dir.path().join("lib/deep/b.js"), 3);

        assert_eq!(size(dir.path(), &Exclude::none()), 123);
    }

    #[test]
    fn missing_directory_is_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(size(&dir.path().join("gone"), &Exclude::none()), 0);
    }

    #[test]
    fn excluded_subtrees_are_not_counted() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("index.js"), 10);
        write(&dir.path().join("node_modules/dep/index.js"), 1000);
        write(&dir.path().join("docs/readme.md"), 500);

        let exclude = Exclude::path(dir.path().join("node_modules"));
        assert_eq!(size(dir.path(), &exclude), 510);

        let exclude = exclude.with(dir.path().join("docs"));
        assert_eq!(size(dir.path(), &exclude), 10);
    }

    #[cfg(unix)]
    #[test]
    fn hardlinks_are_counted_once() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("a.js"), 64);
        write(&dir.path().join("b.js"), 16);
        let before = size(dir.path(), &Exclude::none());

        fs::hard_link(dir.path().join("a.js"), dir.path().join("a-link.js")).unwrap();
        let after = size(dir.path(), &Exclude::none());

        assert_eq!(before, 80);
        assert_eq!(after, before);
    }

    #[cfg(unix)]
    #[test]
    fn self_referential_symlink_terminates() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("pkg/index.js"), 42);
        std::os::unix::fs::symlink(dir.path(), dir.path().join("pkg/loop")).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("pkg"),
            dir.path().join("pkg/again"),
        )
        .unwrap();

        let result = measure(dir.path(), &Exclude::none());
        assert_eq!(result.bytes, 42);
        assert!(result.visited.len() >= 3);
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_contributes_zero() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("index.js"), 7);
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("dangling"))
            .unwrap();

        assert_eq!(size(dir.path(), &Exclude::none()), 7);
    }

    #[test]
    fn pool_preserves_job_order() {
        let dir = TempDir::new().unwrap();
        let mut jobs = Vec::new();
        for (index, bytes) in [5usize, 50, 0, 500].iter().enumerate() {
            let pkg = dir.path().join(format!("pkg{index}"));
            fs::create_dir_all(&pkg).unwrap();
            if *bytes > 0 {
                write(&pkg.join("index.js"), *bytes);
            }
            write(&pkg.join("node_modules/nested/index.js"), 9999);
            jobs.push(ScanJob::package(&pkg));
        }
        jobs.push(ScanJob::package(dir.path().join("missing")));

        let scanner = SizeScanner::new(2).unwrap();
        assert_eq!(scanner.workers(), 2);
        assert_eq!(scanner.size_all(&jobs), vec![5, 50, 0, 500, 0]);
    }

    #[test]
    fn zero_workers_still_builds_a_pool() {
        let scanner = SizeScanner::new(0).unwrap();
        assert_eq!(scanner.workers(), 1);
    }
}
