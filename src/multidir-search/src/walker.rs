//! Breadth-first traversal of one root directory.
//!
//! A [`Walk`] is a lazy iterator over the matches below one root. It keeps
//! an explicit queue of directories still to be listed, expands one directory
//! at a time, and checks its cancellation token on every dequeue and before
//! every emission. Directories that cannot be listed are skipped silently.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::entry::DirectoryEntry;
use crate::keyword::Keyword;
use crate::matcher::{MatchMode, NameMatcher};
use crate::result::{ResultItem, WalkStats};

/// Traversal options shared by every walker of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,

    /// Skip directories already visited by this walk.
    pub cycle_guard: bool,

    /// Maximum depth below the root. `None` means unlimited.
    pub max_depth: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            cycle_guard: true,
            max_depth: None,
        }
    }
}

/// Walks root directories looking for file names that match a keyword.
///
/// The walker holds no traversal state; each call to [`DirectoryWalker::walk`]
/// starts a fresh traversal.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    matcher: Arc<NameMatcher>,
    options: WalkOptions,
}

impl DirectoryWalker {
    /// Creates a walker for `keyword`.
    pub fn new(keyword: &Keyword, mode: MatchMode, options: WalkOptions) -> Self {
        Self::with_matcher(Arc::new(NameMatcher::new(keyword, mode)), options)
    }

    /// Creates a walker around an already compiled matcher.
    pub fn with_matcher(matcher: Arc<NameMatcher>, options: WalkOptions) -> Self {
        Self { matcher, options }
    }

    /// Starts a traversal of `root`.
    ///
    /// An unreadable root, or one that is not a directory, yields nothing.
    pub fn walk(&self, root: &DirectoryEntry, cancel: CancellationToken) -> Walk {
        let mut walk = Walk {
            queue: VecDeque::with_capacity(100),
            pending: VecDeque::new(),
            matcher: self.matcher.clone(),
            options: self.options,
            cancel,
            visited: HashSet::new(),
            stats: WalkStats::default(),
        };

        if root.is_dir && root.readable {
            walk.enqueue(root.path.clone(), 0);
        } else {
            debug!(root = %root.path.display(), "skipping unreadable root");
        }

        walk
    }
}

#[cfg(unix)]
type DirIdentity = (u64, u64);

#[cfg(not(unix))]
type DirIdentity = PathBuf;

#[cfg(unix)]
fn dir_identity(path: &Path) -> Option<DirIdentity> {
    use std::os::unix::fs::MetadataExt;

    let meta = fs::metadata(path).ok()?;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn dir_identity(path: &Path) -> Option<DirIdentity> {
    fs::canonicalize(path).ok()
}

/// One in-progress traversal. Not restartable.
#[derive(Debug)]
pub struct Walk {
    queue: VecDeque<(PathBuf, usize)>,
    pending: VecDeque<ResultItem>,
    matcher: Arc<NameMatcher>,
    options: WalkOptions,
    cancel: CancellationToken,
    visited: HashSet<DirIdentity>,
    stats: WalkStats,
}

impl Walk {
    /// Counters gathered so far.
    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    fn enqueue(&mut self, dir: PathBuf, depth: usize) {
        if self.options.follow_symlinks && self.options.cycle_guard {
            // A directory whose identity cannot be read is still listed;
            // read_dir decides whether it is usable.
            if let Some(identity) = dir_identity(&dir) {
                if !self.visited.insert(identity) {
                    trace!(dir = %dir.display(), "directory already visited");
                    return;
                }
            }
        }
        self.queue.push_back((dir, depth));
    }

    fn expand(&mut self, dir: &Path, depth: usize) {
        let children = match fs::read_dir(dir) {
            Ok(children) => children,
            Err(err) => {
                self.stats.unreadable_directories += 1;
                debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                return;
            }
        };
        self.stats.directories_visited += 1;

        let may_descend = self.options.max_depth.is_none_or(|max| depth < max);

        for child in children {
            let child = match child {
                Ok(child) => child,
                Err(err) => {
                    trace!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let entry = DirectoryEntry::from_dir_entry(&child, self.options.follow_symlinks);
            if entry.is_visible_file() {
                if self.matcher.is_match(&entry.name) {
                    self.pending.push_back(ResultItem::new(entry));
                }
            } else if entry.is_dir && may_descend {
                if entry.readable {
                    self.enqueue(entry.path, depth + 1);
                } else {
                    self.stats.unreadable_directories += 1;
                    debug!(dir = %entry.path.display(), "pruning unreadable directory");
                }
            }
        }
    }

    fn stop(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }
}

impl Iterator for Walk {
    type Item = ResultItem;

    fn next(&mut self) -> Option<ResultItem> {
        loop {
            if self.cancel.is_cancelled() {
                self.stop();
                return None;
            }

            if let Some(item) = self.pending.pop_front() {
                self.stats.matches += 1;
                return Some(item);
            }

            let (dir, depth) = self.queue.pop_front()?;
            self.expand(&dir, depth);
        }
    }
}
