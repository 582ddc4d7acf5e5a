//! Where searches start.
//!
//! The engine asks a [`RootProvider`] for its roots at the start of every
//! session. Unreadable roots are kept in the list; walkers skip them.

use std::path::{Path, PathBuf};

use crate::entry::{DirectoryEntry, absolute_path};

/// Supplies the root directories of a search.
pub trait RootProvider: Send + Sync {
    /// The roots to search, in order. May perform I/O.
    fn search_roots(&self) -> Vec<PathBuf>;
}

/// Reports whether the process may read the search roots.
pub trait AccessCheck {
    fn is_read_permission_granted(&self) -> bool;
}

/// A fixed list of roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRoots(pub Vec<PathBuf>);

impl StaticRoots {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(roots.into_iter().map(Into::into).collect())
    }
}

impl RootProvider for StaticRoots {
    fn search_roots(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// The device root, the user's home directory and any configured extras.
///
/// The home directory is only added when it is readable and differs from the
/// device root. Duplicates are removed, keeping the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct SystemRoots {
    extra: Vec<PathBuf>,
}

impl SystemRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds roots searched after the system ones.
    pub fn with_extra(mut self, roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.extra.extend(roots.into_iter().map(Into::into));
        self
    }

    /// The filesystem root of the current platform.
    pub fn device_root() -> PathBuf {
        #[cfg(windows)]
        {
            std::env::var_os("SystemDrive")
                .map(|drive| PathBuf::from(drive).join("\\"))
                .unwrap_or_else(|| PathBuf::from("C:\\"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/")
        }
    }
}

impl RootProvider for SystemRoots {
    fn search_roots(&self) -> Vec<PathBuf> {
        let device_root = Self::device_root();
        let mut roots = vec![device_root.clone()];

        if let Some(home) = dirs::home_dir() {
            if home != device_root && DirectoryEntry::probe(&home).readable {
                roots.push(home);
            }
        }

        roots.extend(self.extra.iter().cloned());
        dedup_roots(roots)
    }
}

/// Grants access when at least one root can be listed.
pub struct FsAccess<'a> {
    provider: &'a dyn RootProvider,
}

impl<'a> FsAccess<'a> {
    pub fn new(provider: &'a dyn RootProvider) -> Self {
        Self { provider }
    }
}

impl AccessCheck for FsAccess<'_> {
    fn is_read_permission_granted(&self) -> bool {
        self.provider
            .search_roots()
            .iter()
            .any(|root| is_listable(root))
    }
}

fn is_listable(path: &Path) -> bool {
    let entry = DirectoryEntry::probe(path);
    entry.is_dir && entry.readable
}

/// Makes every root absolute and removes repeats, keeping the first
/// occurrence of each. `sub` and `./sub` count as the same root.
pub fn dedup_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut unique: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        let root = absolute_path(&root);
        if !unique.contains(&root) {
            unique.push(root);
        }
    }
    unique
}
