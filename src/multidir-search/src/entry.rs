//! Filesystem node snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;
use serde::Serialize;

/// A read-only snapshot of one filesystem node, taken at traversal time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Absolute path of the node.
    pub path: PathBuf,

    /// The final path component, or the whole path for a filesystem root.
    pub name: String,

    /// Size in bytes. Zero for directories and unreadable nodes.
    pub size: u64,

    pub is_dir: bool,

    /// Whether the name starts with a dot.
    pub is_hidden: bool,

    /// Whether the node can be read. For directories this means listed.
    pub readable: bool,
}

impl DirectoryEntry {
    /// Takes a snapshot of `path`, following symbolic links.
    ///
    /// A relative path is resolved against the working directory. A missing
    /// or inaccessible path produces an unreadable entry rather than an error.
    pub fn probe(path: impl Into<PathBuf>) -> Self {
        let path = absolute_path(&path.into());
        let name = display_name(&path);
        let is_hidden = is_hidden_name(&name);

        match fs::metadata(&path) {
            Ok(meta) => {
                let is_dir = meta.is_dir();
                Self {
                    readable: can_read(&path, is_dir),
                    size: if is_dir { 0 } else { meta.len() },
                    path,
                    name,
                    is_dir,
                    is_hidden,
                }
            }
            Err(_) => Self {
                path,
                name,
                size: 0,
                is_dir: false,
                is_hidden,
                readable: false,
            },
        }
    }

    /// Snapshots one child produced by `read_dir`.
    ///
    /// Symbolic links are resolved when `follow_symlinks` is set. A dangling
    /// link is reported as an unreadable, empty file, like any other node
    /// whose metadata cannot be read.
    pub(crate) fn from_dir_entry(child: &fs::DirEntry, follow_symlinks: bool) -> Self {
        let path = child.path();
        let name = child.file_name().to_string_lossy().into_owned();
        let is_hidden = is_hidden_name(&name);

        let is_symlink = child
            .file_type()
            .map(|ft| ft.is_symlink())
            .unwrap_or(false);
        let metadata = if is_symlink && follow_symlinks {
            fs::metadata(&path)
        } else {
            child.metadata()
        };

        match metadata {
            Ok(meta) => {
                let is_dir = meta.is_dir();
                Self {
                    readable: if is_dir { can_read(&path, true) } else { true },
                    size: if is_dir { 0 } else { meta.len() },
                    path,
                    name,
                    is_dir,
                    is_hidden,
                }
            }
            Err(err) => {
                tracing::trace!(path = %path.display(), error = %err, "metadata unavailable");
                Self {
                    path,
                    name,
                    size: 0,
                    is_dir: false,
                    is_hidden,
                    readable: false,
                }
            }
        }
    }

    /// A non-hidden, non-directory node: the only kind a search reports.
    pub fn is_visible_file(&self) -> bool {
        !self.is_hidden && !self.is_dir
    }
}

/// Makes `path` absolute and lexically drops `.` and `..` components,
/// without touching the filesystem or resolving symlinks.
pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    match path.absolutize() {
        Ok(absolute) => absolute.into_owned(),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "cannot make path absolute");
            path.to_path_buf()
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(unix)]
fn can_read(path: &Path, is_dir: bool) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // Listing a directory needs read and search permission.
    let mode = if is_dir {
        libc::R_OK | libc::X_OK
    } else {
        libc::R_OK
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

#[cfg(not(unix))]
fn can_read(path: &Path, is_dir: bool) -> bool {
    if is_dir {
        fs::read_dir(path).is_ok()
    } else {
        fs::File::open(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_probe_file_and_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();

        let entry = DirectoryEntry::probe(&file);
        assert_eq!(entry.name, "notes.txt");
        assert_eq!(entry.size, 5);
        assert!(!entry.is_dir);
        assert!(entry.readable);
        assert!(entry.is_visible_file());

        let dir = DirectoryEntry::probe(temp_dir.path());
        assert!(dir.is_dir);
        assert!(dir.readable);
        assert_eq!(dir.size, 0);
        assert!(!dir.is_visible_file());
    }

    #[test]
    fn test_probe_missing_path_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let entry = DirectoryEntry::probe(temp_dir.path().join("absent"));
        assert!(!entry.readable);
        assert!(!entry.is_dir);
        assert_eq!(entry.name, "absent");
    }

    #[test]
    fn test_hidden_by_leading_dot() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join(".dog.txt");
        fs::write(&file, "").unwrap();

        let entry = DirectoryEntry::probe(&file);
        assert!(entry.is_hidden);
        assert!(!entry.is_visible_file());
    }

    #[test]
    fn test_relative_path_becomes_absolute() {
        let cwd = std::env::current_dir().unwrap();

        let entry = DirectoryEntry::probe("no-such-dir/child");
        assert!(entry.path.is_absolute());
        assert_eq!(entry.path, cwd.join("no-such-dir/child"));
        assert_eq!(entry.name, "child");

        let dotted = DirectoryEntry::probe("./no-such-dir/../no-such-dir/child");
        assert_eq!(dotted.path, entry.path);
    }

    #[test]
    fn test_root_name_falls_back_to_path() {
        assert_eq!(display_name(Path::new("/")), "/");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_unreadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("broken");
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), &link).unwrap();

        let child = fs::read_dir(temp_dir.path())
            .unwrap()
            .flatten()
            .find(|c| c.file_name() == "broken")
            .unwrap();
        let entry = DirectoryEntry::from_dir_entry(&child, true);
        assert!(!entry.is_dir);
        assert!(!entry.readable);
        assert_eq!(entry.size, 0);
    }
}
