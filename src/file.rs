//! Directory discovery and file loading.
//!
//! # Discovery
//!
//! Each [`SearchPath`] variant is resolved to a concrete directory:
//! `Platform` and `Home` through the `directories` crate, `Cwd` through the
//! process working directory, `Path` as given. Variants that cannot be
//! resolved (no home directory) are dropped.
//!
//! # Enumeration
//!
//! Every regular file of each directory is a candidate. Within one directory
//! files are sorted by path, and directories keep the order they were given in,
//! so repeated scans of unchanged input produce the same sequence. With
//! `recursive` set, subdirectories are visited in sorted order after the files
//! of their parent.
//!
//! A directory that does not exist is silently skipped, since the default
//! directory list names locations that only exist on some machines. Any other
//! failure to read a directory aborts the scan.
//!
//! # Loading
//!
//! Files are read one at a time and closed right after. A file that cannot be
//! read (permissions, not UTF-8) is not fatal: it is reported as a
//! [`SkippedFile`] and the scan goes on.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::KConfigError;
use crate::types::{SearchPath, SkippedFile};

/// Name of the per-user config directory used by [`SearchPath::Platform`].
pub const APP_NAME: &str = "kairos";

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", APP_NAME)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Resolve all search paths, in order. Unresolvable entries are dropped.
pub fn expand_search_paths(search_paths: &[SearchPath]) -> Vec<PathBuf> {
    search_paths.iter().filter_map(resolve_search_path).collect()
}

/// List candidate files across `dirs`, in scan order.
pub fn collect_files(dirs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, KConfigError> {
    let mut files = Vec::new();
    for dir in dirs {
        tracing::debug!(dir = %dir.display(), "scanning directory");
        collect_dir(dir, recursive, &mut files)?;
    }
    Ok(files)
}

fn collect_dir(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<(), KConfigError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(KConfigError::ScanIo {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "directory does not exist, skipping");
            return Ok(());
        }
        Err(e) => {
            return Err(KConfigError::ScanIo {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        // Follows symlinks, so a link to a regular file counts as one.
        .follow_links(true)
        // Files first, then subdirectories, each group by name.
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.io_error().map(std::io::Error::kind) == Some(std::io::ErrorKind::NotFound) => {
                tracing::debug!(dir = %dir.display(), "entry vanished during scan, skipping");
                continue;
            }
            Err(e) => return Err(walk_error(dir, e)),
        };
        if entry.file_type().is_file() {
            out.push(entry.into_path());
        }
    }
    Ok(())
}

fn walk_error(dir: &Path, err: walkdir::Error) -> KConfigError {
    let path = err.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    KConfigError::ScanIo { path, source }
}

/// Read each file in order. Unreadable files are returned as skipped.
pub fn read_files(paths: &[PathBuf]) -> (Vec<(PathBuf, String)>, Vec<SkippedFile>) {
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();
    for path in paths {
        match std::fs::read_to_string(path) {
            Ok(content) => loaded.push((path.clone(), content)),
            Err(e) => skipped.push(SkippedFile {
                path: path.clone(),
                reason: format!("unreadable: {e}"),
            }),
        }
    }
    (loaded, skipped)
}

/// Read the boot cmdline file.
pub fn read_boot_line(path: &Path) -> Result<String, KConfigError> {
    std::fs::read_to_string(path).map_err(|e| KConfigError::BootLineIo {
        path: path.to_path_buf(),
        source: e,
    })
}
