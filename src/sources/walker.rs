//! Source tree walker.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// One entry found below the build root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the walk root. Entries reached through a symlinked
    /// directory keep the symlink's name.
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Walk `root` recursively, following symlinks.
///
/// Dot-prefixed files and directories are skipped unless `include_hidden`
/// is set. Unreadable entries and symlink loops are logged and skipped.
/// Entries come back in a stable, name-sorted order.
pub fn walk(root: &Path, include_hidden: bool) -> Vec<WalkEntry> {
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| include_hidden || !is_hidden(e));

    let mut entries = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let path = entry
                    .path()
                    .strip_prefix(root)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                entries.push(WalkEntry {
                    path,
                    is_dir: entry.file_type().is_dir(),
                });
            }
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
            }
        }
    }

    entries
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}
