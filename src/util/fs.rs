//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Remove a file. Returns `false` if it did not exist.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove file: {}", path.display()))
        }
    }
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// A `..` with nothing left to pop is kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Express a user-supplied path relative to the build root.
///
/// Relative paths are cleaned lexically (`./cmd/../main.go` is `main.go`);
/// absolute paths, and paths reaching the root through symlinks, are rebased
/// onto the root.
pub fn root_relative(root: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        return clean_path(path);
    }
    relative_path(&normalize_path(root), &normalize_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.txt");
        write_string(&path, "hi").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi");
    }

    #[test]
    fn test_remove_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.txt");
        assert!(!remove_file_if_exists(&path).unwrap());

        fs::write(&path, "").unwrap();
        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_root_relative() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("cmd")).unwrap();
        fs::write(tmp.path().join("cmd/tool.go"), "").unwrap();

        assert_eq!(
            root_relative(tmp.path(), &tmp.path().join("cmd/tool.go")),
            PathBuf::from("cmd/tool.go")
        );
        assert_eq!(
            root_relative(tmp.path(), Path::new("./cmd/tool.go")),
            PathBuf::from("cmd/tool.go")
        );
        assert_eq!(
            root_relative(tmp.path(), Path::new("cmd/./../cmd/tool.go")),
            PathBuf::from("cmd/tool.go")
        );
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("./a/./b.go")), PathBuf::from("a/b.go"));
        assert_eq!(clean_path(Path::new("a/../b.go")), PathBuf::from("b.go"));
        assert_eq!(clean_path(Path::new("../b.go")), PathBuf::from("../b.go"));
        assert_eq!(clean_path(Path::new("/../b.go")), PathBuf::from("/b.go"));
        assert_eq!(clean_path(Path::new(".")), PathBuf::new());
    }
}
