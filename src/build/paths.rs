//! Path utilities shared by the build and watch layers.

use std::path::{Path, PathBuf};

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Whether any component of `path` is a hidden (dot) file or directory.
///
/// `.` and `..` are not hidden.
pub fn is_hidden(path: &Path) -> bool {
    path.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        name.starts_with('.') && name != "." && name != ".."
    })
}

/// Like [`is_hidden`], but only looks at the components below `base`, so a
/// project living inside a dot directory still gets its changes noticed.
pub fn is_hidden_below(base: &Path, path: &Path) -> bool {
    is_hidden(path.strip_prefix(base).unwrap_or(path))
}

/// Canonicalize a path, falling back to the path itself when that fails
/// (e.g. it does not exist yet).
pub fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
