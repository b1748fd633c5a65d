//! Path manipulation utilities for submodule paths
//!
//! Submodule paths are slash-separated and relative to the repository root
//! that owns the descriptor. They never carry a trailing separator, so
//! `lib/x/`, `./lib/x` and `lib\x` all name the same submodule.
//!
//! A valid path always names a directory strictly below its root: clones are
//! wiped and recreated on failure, so a path reaching the root itself or
//! anything outside it is rejected by [`validate`].

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Normalize a user- or file-supplied submodule path
pub fn normalize(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");

    while let Some(stripped) = normalized.strip_prefix("./") {
        normalized = stripped.to_string();
    }

    // Collapse doubled separators left by concatenation
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }

    normalized.trim_end_matches('/').to_string()
}

/// Check that a normalized submodule path stays below its repository root.
pub fn validate(path: &str) -> Result<()> {
    let reason = if path.is_empty() || path == "." {
        Some("it must name a directory below the repository root")
    } else if path.starts_with('/') || Path::new(path).is_absolute() {
        Some("absolute paths are not allowed")
    } else if path.split('/').any(|component| component == "..") {
        Some("`..` is not allowed")
    } else if path.split('/').any(|component| component == ".") {
        Some("`.` components are not allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// [`normalize`] then [`validate`] a user-supplied path.
pub fn normalize_checked(path: &str) -> Result<String> {
    let normalized = normalize(path);
    validate(&normalized)?;
    Ok(normalized)
}

/// Absolute location of a submodule clone below `root`
pub fn clone_dir(root: &Path, submodule_path: &str) -> PathBuf {
    submodule_path
        .split('/')
        .filter(|component| !component.is_empty())
        .fold(root.to_path_buf(), |dir, component| dir.join(component))
}

/// Express `dir` relative to `root` as a normalized submodule path
///
/// Returns `None` when `dir` is not below `root`.
pub fn relative_to(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let joined = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        None
    } else {
        Some(normalize(&joined))
    }
}
