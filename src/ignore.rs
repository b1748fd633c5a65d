//! Ignore-list maintenance
//!
//! Clones of described submodules must not be committed to the enclosing
//! repository, so their paths are listed in the sibling `.gitignore`. Edits
//! are line based: existing lines are never reordered, entries are added at
//! most once and removed wherever they appear.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use crate::error::Result;

/// Whether `line` already ignores `entry`. `lib/x`, `/lib/x` and `lib/x/`
/// are treated as the same entry.
fn matches_entry(line: &str, entry: &str) -> bool {
    let normalize = |s: &str| s.trim().trim_start_matches('/').trim_end_matches('/').to_string();
    let line = normalize(line);
    !line.is_empty() && line == normalize(entry)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn ensure_trailing_newline(mut content: String) -> String {
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

/// Append each entry not yet present, creating the file when needed.
///
/// Returns the number of lines added.
pub fn add_entries<'a, I>(ignore_path: &Path, entries: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let existing = read_optional(ignore_path)?;
    let mut content = ensure_trailing_newline(existing.clone().unwrap_or_default());
    let mut added = 0;

    for entry in entries {
        if content.lines().any(|line| matches_entry(line, entry)) {
            continue;
        }
        content.push_str(entry);
        content.push('\n');
        added += 1;
    }

    if added > 0 || existing.is_none() {
        debug!("Adding {} entries to {}", added, ignore_path.display());
        fs::write(ignore_path, content)?;
    }
    Ok(added)
}

/// Remove every line naming one of `entries`. A missing file is left
/// missing.
///
/// Returns the number of lines removed.
pub fn prune_entries<'a, I>(ignore_path: &Path, entries: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let Some(content) = read_optional(ignore_path)? else {
        return Ok(0);
    };
    let entries: Vec<&str> = entries.into_iter().collect();

    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;
    for line in content.lines() {
        if entries.iter().any(|entry| matches_entry(line, entry)) {
            removed += 1;
            continue;
        }
        kept.push_str(line);
        kept.push('\n');
    }

    if removed > 0 {
        debug!("Pruning {} entries from {}", removed, ignore_path.display());
        fs::write(ignore_path, kept)?;
    }
    Ok(removed)
}
