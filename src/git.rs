//! Wrappers around the system `git` command.
//!
//! Only two things are read back from `git`: the exit status and the lines it
//! prints on stdout. Using the system binary means SSH keys, credential
//! helpers and everything configured in `~/.gitconfig` apply to clones and
//! fetches without any handling here.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

/// Which git configuration file a setting is read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Local,
    Global,
}

impl ConfigScope {
    fn flag(&self) -> &'static str {
        match self {
            ConfigScope::Local => "--local",
            ConfigScope::Global => "--global",
        }
    }
}

fn spawn(dir: &Path, args: &[&str]) -> Result<Output> {
    debug!("git {} (in {})", args.join(" "), dir.display());
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            stderr: e.to_string(),
        })
}

/// Run `git` in `dir` and return its stdout, failing on a non-zero exit.
fn run(dir: &Path, args: &[&str]) -> Result<String> {
    let output = spawn(dir, args)?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

static HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9A-Za-z]+").expect("hash pattern is a valid regex"));

/// First alphanumeric run of a line, the way hashes are read from git output.
pub fn first_hash(line: &str) -> Option<String> {
    HASH.find(line).map(|m| m.as_str().to_string())
}

/// Top level of the working copy containing `dir`.
pub fn find_root(dir: &Path) -> Result<PathBuf> {
    let stdout = run(dir, &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(stdout.trim()))
}

/// Whether `dir` is itself the top level of a working copy.
pub fn is_repository_root(dir: &Path) -> bool {
    let Ok(toplevel) = find_root(dir) else {
        return false;
    };

    match (fs::canonicalize(&toplevel), fs::canonicalize(dir)) {
        (Ok(toplevel), Ok(dir)) => toplevel == dir,
        _ => false,
    }
}

/// Hash of the commit checked out in `dir`.
pub fn current_commit(dir: &Path) -> Result<String> {
    let stdout = run(dir, &["rev-parse", "HEAD"])?;

    for line in stdout.lines() {
        if let Some(hash) = first_hash(line) {
            return Ok(hash);
        }
    }

    Err(Error::GitCommand {
        command: "rev-parse HEAD".to_string(),
        dir: dir.to_path_buf(),
        stderr: "no commit hash in output".to_string(),
    })
}

/// Remote names of the clone in `dir`, each with its fetch URL.
pub fn remotes(dir: &Path) -> Result<Vec<(String, String)>> {
    let names = run(dir, &["remote"])?;
    let mut result = Vec::new();

    for name in names.lines().map(str::trim).filter(|n| !n.is_empty()) {
        let url = run(dir, &["remote", "get-url", name])?;
        result.push((name.to_string(), url.trim().to_string()));
    }

    Ok(result)
}

pub fn fetch_all(dir: &Path) -> Result<()> {
    run(dir, &["fetch", "--all"]).map(drop)
}

pub fn checkout(dir: &Path, target: &str) -> Result<()> {
    run(dir, &["checkout", target])
        .map(drop)
        .map_err(|e| Error::GitCheckout {
            target: target.to_string(),
            message: e.to_string(),
        })
}

/// Clone `url` into `target_dir`, which must be absent or empty.
///
/// Relative local sources resolve against the parent of `target_dir`.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    let target_dir = std::path::absolute(target_dir)?;
    let parent = target_dir.parent().unwrap_or(&target_dir);
    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(&target_dir)
        .current_dir(parent)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Authentication failures are the most common cause; say so
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                Error: {}",
                stderr.trim()
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message,
        });
    }

    Ok(())
}

/// Merge the upstream of the checked-out branch.
pub fn merge(dir: &Path) -> Result<()> {
    run(dir, &["merge"]).map(drop)
}

/// Register `name` as a remote, replacing its URL when it already exists.
pub fn set_remote(dir: &Path, name: &str, url: &str) -> Result<()> {
    if run(dir, &["remote", "add", name, url]).is_ok() {
        return Ok(());
    }
    run(dir, &["remote", "set-url", name, url]).map(drop)
}

pub fn has_uncommitted_changes(dir: &Path) -> Result<bool> {
    let stdout = run(dir, &["status", "--porcelain"])?;
    Ok(stdout.lines().any(|line| !line.trim().is_empty()))
}

/// Hash a remote ref currently points at, if the remote has it.
pub fn ls_remote(url: &str, reference: &str) -> Result<Option<String>> {
    let cwd = std::env::temp_dir();
    let stdout = run(&cwd, &["ls-remote", url, reference])?;

    // Output format: <hash>\t<ref>
    Ok(stdout.lines().next().and_then(first_hash))
}

/// Value of `checkout.defaultRemote`, `None` when unset.
pub fn default_remote(dir: &Path, scope: ConfigScope) -> Result<Option<String>> {
    let output = spawn(
        dir,
        &["config", scope.flag(), "--get", "checkout.defaultRemote"],
    )?;

    // `git config --get` exits with 1 when the key is missing
    match output.status.code() {
        Some(0) => {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Ok(Some(value).filter(|v| !v.is_empty()))
        }
        Some(1) => Ok(None),
        _ => Err(Error::GitCommand {
            command: "config --get checkout.defaultRemote".to_string(),
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
    }
}

pub fn set_default_remote(dir: &Path, scope: ConfigScope, name: &str) -> Result<()> {
    run(dir, &["config", scope.flag(), "checkout.defaultRemote", name]).map(drop)
}

/// Initialize official Git submodules (`.gitmodules`) of the clone in `dir`.
pub fn init_official_submodules(dir: &Path) -> Result<()> {
    run(dir, &["submodule", "update", "--init", "--recursive"]).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_hash_reads_leading_run() {
        assert_eq!(
            first_hash("4f1c0de9a\trefs/heads/main"),
            Some("4f1c0de9a".to_string())
        );
        assert_eq!(
            first_hash("  abc123\n"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_first_hash_empty_line() {
        assert_eq!(first_hash(""), None);
        assert_eq!(first_hash("  \t "), None);
    }

    #[test]
    fn test_config_scope_flags() {
        assert_eq!(ConfigScope::Local.flag(), "--local");
        assert_eq!(ConfigScope::Global.flag(), "--global");
    }

    #[test]
    fn test_plain_directory_is_not_repository_root() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("plain");
        fs::create_dir_all(&plain).unwrap();

        // Either git is missing or the temp dir is not a working copy root
        assert!(!is_repository_root(&plain));
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_init_repository_is_root_and_has_commit() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        run(dir, &["init", "-q"]).unwrap();
        run(dir, &["config", "user.email", "dev@example.com"]).unwrap();
        run(dir, &["config", "user.name", "Dev"]).unwrap();
        fs::write(dir.join("README"), "hello").unwrap();
        run(dir, &["add", "README"]).unwrap();
        run(dir, &["commit", "-q", "-m", "init"]).unwrap();

        assert!(is_repository_root(dir));
        let commit = current_commit(dir).unwrap();
        assert_eq!(commit.len(), 40);
        assert!(!has_uncommitted_changes(dir).unwrap());

        fs::write(dir.join("README"), "changed").unwrap();
        assert!(has_uncommitted_changes(dir).unwrap());
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_remotes_lists_names_and_urls() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        run(dir, &["init", "-q"]).unwrap();
        set_remote(dir, "origin", "https://example.com/a.git").unwrap();
        set_remote(dir, "upstream", "https://example.com/b.git").unwrap();
        set_remote(dir, "origin", "https://example.com/c.git").unwrap();

        let remotes = remotes(dir).unwrap();
        assert!(remotes.contains(&(
            "origin".to_string(),
            "https://example.com/c.git".to_string()
        )));
        assert!(remotes.contains(&(
            "upstream".to_string(),
            "https://example.com/b.git".to_string()
        )));
    }
}
