//! Mock implementations shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::git::ConfigScope;
use crate::repository::GitOperations;
use crate::traversal::CommandRunner;

/// File a mock clone writes, holding the URL it was cloned from.
pub const CLONE_MARKER: &str = "CLONED_FROM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub dir: PathBuf,
    pub arg: String,
}

/// Records every state-changing git operation and simulates clones on disk.
#[derive(Default)]
pub struct MockGitOperations {
    pub calls: Arc<Mutex<Vec<Call>>>,
    repositories: HashSet<PathBuf>,
    failing_clones: HashSet<String>,
    failing_checkouts: HashSet<String>,
    failing_probe_checkout: bool,
    failing_merge: bool,
    clone_files: HashMap<String, Vec<(String, String)>>,
    commits: HashMap<PathBuf, String>,
    remotes: HashMap<PathBuf, Vec<(String, String)>>,
    dirty: HashSet<PathBuf>,
    remote_refs: HashMap<(String, String), String>,
}

impl MockGitOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `dir` as an existing working copy root.
    pub fn with_repository(mut self, dir: &Path) -> Self {
        self.repositories.insert(dir.to_path_buf());
        self
    }

    pub fn failing_clone_from(mut self, url: &str) -> Self {
        self.failing_clones.insert(url.to_string());
        self
    }

    /// Clones from `url` succeed but checking anything out in them fails.
    pub fn failing_checkout_from(mut self, url: &str) -> Self {
        self.failing_checkouts.insert(url.to_string());
        self
    }

    /// Checkouts in directories that were not cloned by this mock fail.
    pub fn failing_probe_checkout(mut self) -> Self {
        self.failing_probe_checkout = true;
        self
    }

    pub fn failing_merge(mut self) -> Self {
        self.failing_merge = true;
        self
    }

    /// Write `name` with `content` into every clone of `url`.
    pub fn with_clone_file(mut self, url: &str, name: &str, content: &str) -> Self {
        self.clone_files
            .entry(url.to_string())
            .or_default()
            .push((name.to_string(), content.to_string()));
        self
    }

    pub fn with_commit(mut self, dir: &Path, commit: &str) -> Self {
        self.commits.insert(dir.to_path_buf(), commit.to_string());
        self
    }

    pub fn with_remote(mut self, dir: &Path, name: &str, url: &str) -> Self {
        self.remotes
            .entry(dir.to_path_buf())
            .or_default()
            .push((name.to_string(), url.to_string()));
        self
    }

    pub fn with_dirty(mut self, dir: &Path) -> Self {
        self.dirty.insert(dir.to_path_buf());
        self
    }

    pub fn with_remote_ref(mut self, url: &str, reference: &str, hash: &str) -> Self {
        self.remote_refs
            .insert((url.to_string(), reference.to_string()), hash.to_string());
        self
    }

    fn record(&self, op: &'static str, dir: &Path, arg: impl Into<String>) {
        self.calls.lock().unwrap().push(Call {
            op,
            dir: dir.to_path_buf(),
            arg: arg.into(),
        });
    }

    fn failure(command: &str, dir: &Path) -> Error {
        Error::GitCommand {
            command: command.to_string(),
            dir: dir.to_path_buf(),
            stderr: "mock failure".to_string(),
        }
    }
}

impl GitOperations for MockGitOperations {
    fn is_repository_root(&self, dir: &Path) -> bool {
        self.repositories.contains(dir) || dir.join(CLONE_MARKER).exists()
    }

    fn current_commit(&self, dir: &Path) -> Result<String> {
        self.commits
            .get(dir)
            .cloned()
            .ok_or_else(|| Self::failure("rev-parse HEAD", dir))
    }

    fn remotes(&self, dir: &Path) -> Result<Vec<(String, String)>> {
        Ok(self.remotes.get(dir).cloned().unwrap_or_default())
    }

    fn fetch_all(&self, dir: &Path) -> Result<()> {
        self.record("fetch", dir, "");
        Ok(())
    }

    fn checkout(&self, dir: &Path, target: &str) -> Result<()> {
        self.record("checkout", dir, target);

        match fs::read_to_string(dir.join(CLONE_MARKER)) {
            Ok(url) if self.failing_checkouts.contains(&url) => {
                Err(Self::failure("checkout", dir))
            }
            Ok(_) => Ok(()),
            Err(_) if self.failing_probe_checkout => Err(Self::failure("checkout", dir)),
            Err(_) => Ok(()),
        }
    }

    fn clone_repository(&self, url: &str, dir: &Path) -> Result<()> {
        self.record("clone", dir, url);

        if self.failing_clones.contains(url) {
            return Err(Error::GitClone {
                url: url.to_string(),
                message: "mock failure".to_string(),
            });
        }

        fs::create_dir_all(dir)?;
        fs::write(dir.join(CLONE_MARKER), url)?;
        for (name, content) in self.clone_files.get(url).into_iter().flatten() {
            let file = dir.join(name);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(file, content)?;
        }
        Ok(())
    }

    fn merge(&self, dir: &Path) -> Result<()> {
        self.record("merge", dir, "");
        if self.failing_merge {
            return Err(Self::failure("merge", dir));
        }
        Ok(())
    }

    fn set_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()> {
        self.record("set_remote", dir, format!("{} {}", name, url));
        Ok(())
    }

    fn has_uncommitted_changes(&self, dir: &Path) -> Result<bool> {
        Ok(self.dirty.contains(dir))
    }

    fn ls_remote(&self, url: &str, reference: &str) -> Result<Option<String>> {
        Ok(self
            .remote_refs
            .get(&(url.to_string(), reference.to_string()))
            .cloned())
    }

    fn default_remote(&self, _dir: &Path, _scope: ConfigScope) -> Result<Option<String>> {
        Ok(None)
    }

    fn set_default_remote(&self, dir: &Path, _scope: ConfigScope, name: &str) -> Result<()> {
        self.record("set_default_remote", dir, name);
        Ok(())
    }

    fn init_official_submodules(&self, dir: &Path) -> Result<()> {
        self.record("init_submodules", dir, "");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

/// Records commands instead of running them.
#[derive(Default)]
pub struct MockCommandRunner {
    pub invocations: Arc<Mutex<Vec<Invocation>>>,
    /// Exit with failure when the `SUBMODULE_PATH` variable equals this.
    pub fail_for: Option<String>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, path: &str) -> Self {
        self.fail_for = Some(path.to_string());
        self
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, command: &[String], cwd: &Path, env: &[(String, String)]) -> Result<()> {
        self.invocations.lock().unwrap().push(Invocation {
            command: command.to_vec(),
            cwd: cwd.to_path_buf(),
            env: env.to_vec(),
        });

        let path = env
            .iter()
            .find(|(key, _)| key == "SUBMODULE_PATH")
            .map(|(_, value)| value.as_str());
        if self.fail_for.is_some() && self.fail_for.as_deref() == path {
            return Err(Error::CommandFailed {
                command: command.join(" "),
                path: cwd.to_path_buf(),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}
