//! # Repository Synchronization
//!
//! This module brings a local clone to the checkout goal of its [`Record`].
//!
//! ## Design
//!
//! Every interaction with `git` goes through the [`GitOperations`] trait.
//! [`DefaultGitOperations`] forwards to the system binary (see
//! [`crate::git`]); tests substitute a mock to drive the state machine
//! without touching the network.
//!
//! ## State machine
//!
//! [`Synchronizer::sync`] resolves a [`CheckoutPlan`] and then:
//!
//! 1. **Probe**: when the clone directory already is a working copy root, it
//!    fetches all remotes and checks out the target. On failure the directory
//!    is wiped and recreated empty.
//! 2. **Fallback clone**: each source is tried once, in order. A failed clone
//!    moves on to the next source; a failed checkout wipes the directory
//!    first.
//! 3. When all sources are exhausted the call fails with
//!    [`Error::SourcesExhausted`].
//!
//! After a successful checkout of a branch target the upstream is merged and
//! the record's named sources are registered as remotes; both steps are
//! best-effort. On return the directory is either a checkout at the target
//! or empty.

use std::fs;
use std::path::Path;

use log::{error, info, warn};

use crate::defaults::DEFAULT_REMOTE;
use crate::error::{Error, Result};
use crate::git::ConfigScope;
use crate::record::{Record, Target};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Whether `dir` is the top level of a working copy.
    fn is_repository_root(&self, dir: &Path) -> bool;

    /// Hash of the checked-out commit.
    fn current_commit(&self, dir: &Path) -> Result<String>;

    /// Remote names and their URLs.
    fn remotes(&self, dir: &Path) -> Result<Vec<(String, String)>>;

    fn fetch_all(&self, dir: &Path) -> Result<()>;

    fn checkout(&self, dir: &Path, target: &str) -> Result<()>;

    /// Clone `url` into the (empty) directory `dir`.
    fn clone_repository(&self, url: &str, dir: &Path) -> Result<()>;

    /// Merge the fetched upstream into the current branch.
    fn merge(&self, dir: &Path) -> Result<()>;

    /// Add a named remote, or update its URL.
    fn set_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()>;

    fn has_uncommitted_changes(&self, dir: &Path) -> Result<bool>;

    /// Resolve a remote ref to the hash it points at.
    fn ls_remote(&self, url: &str, reference: &str) -> Result<Option<String>>;

    fn default_remote(&self, dir: &Path, scope: ConfigScope) -> Result<Option<String>>;

    fn set_default_remote(&self, dir: &Path, scope: ConfigScope, name: &str) -> Result<()>;

    /// Materialize official Git submodules inside a clone.
    fn init_official_submodules(&self, dir: &Path) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn is_repository_root(&self, dir: &Path) -> bool {
        crate::git::is_repository_root(dir)
    }

    fn current_commit(&self, dir: &Path) -> Result<String> {
        crate::git::current_commit(dir)
    }

    fn remotes(&self, dir: &Path) -> Result<Vec<(String, String)>> {
        crate::git::remotes(dir)
    }

    fn fetch_all(&self, dir: &Path) -> Result<()> {
        crate::git::fetch_all(dir)
    }

    fn checkout(&self, dir: &Path, target: &str) -> Result<()> {
        crate::git::checkout(dir, target)
    }

    fn clone_repository(&self, url: &str, dir: &Path) -> Result<()> {
        crate::git::clone(url, dir)
    }

    fn merge(&self, dir: &Path) -> Result<()> {
        crate::git::merge(dir)
    }

    fn set_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()> {
        crate::git::set_remote(dir, name, url)
    }

    fn has_uncommitted_changes(&self, dir: &Path) -> Result<bool> {
        crate::git::has_uncommitted_changes(dir)
    }

    fn ls_remote(&self, url: &str, reference: &str) -> Result<Option<String>> {
        crate::git::ls_remote(url, reference)
    }

    fn default_remote(&self, dir: &Path, scope: ConfigScope) -> Result<Option<String>> {
        crate::git::default_remote(dir, scope)
    }

    fn set_default_remote(&self, dir: &Path, scope: ConfigScope, name: &str) -> Result<()> {
        crate::git::set_default_remote(dir, scope, name)
    }

    fn init_official_submodules(&self, dir: &Path) -> Result<()> {
        crate::git::init_official_submodules(dir)
    }
}

/// What to check out for a record, and whether to merge afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub target: String,
    pub merge: bool,
}

impl CheckoutPlan {
    /// Resolve the effective checkout target of `record`.
    ///
    /// A live branch/tag is used only when the record overrides its commit;
    /// only branch targets are merged. Otherwise the recorded commit is the
    /// target, and `None` is returned when there is none.
    pub fn for_record(record: &Record) -> Option<CheckoutPlan> {
        if record.target_overrides_commit() {
            match record.target() {
                Target::Branch(name) => {
                    return Some(CheckoutPlan {
                        target: name.clone(),
                        merge: true,
                    })
                }
                Target::Tag(name) => {
                    return Some(CheckoutPlan {
                        target: name.clone(),
                        merge: false,
                    })
                }
                Target::Commit => {}
            }
        }

        record.commit().map(|commit| CheckoutPlan {
            target: commit.to_string(),
            merge: false,
        })
    }
}

/// Drives `git` to bring local clones to their records' targets.
pub struct Synchronizer {
    git_ops: Box<dyn GitOperations>,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synchronizer {
    /// Creates a `Synchronizer` backed by the system `git` binary.
    pub fn new() -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations),
        }
    }

    /// Creates a `Synchronizer` with a custom `GitOperations`
    /// implementation, typically a mock.
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    pub fn git(&self) -> &dyn GitOperations {
        self.git_ops.as_ref()
    }

    /// Bring the clone at `clone_dir` to the target of `record`.
    pub fn sync(&self, record: &Record, clone_dir: &Path) -> Result<()> {
        let plan = CheckoutPlan::for_record(record).ok_or_else(|| Error::MissingCommit {
            path: record.path().to_string(),
        })?;

        fs::create_dir_all(clone_dir)?;

        if self.git_ops.is_repository_root(clone_dir) {
            match self.update_existing(clone_dir, &plan) {
                Ok(()) => {
                    info!("Submodule \"{}\" checked out at {}", record.path(), plan.target);
                    self.finish(record, clone_dir, &plan);
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "Could not update existing clone of \"{}\": {}; cloning again",
                        record.path(),
                        e
                    );
                    reset_dir(clone_dir)?;
                }
            }
        } else if !is_empty_dir(clone_dir)? {
            return Err(Error::DirectoryOccupied {
                path: clone_dir.to_path_buf(),
            });
        }

        for source in record.sources() {
            info!("Cloning submodule \"{}\" from \"{}\"", record.path(), source);

            if let Err(e) = self.git_ops.clone_repository(source, clone_dir) {
                warn!("Failed to clone \"{}\": {}", source, e);
                if !is_empty_dir(clone_dir)? {
                    reset_dir(clone_dir)?;
                }
                continue;
            }

            self.prepare_default_remote(clone_dir, &plan);

            match self.git_ops.checkout(clone_dir, &plan.target) {
                Ok(()) => {
                    info!("Submodule \"{}\" cloned at {}", record.path(), plan.target);
                    self.finish(record, clone_dir, &plan);
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "Failed to check out {} from source \"{}\": {}; removed cloned repository",
                        plan.target, source, e
                    );
                    reset_dir(clone_dir)?;
                }
            }
        }

        error!("Could not clone submodule \"{}\"", record.path());
        Err(Error::SourcesExhausted {
            path: record.path().to_string(),
            target: plan.target,
        })
    }

    fn update_existing(&self, clone_dir: &Path, plan: &CheckoutPlan) -> Result<()> {
        self.git_ops.fetch_all(clone_dir)?;
        self.prepare_default_remote(clone_dir, plan);
        self.git_ops.checkout(clone_dir, &plan.target)
    }

    /// Pin `checkout.defaultRemote` so branch names resolve to one remote
    /// when several remotes carry the same branch.
    fn prepare_default_remote(&self, clone_dir: &Path, plan: &CheckoutPlan) {
        if !plan.merge {
            return;
        }

        let configured = [ConfigScope::Local, ConfigScope::Global]
            .iter()
            .any(|&scope| matches!(self.git_ops.default_remote(clone_dir, scope), Ok(Some(_))));
        if configured {
            return;
        }

        if let Err(e) =
            self.git_ops
                .set_default_remote(clone_dir, ConfigScope::Local, DEFAULT_REMOTE)
        {
            warn!("Could not set checkout.defaultRemote: {}", e);
        }
    }

    fn finish(&self, record: &Record, clone_dir: &Path, plan: &CheckoutPlan) {
        if plan.merge {
            if let Err(e) = self.git_ops.merge(clone_dir) {
                warn!("Merge after checkout failed for \"{}\": {}", record.path(), e);
            }
        }

        for (name, url) in record.named_sources() {
            if let Err(e) = self.git_ops.set_remote(clone_dir, name, url) {
                warn!(
                    "Could not register remote \"{}\" for \"{}\": {}",
                    name,
                    record.path(),
                    e
                );
            }
        }
    }
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Discard a clone and leave an empty directory in its place.
fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
