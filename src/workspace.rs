//! # Workspace Operations
//!
//! A [`Workspace`] is one repository root together with the records of its
//! descriptor file. Every command of the binary is a method here: the CLI
//! layer only parses arguments and prints results.
//!
//! Requested paths are normalized and must be described; an unknown path is
//! a fatal error for the whole invocation. Bulk operations skip disabled
//! records with a log line.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::defaults::{DESCRIPTOR_FILENAME, IGNORE_FILENAME};
use crate::descriptor::{self, Submodules};
use crate::error::{Error, Result};
use crate::ignore;
use crate::path::{self, clone_dir, normalize_checked, relative_to};
use crate::reconcile::reconcile_file;
use crate::record::{Record, Target};
use crate::repository::{GitOperations, Synchronizer};
use crate::traversal::{self, CommandRunner, ForeachOptions};

/// Observed state of one described submodule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub path: String,
    pub enabled: bool,
    pub target: String,
    pub target_overrides_commit: bool,
    pub recorded_commit: Option<String>,
    pub cloned: bool,
    pub current_commit: Option<String>,
    pub dirty: Option<bool>,
    /// Hash the branch/tag target currently points at on the first source.
    pub remote_tip: Option<String>,
}

impl Status {
    /// Whether the clone sits on the recorded commit.
    pub fn is_at_recorded_commit(&self) -> bool {
        self.current_commit.is_some() && self.current_commit == self.recorded_commit
    }
}

/// One node of the nested descriptor tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: String,
    pub enabled: bool,
    pub target: String,
    pub cloned: bool,
    pub children: Vec<usize>,
}

/// Nested descriptors flattened into an arena; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorTree {
    pub nodes: Vec<TreeNode>,
}

impl DescriptorTree {
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }
}

pub struct Workspace {
    root: PathBuf,
    submodules: Submodules,
    sync: Synchronizer,
}

impl Workspace {
    /// Load the descriptor of `root`, using the system `git`.
    pub fn open(root: &Path) -> Result<Self> {
        Self::with_synchronizer(root, Synchronizer::new())
    }

    pub fn with_synchronizer(root: &Path, sync: Synchronizer) -> Result<Self> {
        let submodules = descriptor::from_file(&root.join(DESCRIPTOR_FILENAME))?;
        Ok(Self {
            root: root.to_path_buf(),
            submodules,
            sync,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn submodules(&self) -> &Submodules {
        &self.submodules
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_FILENAME)
    }

    pub fn ignore_path(&self) -> PathBuf {
        self.root.join(IGNORE_FILENAME)
    }

    fn git(&self) -> &dyn GitOperations {
        self.sync.git()
    }

    /// Records named by `paths`, or every record when `paths` is empty.
    pub fn records_for(&self, paths: &[String]) -> Result<Vec<Record>> {
        if paths.is_empty() {
            return Ok(self.submodules.records().to_vec());
        }

        paths
            .iter()
            .map(|path| {
                let path = normalize_checked(path)?;
                self.submodules
                    .get(&path)
                    .cloned()
                    .ok_or(Error::UnknownSubmodule { path })
            })
            .collect()
    }

    /// Like [`Workspace::records_for`], without disabled records.
    pub fn select(&self, paths: &[String]) -> Result<Vec<Record>> {
        let records = self.records_for(paths)?;
        Ok(records
            .into_iter()
            .filter(|record| {
                if !record.is_enabled() {
                    info!("Submodule \"{}\" is disabled, skipping", record.path());
                }
                record.is_enabled()
            })
            .collect())
    }

    /// Write the in-memory records back, dropping the stanzas of `remove`.
    pub fn save(&self, remove: &BTreeSet<String>) -> Result<()> {
        reconcile_file(&self.descriptor_path(), &self.submodules, remove)
    }

    /// Clone or update the selected submodules and everything nested in
    /// them. Each submodule is listed in the ignore file as soon as its tree
    /// is synced, so a later failure keeps earlier clones ignored.
    pub fn clone(&self, paths: &[String]) -> Result<Vec<String>> {
        let mut cloned = Vec::new();

        for record in self.select(paths)? {
            let synced =
                traversal::clone_tree(&self.sync, std::slice::from_ref(&record), &self.root)?;
            if !synced.is_empty() {
                ignore::add_entries(&self.ignore_path(), synced.iter().map(String::as_str))?;
            }
            cloned.extend(synced);
        }

        Ok(cloned)
    }

    /// Refresh `record` from its clone: current commit and remote URLs.
    ///
    /// Remotes already known as named sources update that named source;
    /// every other remote URL becomes an anonymous source. Returns `false`
    /// when there is no readable clone.
    pub fn update_description(&self, record: &mut Record) -> bool {
        let dir = clone_dir(&self.root, record.path());
        if !dir.is_dir() || !self.git().is_repository_root(&dir) {
            warn!(
                "No repository at \"{}\", description of \"{}\" not updated",
                dir.display(),
                record.path()
            );
            return false;
        }

        let commit = match self.git().current_commit(&dir) {
            Ok(commit) => commit,
            Err(e) => {
                warn!("Could not read commit of \"{}\": {}", record.path(), e);
                return false;
            }
        };
        record.set_commit(commit);

        match self.git().remotes(&dir) {
            Ok(remotes) => {
                for (name, url) in remotes {
                    if record.named_sources().contains_key(&name) {
                        record.set_named_source(name, url);
                    } else {
                        record.add_source(url);
                    }
                }
            }
            Err(e) => warn!("Could not read remotes of \"{}\": {}", record.path(), e),
        }

        true
    }

    /// Refresh the descriptions of the selected submodules and save.
    pub fn update_descriptions(&mut self, paths: &[String]) -> Result<Vec<String>> {
        let mut updated = Vec::new();

        for mut record in self.select(paths)? {
            if self.update_description(&mut record) {
                updated.push(record.path().to_string());
                self.submodules.insert(record);
            }
        }

        self.save(&BTreeSet::new())?;
        ignore::add_entries(&self.ignore_path(), updated.iter().map(String::as_str))?;
        Ok(updated)
    }

    /// Describe existing clones that the descriptor does not know yet.
    pub fn add(&mut self, paths: &[String]) -> Result<Vec<String>> {
        let mut added = Vec::new();

        for path in paths {
            let path = normalize_checked(path)?;
            if self.submodules.contains(&path) {
                info!("Submodule \"{}\" is already described", path);
                continue;
            }

            let mut record = Record::new(path.as_str());
            if self.update_description(&mut record) {
                added.push(path);
                self.submodules.insert(record);
            }
        }

        self.save(&BTreeSet::new())?;
        ignore::add_entries(&self.ignore_path(), added.iter().map(String::as_str))?;
        Ok(added)
    }

    /// Drop records from the descriptor and the ignore file, optionally
    /// deleting their clones.
    pub fn remove(&mut self, paths: &[String], delete_clone: bool) -> Result<Vec<String>> {
        let records = self.records_for(paths)?;
        let remove: BTreeSet<String> = records.iter().map(|r| r.path().to_string()).collect();

        for path in &remove {
            self.submodules.remove(path);
        }
        self.save(&remove)?;
        ignore::prune_entries(&self.ignore_path(), remove.iter().map(String::as_str))?;

        if delete_clone {
            for path in &remove {
                let dir = clone_dir(&self.root, path);
                if dir.exists() {
                    info!("Deleting clone {}", dir.display());
                    fs::remove_dir_all(&dir)?;
                }
            }
        }

        Ok(remove.into_iter().collect())
    }

    pub fn set_enabled(&mut self, paths: &[String], enabled: bool) -> Result<Vec<String>> {
        let mut changed = Vec::new();

        for record in self.records_for(paths)? {
            if let Some(record) = self.submodules.get_mut(record.path()) {
                record.set_enabled(enabled);
                changed.push(record.path().to_string());
            }
        }

        self.save(&BTreeSet::new())?;
        Ok(changed)
    }

    pub fn set_target(&mut self, path: &str, target: Target, overrides_commit: bool) -> Result<()> {
        let path = normalize_checked(path)?;
        let record = self
            .submodules
            .get_mut(&path)
            .ok_or_else(|| Error::UnknownSubmodule { path: path.clone() })?;
        record.set_target(target, overrides_commit)?;

        self.save(&BTreeSet::new())
    }

    /// Delete the clones of the selected submodules. Clones with
    /// uncommitted changes are kept unless `force` is set.
    pub fn clear(&self, paths: &[String], force: bool) -> Result<Vec<String>> {
        let mut cleared = Vec::new();

        for record in self.select(paths)? {
            let dir = clone_dir(&self.root, record.path());
            if !dir.exists() {
                continue;
            }

            if !force && self.git().is_repository_root(&dir) {
                match self.git().has_uncommitted_changes(&dir) {
                    Ok(false) => {}
                    Ok(true) => {
                        warn!(
                            "Clone of \"{}\" has uncommitted changes, not cleared",
                            record.path()
                        );
                        continue;
                    }
                    Err(e) => {
                        warn!("Could not check \"{}\" for changes: {}", record.path(), e);
                        continue;
                    }
                }
            }

            fs::remove_dir_all(&dir)?;
            cleared.push(record.path().to_string());
        }

        Ok(cleared)
    }

    /// Run `command` for the described submodules.
    pub fn foreach(
        &self,
        runner: &dyn CommandRunner,
        command: &[String],
        options: ForeachOptions,
    ) -> Result<()> {
        traversal::foreach_tree(
            runner,
            self.submodules.records(),
            &self.root,
            command,
            options,
        )
    }

    /// Observed state of the requested submodules, disabled ones included.
    pub fn status(&self, paths: &[String]) -> Result<Vec<Status>> {
        let records = self.records_for(paths)?;
        Ok(records.iter().map(|record| self.status_of(record)).collect())
    }

    fn status_of(&self, record: &Record) -> Status {
        let dir = clone_dir(&self.root, record.path());
        let cloned = dir.is_dir() && self.git().is_repository_root(&dir);

        let (current_commit, dirty) = if cloned {
            (
                self.git()
                    .current_commit(&dir)
                    .map_err(|e| warn!("Could not read commit of \"{}\": {}", record.path(), e))
                    .ok(),
                self.git()
                    .has_uncommitted_changes(&dir)
                    .map_err(|e| warn!("Could not check \"{}\" for changes: {}", record.path(), e))
                    .ok(),
            )
        } else {
            (None, None)
        };

        let remote_tip = match (record.target().value(), record.sources().first()) {
            (Some(reference), Some(source)) => self
                .git()
                .ls_remote(source, reference)
                .unwrap_or_else(|e| {
                    warn!("Could not resolve {} on {}: {}", reference, source, e);
                    None
                }),
            _ => None,
        };

        Status {
            path: record.path().to_string(),
            enabled: record.is_enabled(),
            target: record.target().to_string(),
            target_overrides_commit: record.target_overrides_commit(),
            recorded_commit: record.commit().map(str::to_string),
            cloned,
            current_commit,
            dirty,
            remote_tip,
        }
    }

    /// Find repositories below `dirs` that are not described yet and add
    /// them. The walk does not descend into repositories it finds.
    pub fn seek(&mut self, dirs: &[PathBuf]) -> Result<Vec<String>> {
        let mut found = Vec::new();
        let mut worklist: Vec<PathBuf> = dirs
            .iter()
            .rev()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    self.root.join(dir)
                }
            })
            .collect();

        while let Some(dir) = worklist.pop() {
            if dir != self.root && self.git().is_repository_root(&dir) {
                match relative_to(&self.root, &dir) {
                    Some(path) if path::validate(&path).is_err() => {
                        warn!("{} is outside the repository, skipping", dir.display())
                    }
                    Some(path) if !self.submodules.contains(&path) => found.push(path),
                    Some(_) => {}
                    None => warn!("{} is outside the repository, skipping", dir.display()),
                }
                continue;
            }

            let mut children = Vec::new();
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_name() == ".git" || !entry.file_type()?.is_dir() {
                    continue;
                }
                children.push(entry.path());
            }
            children.sort();
            worklist.extend(children.into_iter().rev());
        }

        self.add(&found)
    }

    /// Nested descriptor tree, `max_depth` levels below the root.
    pub fn tree(&self, max_depth: Option<usize>) -> Result<DescriptorTree> {
        let mut nodes = vec![TreeNode {
            path: self.root.display().to_string(),
            enabled: true,
            target: String::new(),
            cloned: true,
            children: Vec::new(),
        }];

        // (parent node, directory holding the records, records, depth)
        let mut worklist = vec![(0, self.root.clone(), self.submodules.records().to_vec(), 1)];

        while let Some((parent, dir, records, depth)) = worklist.pop() {
            for record in records {
                let child_dir = clone_dir(&dir, record.path());
                let index = nodes.len();
                nodes.push(TreeNode {
                    path: record.path().to_string(),
                    enabled: record.is_enabled(),
                    target: record.target().to_string(),
                    cloned: child_dir.is_dir(),
                    children: Vec::new(),
                });
                nodes[parent].children.push(index);

                if max_depth.map_or(true, |max| depth < max) {
                    let nested =
                        descriptor::from_file(&child_dir.join(DESCRIPTOR_FILENAME))?;
                    if !nested.is_empty() {
                        worklist.push((index, child_dir, nested.records().to_vec(), depth + 1));
                    }
                }
            }
        }

        Ok(DescriptorTree { nodes })
    }
}
