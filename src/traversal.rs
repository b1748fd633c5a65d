//! Recursive walks over nested descriptor files.
//!
//! Both walks keep an explicit stack of frames instead of recursing, visit
//! nodes in pre-order and keep sibling order. A node's own descriptor lives
//! at the root of its clone, and the paths inside it are relative to that
//! clone.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};

use crate::defaults::{DESCRIPTOR_FILENAME, ENV_PREFIX, OFFICIAL_SUBMODULES_FILENAME};
use crate::descriptor;
use crate::error::{Error, Result};
use crate::path::clone_dir;
use crate::record::{render_flag, Record};
use crate::repository::Synchronizer;

/// Runs an external command for `foreach`.
pub trait CommandRunner {
    /// Run `command` in `cwd` with `env` added to the inherited environment,
    /// waiting for it to finish.
    fn run(&self, command: &[String], cwd: &Path, env: &[(String, String)]) -> Result<()>;
}

/// Spawns commands as child processes.
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &[String], cwd: &Path, env: &[(String, String)]) -> Result<()> {
        let Some((program, args)) = command.split_first() else {
            return Ok(());
        };

        debug!("Running `{}` in {}", command.join(" "), cwd.display());
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()?;

        if !status.success() {
            return Err(Error::CommandFailed {
                command: command.join(" "),
                path: cwd.to_path_buf(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

struct Frame {
    /// Directory holding the descriptor this record came from.
    parent: PathBuf,
    record: Record,
    /// Absolute paths of the enclosing submodules, outermost first.
    ancestors: Vec<PathBuf>,
}

fn push_children(stack: &mut Vec<Frame>, parent: &Path, records: &[Record], ancestors: &[PathBuf]) {
    for record in records.iter().rev() {
        stack.push(Frame {
            parent: parent.to_path_buf(),
            record: record.clone(),
            ancestors: ancestors.to_vec(),
        });
    }
}

fn nested_records(dir: &Path) -> Result<Vec<Record>> {
    let submodules = descriptor::from_file(&dir.join(DESCRIPTOR_FILENAME))?;
    Ok(submodules.records().to_vec())
}

/// Sync every enabled record, then descend into each clone's own
/// descriptor.
///
/// A clone directory occupied by files that are not a repository is left
/// alone with a warning, together with everything below it. Returns the
/// paths of the records from `records` that were synced.
pub fn clone_tree(sync: &Synchronizer, records: &[Record], root: &Path) -> Result<Vec<String>> {
    let mut synced = Vec::new();
    let mut stack = Vec::new();
    push_children(&mut stack, root, records, &[]);

    while let Some(frame) = stack.pop() {
        let record = &frame.record;
        if !record.is_enabled() {
            info!("Submodule \"{}\" is disabled, skipping", record.path());
            continue;
        }

        let dir = clone_dir(&frame.parent, record.path());
        match sync.sync(record, &dir) {
            Ok(()) => {}
            Err(e @ Error::DirectoryOccupied { .. }) => {
                warn!("Skipping submodule \"{}\": {}", record.path(), e);
                continue;
            }
            Err(e) => return Err(e),
        }
        if frame.parent.as_path() == root {
            synced.push(record.path().to_string());
        }

        if dir.join(OFFICIAL_SUBMODULES_FILENAME).is_file() {
            if let Err(e) = sync.git().init_official_submodules(&dir) {
                warn!(
                    "Could not initialize Git submodules of \"{}\": {}",
                    record.path(),
                    e
                );
            }
        }

        push_children(&mut stack, &dir, &nested_records(&dir)?, &[]);
    }

    Ok(synced)
}

/// Environment handed to a `foreach` command for one node.
pub fn foreach_environment(
    record: &Record,
    root: &Path,
    node: &Path,
    ancestors: &[PathBuf],
) -> Vec<(String, String)> {
    let named_sources: Vec<String> = record
        .named_sources()
        .iter()
        .map(|(name, url)| format!("{} {}", name, url))
        .collect();
    let parents: Vec<String> = ancestors
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let vars = [
        ("COMMIT", record.commit().unwrap_or_default().to_string()),
        ("ENABLED", render_flag(record.is_enabled()).to_string()),
        ("SOURCES", record.sources().join("\n")),
        ("NAMED_SOURCES", named_sources.join("\n")),
        ("TARGET_TYPE", record.target().target_type().to_string()),
        ("TARGET", record.effective_target_value().to_string()),
        (
            "TARGET_OVERRIDES_COMMIT",
            render_flag(record.target_overrides_commit()).to_string(),
        ),
        ("ROOT_PATH", root.display().to_string()),
        ("PATH", node.display().to_string()),
        ("REL_PATH", record.path().to_string()),
        ("PARENTS", parents.join("\n")),
    ];

    vars.into_iter()
        .map(|(name, value)| (format!("{}{}", ENV_PREFIX, name), value))
        .collect()
}

/// Options for [`foreach_tree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeachOptions {
    pub recursive: bool,
    pub enabled_only: bool,
}

/// Run `command` once per record, sequentially, from each record's parent
/// directory.
pub fn foreach_tree(
    runner: &dyn CommandRunner,
    records: &[Record],
    root: &Path,
    command: &[String],
    options: ForeachOptions,
) -> Result<()> {
    let mut stack = Vec::new();
    push_children(&mut stack, root, records, &[]);

    while let Some(frame) = stack.pop() {
        let record = &frame.record;
        if options.enabled_only && !record.is_enabled() {
            info!("Submodule \"{}\" is disabled, skipping", record.path());
            continue;
        }

        let node = clone_dir(&frame.parent, record.path());
        let env = foreach_environment(record, root, &node, &frame.ancestors);
        runner.run(command, &frame.parent, &env)?;

        if options.recursive {
            let mut ancestors = frame.ancestors.clone();
            ancestors.push(node.clone());
            push_children(&mut stack, &node, &nested_records(&node)?, &ancestors);
        }
    }

    Ok(())
}
