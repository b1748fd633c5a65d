//! # Error Handling
//!
//! This module defines the centralized error type for the `git-submodules`
//! library. It uses `thiserror` to build a single `Error` enum whose variants
//! carry enough context (paths, commands, targets) to explain a failure
//! without a backtrace.
//!
//! Errors fall into a few families:
//!
//! - **Configuration errors**: a malformed `.gitsubmodules` entry, an unknown
//!   submodule path, an invalid target. These abort the whole invocation.
//! - **Synchronization errors**: a failed clone or checkout against one
//!   source. The synchronizer recovers from these locally and only reports
//!   `SourcesExhausted` once every source has been tried.
//! - **External command errors**: `git` or a user-supplied `foreach` command
//!   exited unsuccessfully.
//! - **Wrapped errors**: I/O errors from the filesystem.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for git-submodules operations
#[derive(Error, Debug)]
pub enum Error {
    /// A line of the descriptor file could not be understood.
    #[error("Descriptor parsing error at line {line}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    DescriptorParse {
        line: usize,
        message: String,
        /// Optional hint for how to fix the entry
        hint: Option<String>,
    },

    /// A submodule path was requested that the descriptor does not know.
    #[error("Unknown submodule \"{path}\"")]
    UnknownSubmodule { path: String },

    /// A submodule path that would resolve outside its repository root.
    #[error("Invalid submodule path \"{path}\": {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A target specification could not be parsed.
    #[error("Invalid target \"{value}\": expected `commit`, `branch <name>` or `tag <name>`")]
    InvalidTarget { value: String },

    /// A `git` invocation exited unsuccessfully.
    #[error("Git command failed in {}: git {command} - {stderr}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// Cloning from one source failed.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// Checking out the resolved target failed.
    #[error("Git checkout error for {target}: {message}")]
    GitCheckout { target: String, message: String },

    /// A submodule has no recorded commit and no live target to check out.
    #[error("Submodule \"{path}\" has no recorded commit to check out")]
    MissingCommit { path: String },

    /// Every configured source was tried and none produced the target.
    #[error("Could not clone submodule \"{path}\" at {target}: all sources exhausted")]
    SourcesExhausted { path: String, target: String },

    /// The clone directory holds files but is not a repository root.
    #[error("Directory {} exists, is not empty and is not a repository", path.display())]
    DirectoryOccupied { path: PathBuf },

    /// A user-supplied command exited unsuccessfully.
    #[error("Command `{command}` failed in {} ({status})", path.display())]
    CommandFailed {
        command: String,
        path: PathBuf,
        status: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
