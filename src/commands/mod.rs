//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `git-submodules` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the shared [`crate::cli::Context`] and
//!   the parsed `Args`, calls into the `git_submodules` library and prints
//!   the report.

pub mod add;
pub mod clear;
pub mod clone;
pub mod completions;
pub mod enable;
pub mod foreach;
pub mod rm;
pub mod seek;
pub mod set_target;
pub mod status;
pub mod tree;
pub mod update_desc;
