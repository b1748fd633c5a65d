//! # git-submodules CLI
//!
//! This is the binary entry point for the `git-submodules` command-line tool.
//!
//! Its responsibilities are parsing command-line arguments with `clap`,
//! executing the matching command and turning errors into a non-zero exit
//! status with a readable message.
//!
//! The core logic lives in the `git_submodules` library crate; the binary is
//! a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
