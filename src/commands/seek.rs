//! # Seek Command Implementation
//!
//! Walks the given directories for repositories the descriptor does not
//! describe yet and adds them, as `add` would. The walk skips `.git`
//! directories and does not look inside the repositories it finds.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use git_submodules::output::emoji;
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Find and describe repositories not yet described
#[derive(Args, Debug)]
pub struct SeekArgs {
    /// Directories to search, relative to the repository root
    #[arg(value_name = "DIR", required = true)]
    pub dirs: Vec<PathBuf>,
}

/// Execute the `seek` command.
pub fn execute(ctx: &Context, args: SeekArgs) -> Result<()> {
    let mut workspace = Workspace::open(&ctx.root)?;

    let found = workspace.seek(&args.dirs)?;

    for path in &found {
        println!(
            "{} Found {}",
            emoji(&ctx.output, "🔍", "[FOUND]"),
            ctx.output.path_style().apply_to(path)
        );
    }
    println!("{} new submodules described", found.len());

    Ok(())
}
