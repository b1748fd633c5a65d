//! # Rm Command Implementation
//!
//! Removes submodules from the descriptor and from `.gitignore`. Clones stay
//! on disk unless `--delete-clone` is given.

use anyhow::Result;
use clap::Args;

use git_submodules::output::emoji;
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Remove submodules from the descriptor
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Submodule paths to remove
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Also delete the local clones
    #[arg(long)]
    pub delete_clone: bool,
}

/// Execute the `rm` command.
pub fn execute(ctx: &Context, args: RmArgs) -> Result<()> {
    let mut workspace = Workspace::open(&ctx.root)?;

    for path in workspace.remove(&args.paths, args.delete_clone)? {
        println!(
            "{} Removed {}",
            emoji(&ctx.output, "➖", "[RM]"),
            ctx.output.path_style().apply_to(path)
        );
    }

    Ok(())
}
