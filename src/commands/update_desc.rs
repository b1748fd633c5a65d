//! # Update-desc Command Implementation
//!
//! Reads the current commit and remotes of each selected clone back into the
//! descriptor. Stanzas are edited in place; lines whose value did not change
//! are left byte-for-byte as they were.

use anyhow::Result;
use clap::Args;

use git_submodules::output::emoji;
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Record the current state of local clones
#[derive(Args, Debug)]
pub struct UpdateDescArgs {
    /// Submodule paths to update (default: all enabled submodules)
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

/// Execute the `update-desc` command.
pub fn execute(ctx: &Context, args: UpdateDescArgs) -> Result<()> {
    let mut workspace = Workspace::open(&ctx.root)?;

    let updated = workspace.update_descriptions(&args.paths)?;

    for path in &updated {
        let commit = workspace
            .submodules()
            .get(path)
            .and_then(|record| record.commit())
            .unwrap_or_default();
        println!(
            "{} {} at {}",
            emoji(&ctx.output, "📝", "[DESC]"),
            ctx.output.path_style().apply_to(path),
            ctx.output
                .hash_style()
                .apply_to(git_submodules::output::short_hash(commit))
        );
    }
    println!(
        "Updated description written to {}",
        workspace.descriptor_path().display()
    );

    Ok(())
}
