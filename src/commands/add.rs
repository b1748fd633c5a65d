//! # Add Command Implementation
//!
//! Describes local clones that the descriptor does not know yet. The new
//! stanza records the clone's current commit and every remote URL as a
//! source, and the path is added to `.gitignore`.

use anyhow::Result;
use clap::Args;

use git_submodules::output::emoji;
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Describe existing local clones
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Paths of the clones, relative to the repository root
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,
}

/// Execute the `add` command.
pub fn execute(ctx: &Context, args: AddArgs) -> Result<()> {
    let mut workspace = Workspace::open(&ctx.root)?;

    let added = workspace.add(&args.paths)?;

    for path in &added {
        println!(
            "{} Added {}",
            emoji(&ctx.output, "✅", "[OK]"),
            ctx.output.path_style().apply_to(path)
        );
    }
    if added.is_empty() {
        println!("Nothing added.");
    }

    Ok(())
}
