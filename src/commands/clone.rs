//! # Clone Command Implementation
//!
//! Implements `clone` (also available as `update-dir`). It brings every
//! selected submodule to its target, walking into nested descriptors of the
//! clones, and lists the clones in `.gitignore`.

use anyhow::Result;
use clap::Args;

use git_submodules::output::emoji;
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Clone or update submodules
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Submodule paths to clone (default: all enabled submodules)
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

/// Execute the `clone` command.
pub fn execute(ctx: &Context, args: CloneArgs) -> Result<()> {
    let workspace = Workspace::open(&ctx.root)?;

    let cloned = workspace.clone(&args.paths)?;

    for path in &cloned {
        println!(
            "{} {}",
            emoji(&ctx.output, "✅", "[OK]"),
            ctx.output.path_style().apply_to(path)
        );
    }
    if cloned.is_empty() {
        println!("Nothing to clone.");
    }

    Ok(())
}
