//! # Clear Command Implementation
//!
//! Deletes the local clones of the selected submodules. The descriptor is
//! not touched, so `clone` restores them.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use git_submodules::output::emoji;
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Delete local clones
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Submodule paths to clear (default: all enabled submodules)
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Also delete clones with uncommitted changes
    #[arg(short, long)]
    pub force: bool,
}

/// Execute the `clear` command.
pub fn execute(ctx: &Context, args: ClearArgs) -> Result<()> {
    let workspace = Workspace::open(&ctx.root)?;

    if !args.yes {
        let selected = workspace.select(&args.paths)?;
        if selected.is_empty() {
            println!("Nothing to clear.");
            return Ok(());
        }

        let theme = ColorfulTheme::default();
        let confirmed = Confirm::with_theme(&theme)
            .with_prompt(format!("Delete the local clones of {} submodules?", selected.len()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Clear cancelled.");
            return Ok(());
        }
    }

    let cleared = workspace.clear(&args.paths, args.force)?;
    for path in &cleared {
        println!(
            "{} Deleted {}",
            emoji(&ctx.output, "🗑️ ", "[DEL]"),
            ctx.output.path_style().apply_to(path)
        );
    }
    if cleared.is_empty() {
        println!("No clones were deleted.");
    }

    Ok(())
}
