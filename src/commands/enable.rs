//! # Enable / Disable Command Implementation
//!
//! Both commands flip the `enable` key of the named stanzas. Disabled
//! submodules stay in the descriptor but are skipped by `clone`, `clear`,
//! `update-desc` and `foreach`.

use anyhow::Result;
use clap::Args;

use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Arguments shared by `enable` and `disable`
#[derive(Args, Debug)]
pub struct EnableArgs {
    /// Submodule paths to change
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,
}

/// Execute `enable` (`enabled = true`) or `disable`.
pub fn execute(ctx: &Context, args: EnableArgs, enabled: bool) -> Result<()> {
    let mut workspace = Workspace::open(&ctx.root)?;
    let verb = if enabled { "Enabled" } else { "Disabled" };

    for path in workspace.set_enabled(&args.paths, enabled)? {
        println!("{} {}", verb, ctx.output.path_style().apply_to(path));
    }

    Ok(())
}
