//! # Set-target Command Implementation
//!
//! Changes the checkout goal of one submodule:
//!
//! ```bash
//! git-submodules set-target lib/x branch main --override
//! git-submodules set-target lib/x tag v1.2.0
//! git-submodules set-target lib/x commit
//! ```
//!
//! Without `--override` the recorded commit keeps being checked out and the
//! branch or tag is informational.

use anyhow::Result;
use clap::Args;

use git_submodules::record::Target;
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Change what a submodule checks out
#[derive(Args, Debug)]
pub struct SetTargetArgs {
    /// Submodule path
    #[arg(value_name = "PATH")]
    pub path: String,

    /// `commit`, `branch NAME` or `tag NAME`
    #[arg(value_name = "TARGET", required = true, num_args = 1..=2)]
    pub target: Vec<String>,

    /// Check out the live branch or tag instead of the recorded commit
    #[arg(long = "override")]
    pub override_commit: bool,
}

/// Execute the `set-target` command.
pub fn execute(ctx: &Context, args: SetTargetArgs) -> Result<()> {
    let target = Target::parse(&args.target.join(" "))?;
    let mut workspace = Workspace::open(&ctx.root)?;

    workspace.set_target(&args.path, target.clone(), args.override_commit)?;

    println!(
        "{} now targets {}{}",
        ctx.output.path_style().apply_to(&args.path),
        target,
        if args.override_commit {
            " (overrides commit)"
        } else {
            ""
        }
    );
    Ok(())
}
