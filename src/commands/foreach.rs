//! # Foreach Command Implementation
//!
//! Runs a command once per submodule, from the directory holding the
//! submodule's descriptor. The command sees the submodule's description in
//! `SUBMODULE_*` environment variables:
//!
//! ```bash
//! git-submodules foreach --recursive -- sh -c 'echo "$SUBMODULE_PATH $SUBMODULE_COMMIT"'
//! ```
//!
//! Commands run one after another; the first failing command stops the walk
//! and makes `foreach` exit non-zero.

use anyhow::Result;
use clap::Args;

use git_submodules::traversal::{ForeachOptions, SystemCommandRunner};
use git_submodules::workspace::Workspace;

use crate::cli::Context;

/// Run a command for every submodule
#[derive(Args, Debug)]
pub struct ForeachArgs {
    /// Also visit submodules described by the clones' own descriptors
    #[arg(short, long)]
    pub recursive: bool,

    /// Include disabled submodules
    #[arg(short, long)]
    pub all: bool,

    /// Command and arguments to run
    #[arg(value_name = "COMMAND", required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Execute the `foreach` command.
pub fn execute(ctx: &Context, args: ForeachArgs) -> Result<()> {
    let workspace = Workspace::open(&ctx.root)?;

    workspace.foreach(
        &SystemCommandRunner,
        &args.command,
        ForeachOptions {
            recursive: args.recursive,
            enabled_only: !args.all,
        },
    )?;

    Ok(())
}
