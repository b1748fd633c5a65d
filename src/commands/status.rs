//! # Status Command Implementation
//!
//! Compares each described submodule with its clone: whether it is cloned,
//! whether it sits on the recorded commit, whether it has uncommitted
//! changes and, for branch and tag targets, where the target points on the
//! first source right now.
//!
//! This command is read-only. `--json` prints the same report as a JSON
//! array for scripts.

use anyhow::Result;
use clap::Args;

use git_submodules::output::{emoji, short_hash, OutputConfig};
use git_submodules::workspace::{Status, Workspace};

use crate::cli::Context;

/// Show the state of local clones
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Submodule paths to inspect (default: all, disabled included)
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the `status` command.
pub fn execute(ctx: &Context, args: StatusArgs) -> Result<()> {
    let workspace = Workspace::open(&ctx.root)?;
    let report = workspace.status(&args.paths)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("No submodules described in {}", workspace.descriptor_path().display());
    }
    for status in &report {
        println!("{}", render(&ctx.output, status));
    }

    Ok(())
}

/// One human-readable line for `status`.
fn render(output: &OutputConfig, status: &Status) -> String {
    let marker = if !status.cloned {
        emoji(output, "⬜", "[--]")
    } else if status.is_at_recorded_commit() && status.dirty != Some(true) {
        emoji(output, "✅", "[OK]")
    } else {
        emoji(output, "⚠️ ", "[!!]")
    };

    let mut line = format!(
        "{} {} ({})",
        marker,
        output.path_style().apply_to(&status.path),
        status.target
    );

    if !status.enabled {
        line.push_str(" disabled");
    }

    match (&status.current_commit, &status.recorded_commit) {
        (Some(current), Some(recorded)) if current != recorded => {
            line.push_str(&format!(
                " at {} (recorded {})",
                output.hash_style().apply_to(short_hash(current)),
                short_hash(recorded)
            ));
        }
        (Some(current), _) => {
            line.push_str(&format!(
                " at {}",
                output.hash_style().apply_to(short_hash(current))
            ));
        }
        (None, _) if !status.cloned => line.push_str(" not cloned"),
        (None, _) => {}
    }

    if status.dirty == Some(true) {
        line.push_str(&format!(
            " {}",
            output.warning_style().apply_to("uncommitted changes")
        ));
    }
    if let Some(tip) = &status.remote_tip {
        line.push_str(&format!(" remote tip {}", short_hash(tip)));
    }

    line
}
