//! CLI argument parsing and command dispatch

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;

use git_submodules::defaults::ROOT_ENV_VAR;
use git_submodules::git;
use git_submodules::output::OutputConfig;

use crate::commands;

/// git-submodules - Keep nested repositories in step with a .gitsubmodules file
#[derive(Parser, Debug)]
#[command(name = "git-submodules")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Repository root holding the .gitsubmodules file.
    ///
    /// Defaults to the top level of the working copy containing the current
    /// directory.
    #[arg(long, global = true, value_name = "DIR", env = ROOT_ENV_VAR)]
    root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or update submodules and their nested submodules
    #[command(visible_alias = "update-dir")]
    Clone(commands::clone::CloneArgs),

    /// Delete local clones of submodules
    Clear(commands::clear::ClearArgs),

    /// Record the current commit and remotes of local clones
    UpdateDesc(commands::update_desc::UpdateDescArgs),

    /// Describe existing local clones
    Add(commands::add::AddArgs),

    /// Remove submodules from the descriptor
    Rm(commands::rm::RmArgs),

    /// Enable submodules for bulk operations
    Enable(commands::enable::EnableArgs),

    /// Disable submodules for bulk operations
    Disable(commands::enable::EnableArgs),

    /// Change what a submodule checks out
    SetTarget(commands::set_target::SetTargetArgs),

    /// Run a command for every submodule
    Foreach(commands::foreach::ForeachArgs),

    /// Show the state of local clones
    Status(commands::status::StatusArgs),

    /// Find and describe repositories not yet described
    Seek(commands::seek::SeekArgs),

    /// Display the nested submodule tree
    Tree(commands::tree::TreeArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// What every command needs besides its own arguments.
pub struct Context {
    pub root: PathBuf,
    pub output: OutputConfig,
}

impl Cli {
    fn init_logging(&self) {
        // RUST_LOG wins over --log-level when set
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(&self.log_level))
            .format_timestamp(None)
            .format_target(false)
            .try_init();
    }

    /// Absolute, canonical repository root.
    fn resolve_root(&self) -> Result<PathBuf> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => {
                let cwd = env::current_dir().context("Failed to read the current directory")?;
                git::find_root(&cwd).with_context(|| {
                    format!(
                        "{} is not inside a Git working copy; pass --root or set {}",
                        cwd.display(),
                        ROOT_ENV_VAR
                    )
                })?
            }
        };

        fs::canonicalize(&root)
            .with_context(|| format!("Repository root {} is not accessible", root.display()))
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        let output = OutputConfig::from_env_and_flag(&self.color);
        output.apply();

        // Completions are generated without a repository
        let root = match self.command {
            Commands::Completions(_) => PathBuf::new(),
            _ => self.resolve_root()?,
        };
        let ctx = Context { root, output };

        match self.command {
            Commands::Clone(args) => commands::clone::execute(&ctx, args),
            Commands::Clear(args) => commands::clear::execute(&ctx, args),
            Commands::UpdateDesc(args) => commands::update_desc::execute(&ctx, args),
            Commands::Add(args) => commands::add::execute(&ctx, args),
            Commands::Rm(args) => commands::rm::execute(&ctx, args),
            Commands::Enable(args) => commands::enable::execute(&ctx, args, true),
            Commands::Disable(args) => commands::enable::execute(&ctx, args, false),
            Commands::SetTarget(args) => commands::set_target::execute(&ctx, args),
            Commands::Foreach(args) => commands::foreach::execute(&ctx, args),
            Commands::Status(args) => commands::status::execute(&ctx, args),
            Commands::Seek(args) => commands::seek::execute(&ctx, args),
            Commands::Tree(args) => commands::tree::execute(&ctx, args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
