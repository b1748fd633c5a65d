//! Default values for git-submodules.
//!
//! This module provides centralized constants used across the library and
//! the commands, ensuring consistency and avoiding duplication.

/// Name of the descriptor file at the root of every repository level.
pub const DESCRIPTOR_FILENAME: &str = ".gitsubmodules";

/// Name of the ignore file that lists managed submodule paths.
pub const IGNORE_FILENAME: &str = ".gitignore";

/// Name of the file signalling official Git submodules inside a clone.
pub const OFFICIAL_SUBMODULES_FILENAME: &str = ".gitmodules";

/// Prefix shared by every variable exported to `foreach` commands.
pub const ENV_PREFIX: &str = "SUBMODULE_";

/// Indentation written in front of every key line.
pub const KEY_INDENT: &str = "   ";

/// Remote name used when `checkout.defaultRemote` has to be set.
pub const DEFAULT_REMOTE: &str = "origin";

/// Environment variable that overrides the repository root.
pub const ROOT_ENV_VAR: &str = "GIT_SUBMODULES_ROOT";
