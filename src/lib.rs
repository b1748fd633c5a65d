//! # git-submodules Library
//!
//! This library keeps a set of nested repositories ("submodules") in step
//! with a plain-text `.gitsubmodules` descriptor. It powers the
//! `git-submodules` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use git_submodules::descriptor;
//! use git_submodules::reconcile::reconcile;
//!
//! let text = "[submodule \"lib/x\"]\n   commit = abc123\n";
//! let mut submodules = descriptor::parse(text).unwrap();
//! assert_eq!(submodules.get("lib/x").unwrap().commit(), Some("abc123"));
//!
//! // Edit a record and write it back in place
//! submodules.get_mut("lib/x").unwrap().set_enabled(false);
//! let updated = reconcile(text, &submodules, &BTreeSet::new());
//! assert_eq!(updated, "[submodule \"lib/x\"]\n   enable = False\n   commit = abc123\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Records (`record`)**: one submodule's path, sources, recorded commit,
//!   target and enabled flag.
//! - **Descriptor (`descriptor`)**: a line scanner and parser turning the
//!   descriptor text into an ordered, path-keyed set of records.
//! - **Reconciler (`reconcile`)**: writes records back into existing text,
//!   touching only the lines whose value changed, so comments, unknown keys
//!   and stanza order survive.
//! - **Synchronizer (`repository`, `git`)**: brings a clone to its record's
//!   target, falling back across sources.
//! - **Traversal (`traversal`)**: walks nested descriptors to clone
//!   everything or run a command per submodule.
//! - **Workspace (`workspace`)**: the repository-level operations behind each
//!   CLI command.

pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod git;
pub mod ignore;
pub mod output;
pub mod path;
pub mod reconcile;
pub mod record;
pub mod repository;
pub mod traversal;
pub mod workspace;

#[cfg(test)]
mod descriptor_proptest;
#[cfg(test)]
mod test_support;
