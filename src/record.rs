//! # Submodule Records
//!
//! A [`Record`] is the in-memory form of one stanza of the descriptor file:
//! the submodule path, where it can be cloned from, which commit was last
//! recorded and what the checkout goal is.
//!
//! Records enforce two invariants of their own: `sources` never holds the
//! same URL twice, and a record whose target is a frozen commit can never be
//! flagged as overriding that commit.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Tokens accepted as `true` for boolean keys, compared case-insensitively.
const TRUTHY_TOKENS: [&str; 5] = ["true", "t", "yes", "y", "1"];

/// Parse a boolean descriptor value.
///
/// Only the tokens in an explicit allow-list count as true; every other
/// spelling, including typos, is false.
pub fn parse_bool(token: &str) -> bool {
    let token = token.trim();
    TRUTHY_TOKENS
        .iter()
        .any(|truthy| truthy.eq_ignore_ascii_case(token))
}

/// Render a boolean the way descriptor files spell it.
pub fn render_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Render a boolean as `1` or `0` for command environments.
pub fn render_flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Kind of checkout goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Commit,
    Branch,
    Tag,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Commit => "commit",
            TargetType::Branch => "branch",
            TargetType::Tag => "tag",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checkout goal of a submodule: the recorded commit, or a live branch/tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Target {
    #[default]
    Commit,
    Branch(String),
    Tag(String),
}

impl Target {
    /// Parse the value of a `target` key: `commit`, `branch <name>` or
    /// `tag <name>`.
    pub fn parse(value: &str) -> Result<Target> {
        let value = value.trim();
        let (kind, rest) = match value.split_once(char::is_whitespace) {
            Some((kind, rest)) => (kind, rest.trim()),
            None => (value, ""),
        };

        match (kind, rest.is_empty()) {
            ("commit", true) => Ok(Target::Commit),
            ("branch", false) => Ok(Target::Branch(rest.to_string())),
            ("tag", false) => Ok(Target::Tag(rest.to_string())),
            _ => Err(Error::InvalidTarget {
                value: value.to_string(),
            }),
        }
    }

    pub fn target_type(&self) -> TargetType {
        match self {
            Target::Commit => TargetType::Commit,
            Target::Branch(_) => TargetType::Branch,
            Target::Tag(_) => TargetType::Tag,
        }
    }

    /// Branch or tag name; `None` for commit targets.
    pub fn value(&self) -> Option<&str> {
        match self {
            Target::Commit => None,
            Target::Branch(name) | Target::Tag(name) => Some(name),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{} {}", self.target_type(), value),
            None => f.write_str(self.target_type().as_str()),
        }
    }
}

/// One submodule as described by the descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    path: String,
    sources: Vec<String>,
    named_sources: BTreeMap<String, String>,
    commit: Option<String>,
    target: Target,
    target_overrides_commit: bool,
    enabled: bool,
}

impl Record {
    /// A fresh, enabled record with no sources and no recorded commit.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sources: Vec::new(),
            named_sources: BTreeMap::new(),
            commit: None,
            target: Target::Commit,
            target_overrides_commit: false,
            enabled: true,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Anonymous sources, in clone-fallback priority order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn named_sources(&self) -> &BTreeMap<String, String> {
        &self.named_sources
    }

    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn target_overrides_commit(&self) -> bool {
        self.target_overrides_commit
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a source unless it is already known.
    ///
    /// Returns `true` when the source was added.
    pub fn add_source(&mut self, source: impl Into<String>) -> bool {
        let source = source.into();
        if self.sources.contains(&source) {
            return false;
        }
        self.sources.push(source);
        true
    }

    /// Register (or replace) a named source.
    pub fn set_named_source(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.named_sources.insert(name.into(), url.into());
    }

    pub fn set_commit(&mut self, commit: impl Into<String>) {
        self.commit = Some(commit.into());
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Change the target and the override flag together.
    ///
    /// Fails when asked to override the commit with a commit target.
    pub fn set_target(&mut self, target: Target, overrides_commit: bool) -> Result<()> {
        if overrides_commit && target == Target::Commit {
            return Err(Error::InvalidTarget {
                value: format!("{} (cannot override the recorded commit)", target),
            });
        }
        self.target = target;
        self.target_overrides_commit = overrides_commit;
        Ok(())
    }

    /// Target value exported to commands: the branch/tag name, or the
    /// recorded commit for commit targets. Empty when neither is known.
    pub fn effective_target_value(&self) -> &str {
        self.target
            .value()
            .or(self.commit.as_deref())
            .unwrap_or_default()
    }

    /// Raw setters used by the parser, which validates the override
    /// invariant once the whole stanza has been read.
    pub(crate) fn set_target_unchecked(&mut self, target: Target) {
        self.target = target;
    }

    pub(crate) fn set_overrides_unchecked(&mut self, overrides_commit: bool) {
        self.target_overrides_commit = overrides_commit;
    }
}
