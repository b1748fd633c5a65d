//! # Descriptor Parsing
//!
//! The descriptor file (`.gitsubmodules`) is a sequence of stanzas. Each
//! stanza starts with a header naming the submodule path and continues with
//! indented `key = value` lines until the next header:
//!
//! ```text
//! [submodule "lib/x"]
//!    source = https://example.com/x.git
//!    source.upstream = https://example.com/upstream/x.git
//!    commit = 4f1c0de
//!    enable = True
//!    target = branch main
//!    target_overrides_commit = False
//! ```
//!
//! Parsing happens in two steps. [`scan_line`] classifies a single line into
//! a typed [`Line`] token without interpreting values, and [`parse`] folds
//! the tokens into [`Submodules`]. The reconciler reuses the same scanner so
//! that recognition rules live in one place.
//!
//! Lines the scanner does not recognise (comments, blank lines, unknown keys,
//! anything before the first header) are ignored by the parser. A header that
//! repeats an earlier path continues the existing record instead of creating
//! a second one.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::path;
use crate::record::{parse_bool, Record, Target};

/// A recognised descriptor key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Source,
    NamedSource(String),
    Commit,
    Target,
    Enable,
    TargetOverridesCommit,
}

impl Key {
    fn recognise(key: &str) -> Option<Key> {
        match key {
            "source" => Some(Key::Source),
            "commit" => Some(Key::Commit),
            "target" => Some(Key::Target),
            "enable" => Some(Key::Enable),
            "target_overrides_commit" => Some(Key::TargetOverridesCommit),
            _ => key
                .strip_prefix("source.")
                .filter(|name| !name.is_empty())
                .map(|name| Key::NamedSource(name.to_string())),
        }
    }

    /// Spelling of the key in a descriptor file.
    pub fn name(&self) -> String {
        match self {
            Key::Source => "source".to_string(),
            Key::NamedSource(name) => format!("source.{}", name),
            Key::Commit => "commit".to_string(),
            Key::Target => "target".to_string(),
            Key::Enable => "enable".to_string(),
            Key::TargetOverridesCommit => "target_overrides_commit".to_string(),
        }
    }
}

/// Classification of one descriptor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `[submodule "<path>"]`, path already normalized.
    Header(String),
    /// A recognised `key = value` line.
    Entry { key: Key, value: &'a str },
    /// Anything else; kept verbatim by the reconciler.
    Other,
}

/// Classify a single line of descriptor text.
pub fn scan_line(line: &str) -> Line<'_> {
    let trimmed = line.trim();

    if let Some(path) = scan_header(trimmed) {
        return Line::Header(path);
    }

    let Some((key, value)) = trimmed.split_once('=') else {
        return Line::Other;
    };
    let value = value.trim();
    if value.is_empty() {
        return Line::Other;
    }

    match Key::recognise(key.trim()) {
        Some(key) => Line::Entry { key, value },
        None => Line::Other,
    }
}

fn scan_header(trimmed: &str) -> Option<String> {
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?.trim();
    let quoted = inner.strip_prefix("submodule")?.trim_start();
    let raw = quoted.strip_prefix('"')?.strip_suffix('"')?;
    Some(path::normalize(raw))
}

/// Ordered, path-keyed set of records.
///
/// Iteration follows first-appearance order in the descriptor (or insertion
/// order for records added later); lookups by path are constant time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submodules {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Submodules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Record> {
        self.index.get(path).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Record> {
        match self.index.get(path) {
            Some(&i) => Some(&mut self.records[i]),
            None => None,
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(Record::path)
    }

    /// Insert a record, replacing any record with the same path in place.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        match self.index.get(record.path()) {
            Some(&i) => Some(std::mem::replace(&mut self.records[i], record)),
            None => {
                self.index.insert(record.path().to_string(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<Record> {
        let i = self.index.remove(path)?;
        let record = self.records.remove(i);
        for position in self.index.values_mut() {
            if *position > i {
                *position -= 1;
            }
        }
        Some(record)
    }

    /// The record for `path`, created empty when absent.
    fn open(&mut self, path: &str) -> &mut Record {
        let i = match self.index.get(path) {
            Some(&i) => i,
            None => {
                self.insert(Record::new(path));
                self.records.len() - 1
            }
        };
        &mut self.records[i]
    }
}

impl<'a> IntoIterator for &'a Submodules {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for Submodules {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut submodules = Submodules::new();
        for record in iter {
            submodules.insert(record);
        }
        submodules
    }
}

/// Parse descriptor text into its records.
pub fn parse(text: &str) -> Result<Submodules> {
    let mut submodules = Submodules::new();
    let mut current: Option<String> = None;
    let mut override_lines: HashMap<String, usize> = HashMap::new();

    for (i, line) in text.lines().enumerate() {
        let line_number = i + 1;

        match scan_line(line) {
            Line::Header(path) => {
                if let Err(e) = path::validate(&path) {
                    return Err(Error::DescriptorParse {
                        line: line_number,
                        message: e.to_string(),
                        hint: Some(
                            "Name a directory below the repository, as in [submodule \"lib/x\"]"
                                .to_string(),
                        ),
                    });
                }
                submodules.open(&path);
                current = Some(path);
            }
            Line::Entry { key, value } => {
                let Some(path) = current.as_deref() else {
                    continue;
                };
                let record = submodules.open(path);

                match key {
                    Key::Source => {
                        record.add_source(value);
                    }
                    Key::NamedSource(name) => record.set_named_source(name, value),
                    Key::Commit => record.set_commit(value),
                    Key::Enable => record.set_enabled(parse_bool(value)),
                    Key::Target => {
                        let target =
                            Target::parse(value).map_err(|e| Error::DescriptorParse {
                                line: line_number,
                                message: e.to_string(),
                                hint: None,
                            })?;
                        record.set_target_unchecked(target);
                    }
                    Key::TargetOverridesCommit => {
                        record.set_overrides_unchecked(parse_bool(value));
                        override_lines.insert(path.to_string(), line_number);
                    }
                }
            }
            Line::Other => {}
        }
    }

    for record in &submodules {
        if record.target_overrides_commit() && record.target() == &Target::Commit {
            return Err(Error::DescriptorParse {
                line: override_lines.get(record.path()).copied().unwrap_or(0),
                message: format!(
                    "submodule \"{}\" overrides its commit but targets a commit",
                    record.path()
                ),
                hint: Some("Set `target = branch <name>` or `target = tag <name>`".to_string()),
            });
        }
    }

    Ok(submodules)
}

/// Read descriptor text, treating a missing file as empty.
pub fn read_text(descriptor_path: &Path) -> Result<String> {
    match fs::read_to_string(descriptor_path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Load and parse a descriptor file; a missing file has no records.
pub fn from_file(descriptor_path: &Path) -> Result<Submodules> {
    parse(&read_text(descriptor_path)?)
}
