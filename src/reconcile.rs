//! # Descriptor Reconciliation
//!
//! Writes a desired set of records back into existing descriptor text while
//! keeping the file recognisable: comments, blank lines, unknown keys and the
//! original stanza order survive untouched, and only the value lines whose
//! meaning changed are rewritten.
//!
//! ## Algorithm
//!
//! 1. A single forward pass copies the existing lines into an output buffer,
//!    dropping every stanza slated for removal. For each kept path it records
//!    a [`Cursor`]: the buffer index of the header and of the last occurrence
//!    of each recognised key.
//! 2. Every desired record is then applied to the buffer. Known keys are
//!    rewritten in place when their value differs; missing keys are inserted
//!    directly below the header; paths without a header get a new stanza
//!    appended at the end.
//! 3. Each insertion shifts every recorded index at or after the insertion
//!    point, so after a record has been applied all other cursors still point
//!    at their lines.
//!
//! Because every key insertion lands right below the header, several
//! insertions into one stanza end up in reverse order of insertion. Output
//! stability depends on this, so the order in which keys are visited is
//! fixed: anonymous sources, `commit`, `enable`, `target`,
//! `target_overrides_commit`, then named sources by name.
//!
//! Anonymous `source` lines are never rewritten. Sources missing from the
//! file are appended after the stanza's last source line; stale source lines
//! are left as they are.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::defaults::KEY_INDENT;
use crate::descriptor::{read_text, scan_line, Key, Line, Submodules};
use crate::error::Result;
use crate::record::{parse_bool, render_bool, Record, Target};

/// Buffer positions belonging to one stanza.
#[derive(Debug, Clone)]
struct Cursor {
    header: usize,
    keys: HashMap<Key, usize>,
    sources: Vec<String>,
}

impl Cursor {
    fn new(header: usize) -> Self {
        Self {
            header,
            keys: HashMap::new(),
            sources: Vec::new(),
        }
    }

    fn shift_from(&mut self, at: usize) {
        if self.header >= at {
            self.header += 1;
        }
        for index in self.keys.values_mut() {
            if *index >= at {
                *index += 1;
            }
        }
    }
}

struct Reconciler {
    lines: Vec<String>,
    cursors: HashMap<String, Cursor>,
}

impl Reconciler {
    /// Copy `existing` into the buffer, skipping removed stanzas.
    fn scan(existing: &str, remove: &BTreeSet<String>) -> Self {
        let mut lines = Vec::new();
        let mut cursors: HashMap<String, Cursor> = HashMap::new();
        let mut current: Option<String> = None;
        let mut removing = false;

        for line in existing.lines() {
            match scan_line(line) {
                Line::Header(path) => {
                    removing = remove.contains(&path);
                    if removing {
                        debug!("Dropping stanza for \"{}\"", path);
                        current = None;
                        continue;
                    }
                    cursors
                        .entry(path.clone())
                        .or_insert_with(|| Cursor::new(lines.len()));
                    lines.push(line.to_string());
                    current = Some(path);
                }
                _ if removing => {}
                Line::Entry { key, value } => {
                    let index = lines.len();
                    lines.push(line.to_string());

                    let Some(cursor) = current.as_ref().and_then(|p| cursors.get_mut(p)) else {
                        continue;
                    };
                    if key == Key::Source {
                        cursor.sources.push(value.to_string());
                    }
                    cursor.keys.insert(key, index);
                }
                Line::Other => lines.push(line.to_string()),
            }
        }

        Self { lines, cursors }
    }

    fn insert(&mut self, at: usize, line: String) {
        self.lines.insert(at, line);
        for cursor in self.cursors.values_mut() {
            cursor.shift_from(at);
        }
    }

    fn apply(&mut self, record: &Record) {
        if self.cursors.contains_key(record.path()) {
            self.update_stanza(record);
        } else {
            self.append_stanza(record);
        }
    }

    fn update_stanza(&mut self, record: &Record) {
        let path = record.path();
        let Some(cursor) = self.cursors.get(path) else {
            return;
        };

        let missing: Vec<String> = record
            .sources()
            .iter()
            .filter(|source| !cursor.sources.contains(source))
            .cloned()
            .collect();
        let mut at = match cursor.keys.get(&Key::Source) {
            Some(&last_source) => last_source + 1,
            None => cursor.header + 1,
        };
        for source in missing {
            self.insert(at, render_line(KEY_INDENT, &Key::Source, &source));
            if let Some(cursor) = self.cursors.get_mut(path) {
                cursor.keys.insert(Key::Source, at);
                cursor.sources.push(source);
            }
            at += 1;
        }

        let mut keys = vec![
            Key::Commit,
            Key::Enable,
            Key::Target,
            Key::TargetOverridesCommit,
        ];
        keys.extend(record.named_sources().keys().cloned().map(Key::NamedSource));

        for key in keys {
            self.apply_key(record, key);
        }
    }

    fn apply_key(&mut self, record: &Record, key: Key) {
        let Some(desired) = desired_value(record, &key) else {
            return;
        };
        let Some(cursor) = self.cursors.get(record.path()) else {
            return;
        };
        let header = cursor.header;
        let existing = cursor.keys.get(&key).copied();

        match existing {
            Some(index) => {
                let line = &self.lines[index];
                let unchanged = match scan_line(line) {
                    Line::Entry { value, .. } => value_matches(record, &key, value),
                    _ => false,
                };
                if !unchanged {
                    let indent = leading_whitespace(line).to_string();
                    self.lines[index] = render_line(&indent, &key, &desired);
                }
            }
            None if implied_by_absence(record, &key) => {}
            None => {
                let at = header + 1;
                self.insert(at, render_line(KEY_INDENT, &key, &desired));
                if let Some(cursor) = self.cursors.get_mut(record.path()) {
                    cursor.keys.insert(key, at);
                }
            }
        }
    }

    fn append_stanza(&mut self, record: &Record) {
        let mut cursor = Cursor::new(self.lines.len());
        self.lines
            .push(format!("[submodule \"{}\"]", record.path()));

        let mut push = |lines: &mut Vec<String>, key: Key, value: &str| {
            cursor.keys.insert(key.clone(), lines.len());
            lines.push(render_line(KEY_INDENT, &key, value));
        };

        for source in record.sources() {
            push(&mut self.lines, Key::Source, source);
        }
        for (name, url) in record.named_sources() {
            push(&mut self.lines, Key::NamedSource(name.clone()), url);
        }
        if let Some(commit) = record.commit() {
            push(&mut self.lines, Key::Commit, commit);
        }
        push(&mut self.lines, Key::Enable, render_bool(record.is_enabled()));
        push(&mut self.lines, Key::Target, &record.target().to_string());
        push(
            &mut self.lines,
            Key::TargetOverridesCommit,
            render_bool(record.target_overrides_commit()),
        );

        cursor.sources = record.sources().to_vec();
        self.cursors.insert(record.path().to_string(), cursor);
    }

    fn finish(self) -> String {
        let mut text = String::new();
        for line in self.lines {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }
}

fn render_line(indent: &str, key: &Key, value: &str) -> String {
    format!("{}{} = {}", indent, key.name(), value)
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

fn desired_value(record: &Record, key: &Key) -> Option<String> {
    match key {
        Key::Source => None,
        Key::NamedSource(name) => record.named_sources().get(name).cloned(),
        Key::Commit => record.commit().map(str::to_string),
        Key::Enable => Some(render_bool(record.is_enabled()).to_string()),
        Key::Target => Some(record.target().to_string()),
        Key::TargetOverridesCommit => {
            Some(render_bool(record.target_overrides_commit()).to_string())
        }
    }
}

/// Whether an existing value already means what the record holds.
fn value_matches(record: &Record, key: &Key, value: &str) -> bool {
    match key {
        Key::Source => true,
        Key::NamedSource(name) => record.named_sources().get(name).map(String::as_str) == Some(value),
        Key::Commit => record.commit() == Some(value),
        Key::Enable => parse_bool(value) == record.is_enabled(),
        Key::Target => Target::parse(value).ok().as_ref() == Some(record.target()),
        Key::TargetOverridesCommit => parse_bool(value) == record.target_overrides_commit(),
    }
}

/// Whether leaving the key out of the stanza already yields the desired value.
fn implied_by_absence(record: &Record, key: &Key) -> bool {
    match key {
        Key::Enable => record.is_enabled(),
        Key::Target => record.target() == &Target::Commit,
        Key::TargetOverridesCommit => !record.target_overrides_commit(),
        Key::Source | Key::NamedSource(_) | Key::Commit => false,
    }
}

/// Merge `desired` records into `existing` descriptor text.
///
/// Stanzas for paths in `remove` are dropped. Records without a recorded
/// commit are skipped with a warning and leave their stanza untouched.
pub fn reconcile(existing: &str, desired: &Submodules, remove: &BTreeSet<String>) -> String {
    let mut reconciler = Reconciler::scan(existing, remove);

    for record in desired {
        if remove.contains(record.path()) {
            continue;
        }
        if record.commit().is_none() {
            warn!(
                "Submodule \"{}\" has no recorded commit; not written to the descriptor",
                record.path()
            );
            continue;
        }
        reconciler.apply(record);
    }

    reconciler.finish()
}

/// Reconcile the descriptor file at `descriptor_path` in place.
///
/// The file is read fully, reconciled in memory and rewritten wholesale
/// when anything changed. A missing file that stays empty is not created.
pub fn reconcile_file(
    descriptor_path: &Path,
    desired: &Submodules,
    remove: &BTreeSet<String>,
) -> Result<()> {
    let existing = read_text(descriptor_path)?;
    let updated = reconcile(&existing, desired, remove);
    if updated != existing {
        fs::write(descriptor_path, updated)?;
    }
    Ok(())
}
