//! Reconciles `KEY=VALUE` updates into the client environment file.
//!
//! Lines whose key is not being updated are kept verbatim and in order. Every
//! updated key ends up on exactly one line: in place of its first occurrence if
//! the document already has it, appended in update order otherwise. Blank lines
//! are not preserved.
//!
//! Keys must be non-empty and free of `=` and line breaks, and values free of
//! line breaks, so that every written line parses back to the key it was
//! written for.

use std::{collections::HashSet, fmt, fs, io, path::Path};

use tracing::info;

use crate::{constants::ENV_KEY_SEPARATOR, errors::ScriptError, utils::write_atomic};

/// An insertion-ordered set of key → value updates
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateSet {
    /// The updates, in insertion order
    entries: Vec<(String, String)>,
}

impl UpdateSet {
    /// Create an empty update set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. Re-inserting a key replaces its value but keeps
    /// its first position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The new value for `key`, if it is being updated
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Iterate over the updates in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The number of keys being updated
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no updates
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every update can be written as a single `KEY=VALUE` line
    pub fn validate(&self) -> Result<(), ScriptError> {
        for (key, value) in self.iter() {
            if key.is_empty() {
                return Err(ScriptError::EnvReconcile("empty env key".to_string()));
            }
            if key.contains(ENV_KEY_SEPARATOR) || key.contains(is_line_break) {
                return Err(ScriptError::EnvReconcile(format!(
                    "env key {key:?} contains `{ENV_KEY_SEPARATOR}` or a line break"
                )));
            }
            if value.contains(is_line_break) {
                return Err(ScriptError::EnvReconcile(format!(
                    "value of env key `{key}` contains a line break"
                )));
            }
        }

        Ok(())
    }
}

/// Whether `c` would split a line
fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UpdateSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut updates = UpdateSet::new();
        for (k, v) in iter {
            updates.insert(k, v);
        }
        updates
    }
}

/// A line-oriented environment document
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvDocument {
    /// The lines of the document, without separators
    pub lines: Vec<String>,
}

impl EnvDocument {
    /// Split raw contents into lines, dropping blank ones
    pub fn parse(contents: &str) -> Self {
        let lines = contents
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        Self { lines }
    }
}

impl fmt::Display for EnvDocument {
    /// Joins the lines with a single newline, without a trailing one
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// The key of a line: everything before the first `=`, or the whole line
fn line_key(line: &str) -> &str {
    line.split_once(ENV_KEY_SEPARATOR).map_or(line, |(key, _)| key)
}

/// Merge `updates` into an existing document, or into an empty one if absent.
///
/// Fails without touching anything if an update cannot be written as one line.
pub fn reconcile(
    existing: Option<&str>,
    updates: &UpdateSet,
) -> Result<EnvDocument, ScriptError> {
    updates.validate()?;
    let document = existing.map(EnvDocument::parse).unwrap_or_default();

    let mut applied: HashSet<&str> = HashSet::new();
    let mut lines = Vec::with_capacity(document.lines.len() + updates.len());
    for line in &document.lines {
        let key = line_key(line);
        match updates.get(key) {
            // A repeated occurrence of an updated key is dropped
            Some(_) if applied.contains(key) => {}
            Some(value) => {
                lines.push(format!("{key}{ENV_KEY_SEPARATOR}{value}"));
                applied.insert(key);
            }
            None => lines.push(line.clone()),
        }
    }

    for (key, value) in updates.iter() {
        if !applied.contains(key) {
            lines.push(format!("{key}{ENV_KEY_SEPARATOR}{value}"));
        }
    }

    Ok(EnvDocument { lines })
}

/// Read the environment file, returning `None` if it does not exist
pub fn read_env_file(path: &Path) -> Result<Option<String>, ScriptError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ScriptError::EnvReconcile(format!("{}: {e}", path.display()))),
    }
}

/// Overwrite the environment file with the given document
pub fn write_env_file(path: &Path, document: &EnvDocument) -> Result<(), ScriptError> {
    write_atomic(path, document.to_string().as_bytes())
        .map_err(|e| ScriptError::EnvReconcile(format!("{}: {e}", path.display())))
}

/// Apply `updates` to the environment file at `path`
pub fn update_env_file(path: &Path, updates: &UpdateSet) -> Result<(), ScriptError> {
    let existing = read_env_file(path)?;
    let document = reconcile(existing.as_deref(), updates)?;
    write_env_file(path, &document)?;

    info!(path = %path.display(), keys = updates.len(), ".env file updated with new contract addresses");
    Ok(())
}
