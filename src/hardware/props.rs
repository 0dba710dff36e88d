//! Property stores
//!
//! `MapPropertyStore` holds explicit values (CLI `--prop`, tests).
//! `BuildPropStore` reads Android-style `build.prop` files on every lookup.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::PropertyStore;
use crate::error::{Result, SpecError};

/// In-memory property values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapPropertyStore {
    values: HashMap<String, String>,
}

impl MapPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Parse `KEY=VALUE` assignments (CLI form). The value may be empty.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (name, value) = parse_assignment(assignment)
                .ok_or_else(|| SpecError::config(format!("Expected KEY=VALUE, got {:?}", assignment)))?;
            store.insert(name, value);
        }
        Ok(store)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertyStore for MapPropertyStore {
    fn get(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }
}

/// Reads `key=value` lines from build.prop files, first non-empty value wins.
#[derive(Debug, Clone)]
pub struct BuildPropStore {
    files: Vec<PathBuf>,
    overlay: MapPropertyStore,
}

impl BuildPropStore {
    pub fn new(files: Vec<PathBuf>, overlay: MapPropertyStore) -> Self {
        Self { files, overlay }
    }

    fn lookup_file(path: &Path, name: &str) -> Option<String> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::trace!("Skipping property file {:?}: {}", path, e);
                return None;
            }
        };

        // Later assignments in the same file override earlier ones
        content
            .lines()
            .filter_map(parse_assignment)
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
            .last()
            .filter(|value| !value.is_empty())
    }
}

impl PropertyStore for BuildPropStore {
    fn get(&self, name: &str) -> String {
        let overlaid = self.overlay.get(name);
        if !overlaid.is_empty() {
            return overlaid;
        }

        self.files
            .iter()
            .find_map(|path| Self::lookup_file(path, name))
            .unwrap_or_default()
    }
}

/// Split a `key=value` line; comments and blank lines yield `None`.
fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
