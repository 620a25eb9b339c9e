//! Nested string tables and dotted-key lookup.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One node of a language table: a leaf string or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableNode {
    Text(String),
    Table(BTreeMap<String, TableNode>),
}

/// All translated strings for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTable {
    root: BTreeMap<String, TableNode>,
}

impl LanguageTable {
    /// Parse a table from a JSON object of nested objects and strings.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Failed to parse language table")
    }

    /// Resolve a dot-separated key to its leaf string.
    ///
    /// Returns `None` when a segment is missing, when the path runs through a
    /// leaf, or when it ends on a nested mapping.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;

        for segment in segments {
            node = match node {
                TableNode::Table(children) => children.get(segment)?,
                TableNode::Text(_) => return None,
            };
        }

        match node {
            TableNode::Text(text) => Some(text.as_str()),
            TableNode::Table(_) => None,
        }
    }

    /// Every dotted key that resolves to a leaf, in sorted order.
    pub fn leaf_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_leaf_keys(&self.root, "", &mut keys);
        keys
    }
}

fn collect_leaf_keys(map: &BTreeMap<String, TableNode>, prefix: &str, out: &mut Vec<String>) {
    for (name, node) in map {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match node {
            TableNode::Text(_) => out.push(path),
            TableNode::Table(children) => collect_leaf_keys(children, &path, out),
        }
    }
}
