use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::kit::{Document, Node};
use crate::presets::BUILTIN_SUBSTITUTIONS;
use crate::{KitError, Result};

/// Maps an `Item` identifier to the node that replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionTable {
    entries: BTreeMap<String, Node>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: impl Into<String>, replacement: Node) -> Option<Node> {
        self.entries.insert(item.into(), replacement)
    }

    pub fn get(&self, item: &str) -> Option<&Node> {
        self.entries.get(item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn from_json_str(src: &str) -> serde_json::Result<Self> {
        serde_json::from_str(src)
    }

    /// Loads a `{"<Item>": <Node>, ...}` JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| KitError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| KitError::json(path, e))
    }

    /// The stock equipment swaps.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (item, build) in BUILTIN_SUBSTITUTIONS {
            table.insert(*item, build());
        }
        table
    }
}

/// Result of rewriting a whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub document: Document,
    pub substitutions: usize,
}

/// Replaces every node whose `Item` is a key of `table` with a copy of the
/// table entry and rebuilds everything else around it.
///
/// A node is checked before its children are visited, and a replacement is
/// never scanned again, so a replacement that reintroduces a matched `Item`
/// does not loop.
pub fn rewrite(node: &Node, table: &SubstitutionTable) -> Node {
    rewrite_counted(node, table, &mut 0)
}

fn rewrite_counted(node: &Node, table: &SubstitutionTable, substitutions: &mut usize) -> Node {
    if let Some(replacement) = node.item().and_then(|item| table.get(item)) {
        debug!(
            from = node.item().unwrap_or_default(),
            to = replacement.item().unwrap_or_default(),
            "substituting"
        );
        *substitutions += 1;
        return replacement.clone();
    }

    node.map_children(|child| rewrite_counted(child, table, substitutions))
}

/// Applies [`rewrite`] to every top-level node of `doc`.
pub fn rewrite_document(doc: &Document, table: &SubstitutionTable) -> Rewrite {
    let mut substitutions = 0;
    let nodes = doc
        .nodes()
        .iter()
        .map(|node| rewrite_counted(node, table, &mut substitutions))
        .collect();

    Rewrite {
        document: doc.with_nodes(doc.version(), nodes),
        substitutions,
    }
}
