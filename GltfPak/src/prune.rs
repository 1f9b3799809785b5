//! Extension pruning during JSON output.
//!
//! [`Pruned`] wraps a generic JSON tree and serializes it straight into a
//! `serde_json` writer, skipping every direct child of an `"extensions"` map
//! whose key is not listed in the document's `extensionsUsed`. No second tree
//! is built.
//!
//! Only the immediate children of a map keyed `"extensions"` are filtered.
//! Lists reset the parent-key context, and extension data whose key is
//! declared is kept verbatim even when empty.
//!
//! SPDX-License-Identifier: MIT

use std::io::Write;

use indexmap::IndexSet;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::document::Document;
use crate::error::Result;

/// Key whose direct children are filtered.
pub const EXTENSIONS_KEY: &str = "extensions";

/// Root key listing the declared extensions.
pub const EXTENSIONS_USED_KEY: &str = "extensionsUsed";

/// JSON output formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonStyle {
    /// Two-space indented.
    #[default]
    Pretty,
    /// No whitespace.
    Compact,
}

/// The allow-list of extension names that survive pruning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionsUsed(IndexSet<String>);

impl ExtensionsUsed {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Collect the declared extensions of a typed document.
    pub fn from_document(document: &Document) -> Self {
        Self::new(document.extensions_used.iter().cloned())
    }

    /// Collect `extensionsUsed` from a generic glTF tree.
    ///
    /// A missing or malformed list yields an empty set, which prunes every
    /// extension subtree.
    pub fn from_value(document: &Value) -> Self {
        let names = document
            .get(EXTENSIONS_USED_KEY)
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect::<Vec<_>>())
            .unwrap_or_default();
        Self::new(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// A JSON tree viewed through the extension filter.
pub struct Pruned<'a> {
    value: &'a Value,
    used: &'a ExtensionsUsed,
    parent_key: Option<&'a str>,
}

impl<'a> Pruned<'a> {
    pub fn new(value: &'a Value, used: &'a ExtensionsUsed) -> Self {
        Self {
            value,
            used,
            parent_key: None,
        }
    }

    fn child(&self, value: &'a Value, parent_key: Option<&'a str>) -> Self {
        Self {
            value,
            used: self.used,
            parent_key,
        }
    }
}

impl Serialize for Pruned<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value {
            Value::Object(entries) => {
                let filtering = self.parent_key == Some(EXTENSIONS_KEY);

                // Length unknown up front: filtered entries are skipped
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in entries {
                    if filtering && !self.used.contains(key) {
                        continue;
                    }
                    map.serialize_entry(key, &self.child(value, Some(key.as_str())))?;
                }
                map.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item, None))?;
                }
                seq.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// Stream `document` to `writer` with unused extensions removed.
pub fn write_pruned<W: Write>(
    writer: W,
    document: &Value,
    used: &ExtensionsUsed,
    style: JsonStyle,
) -> Result<()> {
    let pruned = Pruned::new(document, used);
    match style {
        JsonStyle::Pretty => {
            let mut serializer = serde_json::Serializer::pretty(writer);
            pruned.serialize(&mut serializer)?;
        }
        JsonStyle::Compact => {
            let mut serializer = serde_json::Serializer::new(writer);
            pruned.serialize(&mut serializer)?;
        }
    }
    Ok(())
}

/// Render `document` to JSON bytes, pruning against its own `extensionsUsed`.
pub fn to_pruned_vec(document: &Value, style: JsonStyle) -> Result<Vec<u8>> {
    let used = ExtensionsUsed::from_value(document);
    let mut out = Vec::new();
    write_pruned(&mut out, document, &used, style)?;
    tracing::debug!(
        "Rendered {} bytes of JSON ({} extensions declared)",
        out.len(),
        used.len()
    );
    Ok(out)
}

/// Extension names that pruning would drop, in first-seen order.
pub fn undeclared_extensions(document: &Value, used: &ExtensionsUsed) -> IndexSet<String> {
    fn walk(value: &Value, parent_key: Option<&str>, used: &ExtensionsUsed, found: &mut IndexSet<String>) {
        match value {
            Value::Object(entries) => {
                for (key, child) in entries {
                    if parent_key == Some(EXTENSIONS_KEY) && !used.contains(key) {
                        found.insert(key.clone());
                        continue;
                    }
                    walk(child, Some(key), used, found);
                }
            }
            Value::Array(items) => items.iter().for_each(|item| walk(item, None, used, found)),
            _ => {}
        }
    }

    let mut found = IndexSet::new();
    walk(document, None, used, &mut found);
    found
}
