//! Dotted-path lookups over a tree, and key search across files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::document::parse_document;
use crate::error::KConfigError;
use crate::file;
use crate::header::KNOWN_HEADERS;
use crate::types::{ConfigTree, SearchPath};

/// Navigate a tree by dotted path (e.g. `"install.device"`).
///
/// Numeric segments index into sequences (`"users.0.name"`). An empty path or
/// `"."` addresses the whole tree.
pub fn tree_get<'a>(tree: &'a ConfigTree, path: &str) -> Option<Lookup<'a>> {
    let path = path.trim().trim_start_matches('.');
    if path.is_empty() {
        return Some(Lookup::Root(tree));
    }

    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = tree.get(first)?;
    for segment in segments {
        current = step(current, segment)?;
    }
    Some(Lookup::Value(current))
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Mapping(map) => map.get(segment),
        Value::Sequence(seq) => seq.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Result of [`tree_get`]: either the whole tree or one value inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Root(&'a ConfigTree),
    Value(&'a Value),
}

impl Lookup<'_> {
    fn to_yaml(self) -> Result<String, serde_yaml::Error> {
        match self {
            Lookup::Root(tree) => serde_yaml::to_string(tree),
            Lookup::Value(value) => serde_yaml::to_string(value),
        }
    }
}

/// Serialized YAML of the value at `path`, with a trailing newline.
pub fn query(tree: &ConfigTree, path: &str) -> Result<String, KConfigError> {
    let found = tree_get(tree, path).ok_or_else(|| KConfigError::KeyNotFound(path.into()))?;
    let mut text = found
        .to_yaml()
        .map_err(|e| KConfigError::Serialize(e.to_string()))?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Render a scalar as plain text. Mappings and sequences give `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Mapping(_) | Value::Sequence(_) => None,
    }
}

/// Flatten a tree into dotted `(key, value)` pairs, depth-first in tree order.
///
/// Sequences and scalars are leaves; sequences are rendered as flow YAML.
pub fn flatten(tree: &ConfigTree) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(tree, "", &mut out);
    out
}

fn flatten_into(tree: &ConfigTree, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in tree {
        let key = scalar_to_string(key).unwrap_or_default();
        let dotted = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Mapping(sub) if !sub.is_empty() => flatten_into(sub, &dotted, out),
            other => out.push((dotted, format_leaf(other))),
        }
    }
}

fn format_leaf(value: &Value) -> String {
    if let Some(s) = scalar_to_string(value) {
        return s;
    }
    let compact = serde_json::to_string(value).ok();
    compact.unwrap_or_else(|| format!("{value:?}"))
}

/// Files in `dirs` whose document has a value at the dotted `path`.
///
/// Every file is parsed on its own, independent of any merge. Unparsable files
/// are skipped. Paths are absolute, in scan order, without duplicates. An
/// empty path (or `.`) names no key and matches nothing.
pub fn find_yaml_with_key(
    path: &str,
    dirs: &[SearchPath],
) -> Result<Vec<PathBuf>, KConfigError> {
    let dirs = file::expand_search_paths(dirs);
    let candidates = file::collect_files(&dirs, false)?;

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for candidate in candidates {
        if !file_has_key(&candidate, path) {
            continue;
        }
        let absolute = std::path::absolute(&candidate).unwrap_or(candidate);
        if seen.insert(absolute.clone()) {
            found.push(absolute);
        }
    }
    Ok(found)
}

fn file_has_key(path: &Path, key: &str) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        tracing::debug!(path = %path.display(), "unreadable file skipped in key search");
        return false;
    };
    match parse_document(&content, KNOWN_HEADERS) {
        // The whole document is not a key.
        Ok(doc) => matches!(tree_get(&doc.tree, key), Some(Lookup::Value(_))),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unparsable file skipped in key search");
            false
        }
    }
}
