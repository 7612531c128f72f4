//! Strict typed decode: detect keys a target type does not consume.
//!
//! Uses `serde_ignored` to deserialize the merged tree into `T` and capture
//! every key that `T` skips. Each one is reported with a best-effort line
//! number in the serialized document.

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::KConfigError;
use crate::types::ConfigTree;

/// Decode `tree` into `T`, failing on any key `T` ignores.
///
/// `text` is the serialized form of `tree` (header included) and is only used
/// to locate line numbers.
pub fn decode_strict<T: DeserializeOwned>(tree: &ConfigTree, text: &str) -> Result<T, KConfigError> {
    let mut unknown_keys: Vec<String> = Vec::new();

    let value: T = serde_ignored::deserialize(Value::Mapping(tree.clone()), |ignored_path| {
        unknown_keys.push(ignored_path.to_string());
    })
    .map_err(KConfigError::Decode)?;

    if unknown_keys.is_empty() {
        return Ok(value);
    }

    let errors: Vec<KConfigError> = unknown_keys
        .into_iter()
        .map(|key| {
            let line = find_key_line(text, &key);
            KConfigError::UnknownKey { key, line }
        })
        .collect();

    Err(KConfigError::UnknownKeys(errors))
}

/// Find the 1-indexed line number of a dotted key in block-style YAML.
///
/// Tracks the chain of parent keys by indentation. Keys inside sequences and
/// flow collections are not located. Returns 0 if the key cannot be found.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let mut parents: Vec<(usize, String)> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
            continue;
        }
        let Some(key) = block_key(trimmed) else {
            continue;
        };
        let indent = line.len() - trimmed.len();

        while parents.last().is_some_and(|(depth, _)| *depth >= indent) {
            parents.pop();
        }
        parents.push((indent, key.to_string()));

        if parents.len() == segments.len()
            && parents.iter().zip(&segments).all(|((_, k), s)| k.as_str() == *s)
        {
            return i + 1;
        }
    }
    0
}

/// The key of a `key: value` or `key:` line, quotes removed.
fn block_key(line: &str) -> Option<&str> {
    let (key, rest) = line.split_once(':')?;
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    Some(key.trim().trim_matches(['"', '\'']))
}
