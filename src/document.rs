//! Parsing single sources and the merged [`KConfig`] document.

use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::bundle::{self, Bundle};
use crate::error::KConfigError;
use crate::header;
use crate::query;
use crate::types::{ConfigTree, SkippedFile};
use crate::validate;

/// Root key holding boot overrides.
pub const OPTIONS_ROOT: &str = "options";

/// One source text split into its header and its mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub header: Option<String>,
    pub tree: ConfigTree,
}

/// Parse one source text.
///
/// A first line matching one of `recognized` is taken as the header. Empty
/// documents give an empty tree. Anything whose top level is not a mapping is
/// an error, so the caller can decide to skip it.
pub fn parse_document(
    text: &str,
    recognized: &[&str],
) -> Result<ParsedDocument, serde_yaml::Error> {
    let (found, body) = header::split_header(text, recognized);
    let header = found.map(str::to_string);

    if body.trim().is_empty() {
        return Ok(ParsedDocument {
            header,
            tree: ConfigTree::new(),
        });
    }

    let tree = match serde_yaml::from_str::<Value>(body)? {
        Value::Null => ConfigTree::new(),
        other => serde_yaml::from_value::<ConfigTree>(other)?,
    };
    Ok(ParsedDocument { header, tree })
}

/// The merged configuration produced by a scan.
///
/// Serializes (via [`Display`](fmt::Display)) as the header line followed by
/// the YAML body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KConfig {
    header: Option<String>,
    tree: ConfigTree,
    sources: Vec<PathBuf>,
    skipped: Vec<SkippedFile>,
}

impl KConfig {
    pub fn new(header: Option<String>, tree: ConfigTree) -> Self {
        Self {
            header,
            tree,
            sources: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn with_diagnostics(
        mut self,
        sources: Vec<PathBuf>,
        skipped: Vec<SkippedFile>,
    ) -> Self {
        self.sources = sources;
        self.skipped = skipped;
        self
    }

    /// The header emitted as the first line, if any.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// The merged tree.
    pub fn data(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }

    /// Files that contributed to the merge, in merge order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Files the scan discarded.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Serialized YAML of the value at a dotted path, newline-terminated.
    pub fn query(&self, path: &str) -> Result<String, KConfigError> {
        query::query(&self.tree, path)
    }

    /// Literal value of `options.<key>`. `key` is not split on dots.
    pub fn options(&self, key: &str) -> Option<String> {
        let options = self.tree.get(OPTIONS_ROOT)?.as_mapping()?;
        query::scalar_to_string(options.get(key)?)
    }

    /// Bundles listed under the reserved `bundles` key.
    pub fn bundles(&self) -> Result<Vec<Bundle>, KConfigError> {
        bundle::bundles(&self.tree)
    }

    /// Project the tree onto a caller-defined type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, KConfigError> {
        serde_yaml::from_value(Value::Mapping(self.tree.clone())).map_err(KConfigError::Decode)
    }

    /// Like [`decode`](Self::decode), but keys `T` does not consume are errors.
    pub fn decode_strict<T: DeserializeOwned>(&self) -> Result<T, KConfigError> {
        let text = self.to_yaml()?;
        validate::decode_strict(&self.tree, &text)
    }

    /// Header line plus YAML body.
    pub fn to_yaml(&self) -> Result<String, KConfigError> {
        let body = if self.tree.is_empty() {
            String::new()
        } else {
            serde_yaml::to_string(&self.tree).map_err(|e| KConfigError::Serialize(e.to_string()))?
        };
        Ok(header::attach_header(self.header(), &body))
    }

    /// The tree as pretty-printed JSON. The header is not part of it.
    pub fn to_json(&self) -> Result<String, KConfigError> {
        serde_json::to_string_pretty(&self.tree).map_err(|e| KConfigError::Serialize(e.to_string()))
    }
}

impl fmt::Display for KConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_yaml().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
