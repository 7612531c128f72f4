//! Typed view of the reserved `bundles` key.

use serde::{Deserialize, Serialize};

use crate::error::KConfigError;
use crate::types::ConfigTree;

/// Top-level key holding the bundle list.
pub const BUNDLES_KEY: &str = "bundles";

/// A set of installable targets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bundle {
    pub targets: Vec<String>,
    pub repository: Option<String>,
    pub rootfs_path: Option<String>,
    pub db_path: Option<String>,
    pub local_file: bool,
}

/// Decode the `bundles` sequence of `tree`.
///
/// A missing or null `bundles` key gives an empty list. Anything else that is
/// not a sequence of bundle mappings is a [`KConfigError::Decode`].
pub fn bundles(tree: &ConfigTree) -> Result<Vec<Bundle>, KConfigError> {
    match tree.get(BUNDLES_KEY) {
        None | Some(serde_yaml::Value::Null) => Ok(Vec::new()),
        Some(value) => serde_yaml::from_value(value.clone()).map_err(KConfigError::Decode),
    }
}
