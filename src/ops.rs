//! Scan operations and their result type.
//!
//! Provides the logic behind `show`, `get`, `options`, `list` and `bundles`,
//! and the `ScanResult` enum that callers use to display results.

use std::fmt;
use std::path::PathBuf;

use crate::bundle::Bundle;
use crate::document::KConfig;
use crate::error::KConfigError;
use crate::query;

/// Result of a scan operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult {
    /// A serialized document or subtree.
    Document(String),
    /// A single boot override value.
    Value { key: String, value: String },
    /// Flattened `key = value` pairs of the merged tree.
    Listing { entries: Vec<(String, String)> },
    /// Files containing a key.
    Paths(Vec<PathBuf>),
    /// Bundles of the merged tree.
    Bundles(Vec<Bundle>),
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanResult::Document(text) => write!(f, "{}", text.trim_end_matches('\n')),
            ScanResult::Value { value, .. } => write!(f, "{value}"),
            ScanResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
            ScanResult::Paths(paths) => {
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
            ScanResult::Bundles(bundles) => {
                let targets = bundles.iter().flat_map(|b| &b.targets);
                for (i, target) in targets.enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{target}")?;
                }
                Ok(())
            }
        }
    }
}

/// The whole merged document, as YAML with its header or as JSON.
pub fn show(config: &KConfig, json: bool) -> Result<ScanResult, KConfigError> {
    let text = if json {
        config.to_json()?
    } else {
        config.to_yaml()?
    };
    Ok(ScanResult::Document(text))
}

/// Serialized YAML of the value at a dotted path.
pub fn get_value(config: &KConfig, key: &str) -> Result<ScanResult, KConfigError> {
    Ok(ScanResult::Document(config.query(key)?))
}

/// Literal value of `options.<key>`.
pub fn option_value(config: &KConfig, key: &str) -> Result<ScanResult, KConfigError> {
    let value = config
        .options(key)
        .ok_or_else(|| KConfigError::KeyNotFound(format!("options.{key}")))?;
    Ok(ScanResult::Value {
        key: key.into(),
        value,
    })
}

/// All leaves of the merged tree as flattened dotted key-value pairs.
pub fn list_values(config: &KConfig) -> ScanResult {
    ScanResult::Listing {
        entries: query::flatten(config.data()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigTree;

    fn config(yaml: &str) -> KConfig {
        let tree: ConfigTree = serde_yaml::from_str(yaml).unwrap();
        KConfig::new(Some("#kairos-config".into()), tree)
    }

    #[test]
    fn show_yaml_includes_header() {
        let result = show(&config("a: 1\n"), false).unwrap();
        assert_eq!(result.to_string(), "#kairos-config\na: 1");
    }

    #[test]
    fn show_json_has_no_header() {
        let result = show(&config("a: 1\n"), true).unwrap();
        let text = result.to_string();
        assert!(!text.contains("#kairos-config"));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["a"], 1);
    }

    #[test]
    fn get_subtree() {
        let result = get_value(&config("options:\n  foo: bar\n"), "options").unwrap();
        assert_eq!(result, ScanResult::Document("foo: bar\n".into()));
    }

    #[test]
    fn get_missing_is_key_not_found() {
        let result = get_value(&config("a: 1\n"), "b");
        assert!(matches!(result, Err(KConfigError::KeyNotFound(_))));
    }

    #[test]
    fn option_value_found() {
        let result = option_value(&config("options:\n  foo: bar\n"), "foo").unwrap();
        assert_eq!(
            result,
            ScanResult::Value {
                key: "foo".into(),
                value: "bar".into()
            }
        );
    }

    #[test]
    fn option_value_missing() {
        let result = option_value(&config("a: 1\n"), "foo");
        assert!(matches!(result, Err(KConfigError::KeyNotFound(k)) if k == "options.foo"));
    }

    #[test]
    fn listing_display() {
        let result = list_values(&config("a: 1\nb:\n  c: x\n"));
        assert_eq!(result.to_string(), "a = 1\nb.c = x");
    }

    #[test]
    fn paths_display_one_per_line() {
        let result = ScanResult::Paths(vec!["/oem/a.yaml".into(), "/oem/b.yaml".into()]);
        assert_eq!(result.to_string(), "/oem/a.yaml\n/oem/b.yaml");
    }

    #[test]
    fn bundles_display_lists_targets() {
        let result = ScanResult::Bundles(vec![
            Bundle {
                targets: vec!["a".into(), "b".into()],
                ..Bundle::default()
            },
            Bundle {
                targets: vec!["c".into()],
                ..Bundle::default()
            },
        ]);
        assert_eq!(result.to_string(), "a\nb\nc");
    }
}
