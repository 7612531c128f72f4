//! Turn a kernel command line into a nested `ConfigTree`.
//!
//! Each `options.install.device="/dev/sda"` token is expanded into the nested
//! mapping structure needed for deep-merge with the scanned documents. Only
//! tokens whose root key is allow-listed survive; unrelated kernel flags
//! (`quiet`, `console=tty0`, `root=LABEL=COS_STATE`) are dropped. Parsing never
//! fails: anything that is not a well-formed `key=value` token is skipped.

use serde_yaml::Value;

use crate::types::ConfigTree;

/// One `dotted.key=value` pair from a command line, quotes already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootToken {
    pub key: String,
    pub value: String,
}

impl BootToken {
    /// First segment of the dotted key.
    pub fn root(&self) -> &str {
        self.key.split('.').next().unwrap_or_default()
    }
}

/// Parse `line` and keep only tokens rooted at one of `roots`.
///
/// `zz.foo="baa" options.foo=bar` with roots `["options"]` becomes
/// `{options: {foo: bar}}`. If several tokens target the same key, the last
/// one wins. Values stay strings.
pub fn parse_boot_line<S: AsRef<str>>(line: &str, roots: &[S]) -> ConfigTree {
    let mut tree = ConfigTree::new();
    for token in tokenize(line) {
        if !roots.iter().any(|r| r.as_ref() == token.root()) {
            continue;
        }
        let segments: Vec<&str> = token.key.split('.').collect();
        set_nested(&mut tree, &segments, Value::String(token.value));
    }
    tree
}

/// Split a command line into well-formed tokens, skipping everything else.
pub fn tokenize(line: &str) -> Vec<BootToken> {
    split_fields(line)
        .iter()
        .filter_map(|field| parse_token(field))
        .collect()
}

/// Split on whitespace outside of quotes. Quotes stay in the field.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    fields.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        fields.push(current);
    }
    fields
}

fn parse_token(field: &str) -> Option<BootToken> {
    let (key, raw_value) = field.split_once('=')?;
    if key.is_empty()
        || key.contains(['"', '\''])
        || key.split('.').any(|segment| segment.is_empty())
    {
        return None;
    }
    Some(BootToken {
        key: key.to_string(),
        value: unquote(raw_value).to_string(),
    })
}

/// Strip one pair of surrounding quotes. An unterminated opening quote is
/// dropped on its own.
fn unquote(raw: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = raw.strip_prefix(q) {
            return inner.strip_suffix(q).unwrap_or(inner);
        }
    }
    raw
}

fn set_nested(tree: &mut ConfigTree, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [leaf] => {
            tree.insert(Value::from(*leaf), value);
        }
        [head, rest @ ..] => {
            let slot = tree
                .entry(Value::from(*head))
                .or_insert_with(|| Value::Mapping(ConfigTree::new()));
            if !slot.is_mapping() {
                *slot = Value::Mapping(ConfigTree::new());
            }
            if let Value::Mapping(sub) = slot {
                set_nested(sub, rest, value);
            }
        }
    }
}
