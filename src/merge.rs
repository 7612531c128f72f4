use serde_yaml::Value;

use crate::types::ConfigTree;

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a mapping for the same key, recurse.
/// Otherwise, `overlay`'s value wins. Existing keys keep their position,
/// new keys are appended.
pub fn deep_merge(mut base: ConfigTree, overlay: ConfigTree) -> ConfigTree {
    for (key, overlay_val) in overlay {
        let Some(slot) = base.get_mut(&key) else {
            base.insert(key, overlay_val);
            continue;
        };
        *slot = match (std::mem::take(slot), overlay_val) {
            (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
                Value::Mapping(deep_merge(base_map, overlay_map))
            }
            (_, overlay_val) => overlay_val,
        };
    }
    base
}

/// Fold trees in order: first = lowest priority, last = highest.
pub fn merge_all(trees: impl IntoIterator<Item = ConfigTree>) -> ConfigTree {
    trees.into_iter().fold(ConfigTree::new(), deep_merge)
}

/// Deep-merge only the root keys of `overlay` listed in `roots`.
///
/// Other overlay roots are dropped. Roots of `base` are never removed.
pub fn merge_scoped<S: AsRef<str>>(base: ConfigTree, overlay: ConfigTree, roots: &[S]) -> ConfigTree {
    let allowed: ConfigTree = overlay
        .into_iter()
        .filter(|(key, _)| {
            key.as_str()
                .is_some_and(|k| roots.iter().any(|r| r.as_ref() == k))
        })
        .collect();
    deep_merge(base, allowed)
}
