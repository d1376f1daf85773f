//! Deep merge engine for translation trees.
//!
//! A translation tree maps keys to string leaves or nested sub-trees, never
//! both and never arrays. Merging enforces that invariant as a hard error
//! because silently coercing a leaf into a subtree (or the reverse) would
//! corrupt previously translated content.

use serde_json::{Map, Value};
use thiserror::Error;

/// A translation tree: string leaves or nested mappings, insertion-ordered.
pub type TranslationTree = Map<String, Value>;

/// Shape violation raised while merging translation trees.
///
/// Both variants abort the collection run; the key path locates the
/// offending value in the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("shape conflict at '{path}': cannot overwrite a leaf with a subtree or a subtree with a leaf")]
    ShapeConflict { path: String },
    #[error("shape conflict at '{path}': translation trees admit no arrays")]
    ArrayValue { path: String },
}

/// Deep-merge `source` into `target` in place.
///
/// Returns whether any value actually changed. Equal leaves do not mark the
/// tree dirty, which is what lets the collection writer skip no-op writes.
/// Merging the same source twice is idempotent: the second call returns
/// `false` and leaves the target structurally unchanged.
pub fn merge(target: &mut TranslationTree, source: &TranslationTree) -> Result<bool, MergeError> {
    merge_at(target, source, "")
}

fn merge_at(
    target: &mut TranslationTree,
    source: &TranslationTree,
    prefix: &str,
) -> Result<bool, MergeError> {
    let mut changed = false;
    for (key, value) in source {
        let path = join_path(prefix, key);
        match value {
            Value::Array(_) => return Err(MergeError::ArrayValue { path }),
            Value::Object(source_child) => match target.get_mut(key) {
                Some(Value::Object(target_child)) => {
                    changed |= merge_at(target_child, source_child, &path)?;
                }
                Some(_) => return Err(MergeError::ShapeConflict { path }),
                None => {
                    reject_arrays(source_child, &path)?;
                    target.insert(key.clone(), Value::Object(source_child.clone()));
                    changed = true;
                }
            },
            leaf => match target.get(key) {
                Some(Value::Object(_)) => return Err(MergeError::ShapeConflict { path }),
                Some(existing) if existing == leaf => {}
                _ => {
                    target.insert(key.clone(), leaf.clone());
                    changed = true;
                }
            },
        }
    }
    Ok(changed)
}

/// Arrays anywhere in a fresh subtree are rejected before insertion.
fn reject_arrays(tree: &TranslationTree, prefix: &str) -> Result<(), MergeError> {
    for (key, value) in tree {
        let path = join_path(prefix, key);
        match value {
            Value::Array(_) => return Err(MergeError::ArrayValue { path }),
            Value::Object(child) => reject_arrays(child, &path)?,
            _ => {}
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
