//! Namespace grouping: merging tags into per-namespace aggregates.
//!
//! Each filtered, resolved tag deep-merges its translations into the
//! aggregate for its namespace at its dot-delimited path. Tags are inserted
//! in file-then-source order, so on a key collision the later tag's leaf
//! wins; duplicate collisions surface through the changed-count report
//! rather than an error.

use std::collections::BTreeMap;

use crate::core::merge::{MergeError, TranslationTree, merge};

/// Per-namespace translation trees built up during one collection run.
///
/// Namespaces iterate in sorted order so write order is deterministic.
#[derive(Debug, Default)]
pub struct NamespaceAggregates {
    namespaces: BTreeMap<String, TranslationTree>,
}

impl NamespaceAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `translations` into `namespace` at `path` (`""` = root).
    ///
    /// Intermediate path segments are created as needed; descending through
    /// an existing string leaf is a shape conflict.
    pub fn insert(
        &mut self,
        namespace: &str,
        path: &str,
        translations: &TranslationTree,
    ) -> Result<bool, MergeError> {
        let mut node = self.namespaces.entry(namespace.to_string()).or_default();
        let mut walked = String::new();

        for segment in path.split('.').filter(|s| !s.is_empty()) {
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);
            let child = node
                .entry(segment.to_string())
                .or_insert_with(|| serde_json::Value::Object(TranslationTree::new()));
            match child {
                serde_json::Value::Object(map) => node = map,
                _ => {
                    return Err(MergeError::ShapeConflict {
                        path: walked.clone(),
                    });
                }
            }
        }

        merge(node, translations)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TranslationTree)> {
        self.namespaces.iter()
    }

    pub fn get(&self, namespace: &str) -> Option<&TranslationTree> {
        self.namespaces.get(namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }
}
