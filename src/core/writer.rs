//! Collection persistence: pluggable backend plus the write pass.
//!
//! A [`Collector`] is the strategy object that owns a namespace's backing
//! store. The default [`JsonCollector`] keeps one pretty-printed JSON file
//! per namespace under the output directory. The write pass merges each
//! non-empty aggregate with the existing on-disk tree and rewrites a file
//! only when the merge reports an actual change, so unchanged translation
//! files never churn in version control.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::core::collect::NamespaceAggregates;
use crate::core::merge::{TranslationTree, merge};
use crate::logger::LogSink;

/// Pluggable backend persisting and loading namespace translation trees.
pub trait Collector: Send + Sync {
    /// Where a namespace's collection lives; used in diagnostics.
    fn collection_path(&self, namespace: &str) -> PathBuf;

    /// Load the existing tree, `Ok(None)` when no collection exists yet.
    ///
    /// A corrupt collection is an error here; the write pass downgrades it
    /// to a warning and an empty-tree assumption.
    fn load(&self, namespace: &str) -> Result<Option<TranslationTree>>;

    /// Persist the full merged tree. Never called with a partial tree.
    fn store(&self, namespace: &str, tree: &TranslationTree) -> Result<()>;

    /// Remove the whole output location (clean mode).
    fn clean(&self) -> Result<()>;

    /// Called when a namespace has no existing collection.
    fn on_missing_collection(&self, _namespace: &str) {}

    fn pre_write(&self, _namespace: &str, _tree: &TranslationTree) -> Result<()> {
        Ok(())
    }

    fn post_write(&self, _namespace: &str) -> Result<()> {
        Ok(())
    }
}

/// Default backend: `<outputDir>/<namespace>.json`, pretty-printed UTF-8
/// with a trailing newline, key order preserved.
pub struct JsonCollector {
    output_dir: PathBuf,
}

impl JsonCollector {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Collector for JsonCollector {
    fn collection_path(&self, namespace: &str) -> PathBuf {
        self.output_dir.join(format!("{namespace}.json"))
    }

    fn load(&self, namespace: &str) -> Result<Option<TranslationTree>> {
        let path = self.collection_path(namespace);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read collection: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse collection: {}", path.display()))?;
        match value {
            Value::Object(map) => Ok(Some(map)),
            _ => bail!("Root of collection must be an object: {}", path.display()),
        }
    }

    fn store(&self, namespace: &str, tree: &TranslationTree) -> Result<()> {
        let path = self.collection_path(namespace);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(tree.clone()))
            .context("Failed to serialize collection")?;
        fs::write(&path, format!("{}\n", content))
            .with_context(|| format!("Failed to write collection: {}", path.display()))?;
        Ok(())
    }

    fn clean(&self) -> Result<()> {
        if self.output_dir.exists() {
            fs::remove_dir_all(&self.output_dir).with_context(|| {
                format!(
                    "Failed to remove output directory: {}",
                    self.output_dir.display()
                )
            })?;
        }
        Ok(())
    }
}

/// Persist every changed namespace aggregate.
///
/// Returns the namespaces actually rewritten, for operator reporting only.
/// In clean mode the output location is removed first and the
/// merge-with-existing step is skipped.
pub fn write_collections(
    aggregates: &NamespaceAggregates,
    collector: &dyn Collector,
    clean: bool,
    logger: &dyn LogSink,
) -> Result<Vec<String>> {
    if clean {
        collector.clean()?;
    }

    let mut written = Vec::new();
    for (namespace, aggregate) in aggregates.iter() {
        if aggregate.is_empty() {
            continue;
        }

        let mut tree = if clean {
            TranslationTree::new()
        } else {
            load_or_empty(collector, namespace, logger)
        };

        let changed = merge(&mut tree, aggregate)
            .with_context(|| format!("while merging collection \"{namespace}\""))?;
        if !changed {
            logger.debug(
                "collection \"{namespace}\" is up to date",
                &[("namespace", namespace.clone())],
            );
            continue;
        }

        collector.pre_write(namespace, &tree)?;
        collector.store(namespace, &tree)?;
        collector.post_write(namespace)?;
        logger.debug(
            "wrote collection \"{namespace}\" to {path}",
            &[
                ("namespace", namespace.clone()),
                (
                    "path",
                    collector.collection_path(namespace).display().to_string(),
                ),
            ],
        );
        written.push(namespace.clone());
    }

    Ok(written)
}

/// Missing or corrupt existing collections become an empty tree with a
/// warning; only write failures abort the run.
fn load_or_empty(
    collector: &dyn Collector,
    namespace: &str,
    logger: &dyn LogSink,
) -> TranslationTree {
    match collector.load(namespace) {
        Ok(Some(tree)) => tree,
        Ok(None) => {
            collector.on_missing_collection(namespace);
            TranslationTree::new()
        }
        Err(err) => {
            logger.warn(
                "existing collection \"{namespace}\" could not be read, starting from empty: {error}",
                &[
                    ("namespace", namespace.to_string()),
                    ("error", format!("{err:#}")),
                ],
            );
            TranslationTree::new()
        }
    }
}
