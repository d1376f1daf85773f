//! Namespace resolution and tag filtering.
//!
//! Resolution is a pluggable strategy: a [`NamespaceResolver`] may rewrite
//! or derive the final `{namespace, path}` placement for each structurally
//! valid tag, or decline by returning `None`, in which case the
//! configuration literally written in the tag is used. Resolvers must be
//! deterministic for identical input, otherwise regeneration would not be
//! idempotent.
//!
//! Filtering runs in two stages, in order: structural validity first, then
//! resolvability. Both emit one diagnostic per dropped tag.

use std::path::Path;

use crate::core::tag::{ProcessedTag, TagConfig, Validity};
use crate::logger::LogSink;

/// Context handed to a resolver for one tag.
pub struct ResolveContext<'a> {
    /// Project-relative path of the file containing the tag.
    pub file: &'a Path,
    /// Whether the tag comes from an imported library rather than the
    /// project's own sources.
    pub from_library: bool,
}

/// Strategy hook deciding where a tag's translations are placed.
pub trait NamespaceResolver: Send + Sync {
    /// Return a (possibly modified) configuration, or `None` to decline.
    ///
    /// Declining falls back to the configuration written in the tag.
    fn resolve(&self, config: &TagConfig, context: &ResolveContext<'_>) -> Option<TagConfig>;
}

/// Default policy: always decline, keeping whatever `namespace`/`path`
/// were literally present in the tag.
pub struct LiteralResolver;

impl NamespaceResolver for LiteralResolver {
    fn resolve(&self, _config: &TagConfig, _context: &ResolveContext<'_>) -> Option<TagConfig> {
        None
    }
}

/// Derives a namespace from the file stem when the tag declares none.
///
/// `src/pages/checkout.tsx` puts its undeclared tags into the `checkout`
/// namespace; tags with an explicit namespace are left alone.
pub struct FileStemResolver;

impl NamespaceResolver for FileStemResolver {
    fn resolve(&self, config: &TagConfig, context: &ResolveContext<'_>) -> Option<TagConfig> {
        if config.namespace.is_some() {
            return None;
        }
        let stem = context.file.file_stem()?.to_str()?;
        let mut resolved = config.clone();
        resolved.namespace = Some(stem.to_string());
        Some(resolved)
    }
}

/// Run the resolver over every structurally valid tag, filling `resolved`.
pub fn resolve_tags(
    tags: &mut [ProcessedTag],
    resolver: &dyn NamespaceResolver,
    file: &Path,
    from_library: bool,
) {
    let context = ResolveContext { file, from_library };
    for tag in tags.iter_mut() {
        if tag.validity != Validity::Ok {
            continue;
        }
        let resolved = resolver
            .resolve(&tag.config, &context)
            .unwrap_or_else(|| tag.config.clone());
        tag.resolved = Some(resolved);
    }
}

/// First filter stage: drop structurally invalid tags.
///
/// Emits one diagnostic per dropped tag naming the validity reason and the
/// offending text.
pub fn filter_valid(
    tags: Vec<ProcessedTag>,
    file: &Path,
    logger: &dyn LogSink,
) -> Vec<ProcessedTag> {
    tags.into_iter()
        .filter(|tag| {
            if tag.validity == Validity::Ok {
                return true;
            }
            logger.warn(
                "skipping tag at {file}:{line} ({reason}): {text}",
                &[
                    ("file", file.display().to_string()),
                    ("line", tag.matched.line.to_string()),
                    ("reason", tag.validity.to_string()),
                    ("text", tag.matched.text.clone()),
                ],
            );
            false
        })
        .collect()
}

/// Second filter stage: drop tags without a resolvable placement.
///
/// Only meaningful after [`resolve_tags`] ran; structurally valid tags that
/// still lack a namespace cannot be collected anywhere.
pub fn filter_placed(
    tags: Vec<ProcessedTag>,
    file: &Path,
    logger: &dyn LogSink,
) -> Vec<ProcessedTag> {
    tags.into_iter()
        .filter(|tag| {
            if tag.placement().is_some() {
                return true;
            }
            logger.warn(
                "tag at {file}:{line} has no resolvable namespace; declare one in the tag or configure a namespace resolver: {text}",
                &[
                    ("file", file.display().to_string()),
                    ("line", tag.matched.line.to_string()),
                    ("text", tag.matched.text.clone()),
                ],
            );
            false
        })
        .collect()
}
