//! Source file discovery.
//!
//! Expands the configured include/exclude patterns into the ordered,
//! project-relative file list the core pipeline consumes. The core never
//! globs itself; this module is the only place pattern matching against the
//! file system happens. The walk order is sorted so runs are deterministic.

use std::path::Path;

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

use crate::config::Config;
use crate::core::SourceFile;

/// File extensions considered source files.
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "build"];

enum IncludeRule {
    /// A literal directory prefix, e.g. `src`.
    Dir(String),
    /// A glob pattern, e.g. `app/**/*.tsx`.
    Glob(Pattern),
}

/// Resolve the ordered source file list under `root` for this config.
pub fn discover_files(root: &Path, config: &Config) -> Result<Vec<SourceFile>> {
    let includes = config
        .includes
        .iter()
        .map(|pattern| {
            if pattern.contains('*') || pattern.contains('?') {
                Ok(IncludeRule::Glob(Pattern::new(pattern).with_context(
                    || format!("Invalid glob pattern in 'includes': \"{}\"", pattern),
                )?))
            } else {
                Ok(IncludeRule::Dir(pattern.trim_end_matches('/').to_string()))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let excludes = config
        .excludes
        .iter()
        .map(|pattern| {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'excludes': \"{}\"", pattern))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        });

    for entry in walker {
        let entry = entry.context("Failed to walk source tree")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !SOURCE_EXTENSIONS.contains(&extension) {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .context("walked file outside the source root")?;
        let relative_str = relative.to_string_lossy().replace('\\', "/");

        if !matches_includes(&includes, &relative_str) {
            continue;
        }
        if excludes.iter().any(|p| p.matches(&relative_str)) {
            continue;
        }

        files.push(SourceFile {
            absolute: path.to_path_buf(),
            relative: relative.to_path_buf(),
        });
    }

    Ok(files)
}

fn matches_includes(includes: &[IncludeRule], relative: &str) -> bool {
    if includes.is_empty() {
        return true;
    }
    includes.iter().any(|rule| match rule {
        IncludeRule::Dir(dir) => relative.starts_with(&format!("{dir}/")) || relative == dir,
        IncludeRule::Glob(pattern) => pattern.matches(relative),
    })
}
