//! Collection pipeline orchestration.
//!
//! Extraction is pure per file and fans out over rayon; everything that
//! touches shared state (aggregation, merge order, writes) runs in one
//! deterministic sequential pass afterwards, because merge order decides
//! collision outcomes. A run either completes a file's write or does not
//! start it: collections are fully merged in memory before the first byte
//! hits disk, and regenerated sources are written only after the collection
//! pass succeeded.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::collect::NamespaceAggregates;
use crate::core::export::ExportSnapshot;
use crate::core::matcher::TagMatcher;
use crate::core::regenerate::regenerate_file;
use crate::core::resolve::{NamespaceResolver, filter_placed, filter_valid, resolve_tags};
use crate::core::tag::{ArgPosition, TagMatch, process};
use crate::core::writer::{Collector, write_collections};
use crate::logger::LogSink;

/// One source file handed to the pipeline by discovery.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub absolute: PathBuf,
    pub relative: PathBuf,
}

/// Per-run settings consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub tag_name: String,
    pub arg_position: ArgPosition,
    /// Library mode: write an export snapshot instead of collections.
    pub library: bool,
    /// Where generated artifacts live; collections go through the
    /// collector backend, the export snapshot lands here directly.
    pub output_dir: PathBuf,
    /// Base language code declared for exported translations.
    pub language: String,
    pub package_name: String,
    /// Remove the output location and rebuild from scratch.
    pub clean: bool,
    /// Rewrite in-source tag configurations that drifted from resolution.
    pub regenerate: bool,
    /// Whether scanned tags count as coming from an imported library.
    pub from_library: bool,
}

/// Counts reported to the operator at the end of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub files_scanned: usize,
    pub tags_found: usize,
    pub tags_dropped: usize,
    pub namespaces_written: Vec<String>,
    pub files_regenerated: usize,
}

struct FileScan {
    file: SourceFile,
    content: String,
    matches: Vec<TagMatch>,
}

pub struct Pipeline<'a> {
    matcher: TagMatcher,
    options: PipelineOptions,
    resolver: &'a dyn NamespaceResolver,
    collector: &'a dyn Collector,
    logger: &'a dyn LogSink,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        options: PipelineOptions,
        resolver: &'a dyn NamespaceResolver,
        collector: &'a dyn Collector,
        logger: &'a dyn LogSink,
    ) -> Result<Self> {
        Ok(Self {
            matcher: TagMatcher::new(&options.tag_name)?,
            options,
            resolver,
            collector,
            logger,
        })
    }

    /// Run the full pipeline over an already-resolved, ordered file list.
    pub fn run(&self, files: &[SourceFile]) -> Result<RunReport> {
        let matcher = &self.matcher;
        let scans: Vec<FileScan> = files
            .par_iter()
            .map(|file| -> Result<FileScan> {
                let content = fs::read_to_string(&file.absolute).with_context(|| {
                    format!("Failed to read source file: {}", file.absolute.display())
                })?;
                let matches = matcher.matches(&content);
                Ok(FileScan {
                    file: file.clone(),
                    content,
                    matches,
                })
            })
            .collect::<Result<_>>()?;

        let mut report = RunReport {
            files_scanned: scans.len(),
            ..RunReport::default()
        };
        let mut aggregates = NamespaceAggregates::new();
        let mut regenerated: Vec<(PathBuf, String)> = Vec::new();
        let mut snapshot = ExportSnapshot::new(
            self.options.language.clone(),
            self.options.package_name.clone(),
        );

        for scan in &scans {
            report.tags_found += scan.matches.len();
            self.logger.debug(
                "found {count} tags in {file}",
                &[
                    ("count", scan.matches.len().to_string()),
                    ("file", scan.file.relative.display().to_string()),
                ],
            );

            if self.options.library {
                snapshot.add_file(&scan.file.relative, &scan.matches, self.options.arg_position);
            }

            let processed: Vec<_> = scan
                .matches
                .iter()
                .cloned()
                .map(|m| process(m, self.options.arg_position))
                .collect();
            let mut valid = filter_valid(processed, &scan.file.relative, self.logger);
            report.tags_dropped += scan.matches.len() - valid.len();

            resolve_tags(
                &mut valid,
                self.resolver,
                &scan.file.relative,
                self.options.from_library,
            );

            if self.options.regenerate
                && let Some(updated) = regenerate_file(&scan.content, &valid)
            {
                regenerated.push((scan.file.absolute.clone(), updated));
            }

            if self.options.library {
                continue;
            }

            let before = valid.len();
            let placed = filter_placed(valid, &scan.file.relative, self.logger);
            report.tags_dropped += before - placed.len();

            for tag in &placed {
                if let (Some(placement), Some(translations)) =
                    (tag.placement(), tag.translations.as_ref())
                {
                    aggregates
                        .insert(&placement.namespace, &placement.path, translations)
                        .with_context(|| {
                            format!(
                                "while collecting tag at {}:{}",
                                scan.file.relative.display(),
                                tag.matched.line
                            )
                        })?;
                }
            }
        }

        if self.options.library {
            if self.options.clean {
                self.collector.clean()?;
            }
            let path = snapshot.write(&self.options.output_dir)?;
            self.logger.info(
                "wrote export snapshot to {path}",
                &[("path", path.display().to_string())],
            );
        } else {
            report.namespaces_written =
                write_collections(&aggregates, self.collector, self.options.clean, self.logger)?;
        }

        for (path, content) in &regenerated {
            fs::write(path, content).with_context(|| {
                format!("Failed to write regenerated source: {}", path.display())
            })?;
        }
        report.files_regenerated = regenerated.len();

        Ok(report)
    }
}
