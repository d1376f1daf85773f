//! Export snapshot for library mode.
//!
//! A library does not collect into namespace files; it publishes the raw
//! tag matches it contains so consuming projects can import and place them
//! under their own resolution policy. The snapshot is a derived artifact:
//! regenerated from scratch and fully overwritten on every run, never
//! merged.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::tag::{ArgPosition, TagMatch};

/// Well-known snapshot filename inside the output directory.
pub const EXPORT_FILE_NAME: &str = "taglet.export.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    /// Base language the raw translations are written in.
    pub language: String,
    pub package_name: String,
    /// Keyed by project-relative source file path.
    pub files: BTreeMap<String, ExportFile>,
}

#[derive(Debug, Serialize)]
pub struct ExportFile {
    pub matches: Vec<ExportMatch>,
}

/// One raw tag match; argument text is exported unparsed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
}

impl ExportSnapshot {
    pub fn new(language: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            package_name: package_name.into(),
            files: BTreeMap::new(),
        }
    }

    /// Record a file's matches; files without matches are omitted.
    pub fn add_file(&mut self, relative: &Path, matches: &[TagMatch], position: ArgPosition) {
        if matches.is_empty() {
            return;
        }
        let key = relative.to_string_lossy().replace('\\', "/");
        let matches = matches
            .iter()
            .map(|m| {
                let (translations, config) = match position {
                    ArgPosition::First => (&m.param1, &m.param2),
                    ArgPosition::Second => (&m.param2, &m.param1),
                };
                ExportMatch {
                    translations: translations.as_ref().map(|a| a.text.clone()),
                    config: config.as_ref().map(|a| a.text.clone()),
                    variable_name: m.variable_name.clone(),
                }
            })
            .collect();
        self.files.insert(key, ExportFile { matches });
    }

    /// Overwrite the snapshot artifact, creating the output dir if needed.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;
        let path = output_dir.join(EXPORT_FILE_NAME);
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize export snapshot")?;
        fs::write(&path, format!("{}\n", content))
            .with_context(|| format!("Failed to write export snapshot: {}", path.display()))?;
        Ok(path)
    }
}
