use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".tagletrc.json";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Identifier of the tag call to match in source files.
    #[serde(default = "default_tag_name")]
    pub tag_name: String,
    /// Which argument slot (1 or 2) carries the translations object.
    #[serde(default = "default_translation_arg_position")]
    pub translation_arg_position: u8,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_base_language_code")]
    pub base_language_code: String,
    /// Package name stamped into the export snapshot; defaults to the
    /// project directory name.
    #[serde(default)]
    pub package_name: Option<String>,
    /// Library mode: produce an export snapshot instead of collections.
    #[serde(default)]
    pub is_library: bool,
    /// Derive a namespace from the file stem for tags that declare none.
    #[serde(default)]
    pub namespace_from_path: bool,
}

fn default_tag_name() -> String {
    "tr".to_string()
}

fn default_translation_arg_position() -> u8 {
    1
}

fn default_includes() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_output_dir() -> String {
    "./translations".to_string()
}

fn default_base_language_code() -> String {
    "en".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_name: default_tag_name(),
            translation_arg_position: default_translation_arg_position(),
            includes: default_includes(),
            excludes: Vec::new(),
            output_dir: default_output_dir(),
            base_language_code: default_base_language_code(),
            package_name: None,
            is_library: false,
            namespace_from_path: false,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Checks the tag identifier, the argument position, and every glob
    /// pattern in `includes`/`excludes`.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_identifier(&self.tag_name) {
            bail!("'tagName' must be a valid identifier: \"{}\"", self.tag_name);
        }

        if !matches!(self.translation_arg_position, 1 | 2) {
            bail!(
                "'translationArgPosition' must be 1 or 2, got {}",
                self.translation_arg_position
            );
        }

        for pattern in &self.excludes {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'excludes': \"{}\"", pattern))?;
        }

        // Include patterns without wildcards are literal directory paths
        // and need no glob validation.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        Ok(())
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
