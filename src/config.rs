//! TOML configuration parsing and validation.
//!
//! Every section is optional; missing values fall back to the defaults the
//! tool has always shipped with (three snippets per file, 80/120 characters
//! of context, 600-wide probe batches up to index 5000).
//!
//! ```toml
//! [source]
//! root = "http://localhost:8000/"
//! manifest = "manifest.json"
//! base_dir = "txt/"
//!
//! [search]
//! max_snippets_per_file = 3
//!
//! [generate]
//! batch_size = 600
//! max_index = 5000
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::classify::KeywordTables;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,
}

/// Where the manifest and the transcript files live.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// An `http(s)://` URL or a local directory.
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    /// Per-request timeout. Absent means requests may wait forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            manifest: default_manifest(),
            base_dir: default_base_dir(),
            timeout_secs: None,
        }
    }
}

fn default_root() -> String {
    "http://localhost:8000/".to_string()
}
fn default_manifest() -> String {
    "manifest.json".to_string()
}
fn default_base_dir() -> String {
    "txt/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_snippets")]
    pub max_snippets_per_file: usize,
    #[serde(default = "default_chars_before")]
    pub chars_before: usize,
    #[serde(default = "default_chars_after")]
    pub chars_after: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_snippets_per_file: default_max_snippets(),
            chars_before: default_chars_before(),
            chars_after: default_chars_after(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_max_snippets() -> usize {
    3
}
fn default_chars_before() -> usize {
    80
}
fn default_chars_after() -> usize {
    120
}
fn default_debounce_ms() -> u64 {
    140
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerateConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_max_index")]
    pub max_index: u32,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_index: default_max_index(),
            prefix: default_prefix(),
            suffix: default_suffix(),
        }
    }
}

fn default_batch_size() -> u32 {
    600
}
fn default_max_index() -> u32 {
    5000
}
fn default_prefix() -> String {
    "_chat ".to_string()
}
fn default_suffix() -> String {
    ".txt".to_string()
}

/// Replacement keyword tables. Sections left out keep the built-in table.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub languages: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Built-in configuration used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Keyword tables in effect: the built-in ones, overridden by `[classifier]`.
    pub fn keyword_tables(&self) -> Result<KeywordTables> {
        let mut tables = KeywordTables::default();
        if let Some(ref overrides) = self.classifier {
            tables.apply_overrides(overrides)?;
        }
        Ok(tables)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path`, or fall back to [`Config::minimal`] when `path` is the
/// default location and nothing is there.
pub fn load_config_or_default(path: &Path, is_default_path: bool) -> Result<Config> {
    if is_default_path && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using built-in defaults");
        return Ok(Config::minimal());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    if config.source.root.trim().is_empty() {
        bail!("source.root must not be empty");
    }
    if config.source.manifest.trim().is_empty() {
        bail!("source.manifest must not be empty");
    }

    if config.search.max_snippets_per_file == 0 {
        bail!("search.max_snippets_per_file must be >= 1");
    }

    if config.generate.batch_size == 0 {
        bail!("generate.batch_size must be >= 1");
    }
    if config.generate.max_index == 0 {
        bail!("generate.max_index must be >= 1");
    }

    if let Some(ref classifier) = config.classifier {
        for (label, keywords) in classifier.languages.iter().chain(&classifier.categories) {
            for kw in keywords {
                if kw.is_empty() {
                    bail!("classifier table '{}' contains an empty keyword", label);
                }
                if kw.to_lowercase() != *kw {
                    bail!(
                        "classifier keyword '{}' in '{}' must be lowercase",
                        kw,
                        label
                    );
                }
            }
        }
    }

    // Surfaces unknown language tags early.
    config.keyword_tables()?;

    Ok(())
}
