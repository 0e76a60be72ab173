use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::filter::PlainTextParameters;
use crate::locale::LocaleId;
use crate::resource::MismatchPolicy;
use crate::skeleton::WriterOptions;

/// Application configuration module
/// This module handles loading, validating and saving the settings of the
/// extraction and merge engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source locale of the input documents
    #[serde(default = "default_source_locale")]
    pub source_locale: String,

    /// Target locale of the output documents
    #[serde(default = "default_target_locale")]
    pub target_locale: String,

    /// Encoding for input without a byte order mark
    #[serde(default = "default_encoding")]
    pub default_encoding: String,

    /// Output encoding; the input's encoding when absent
    #[serde(default)]
    pub output_encoding: Option<String>,

    /// Line break for the output; the input's when absent
    #[serde(default)]
    pub line_break: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Skeleton writer settings
    #[serde(default)]
    pub writer: WriterConfig,

    /// Segment handling
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Filter settings
    #[serde(default)]
    pub filters: FiltersConfig,

    /// Pseudo-translation settings
    #[serde(default)]
    pub pseudo: PseudoConfig,
}

/// Skeleton writer settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Copies kept for each referent; each reference consumes one
    #[serde(default = "default_referent_copies")]
    pub referent_copies: usize,

    /// Keep `language` and `encoding` properties untouched
    #[serde(default)]
    pub multilingual: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            referent_copies: default_referent_copies(),
            multilingual: false,
        }
    }
}

/// Segment handling
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SegmentationConfig {
    /// What to do when a target lacks source segments
    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,
}

/// Settings per filter
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct FiltersConfig {
    #[serde(default)]
    pub plaintext: PlainTextConfig,
}

/// Plain-text filter settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlainTextConfig {
    /// Turn inline tags into codes
    #[serde(default = "default_true")]
    pub extract_inline_codes: bool,

    /// Keep leading and trailing whitespace in the skeleton
    #[serde(default = "default_true")]
    pub trim_whitespace: bool,
}

impl Default for PlainTextConfig {
    fn default() -> Self {
        Self {
            extract_inline_codes: true,
            trim_whitespace: true,
        }
    }
}

/// Pseudo-translation settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PseudoConfig {
    #[serde(default = "default_pseudo_prefix")]
    pub prefix: String,

    #[serde(default = "default_pseudo_suffix")]
    pub suffix: String,

    /// Extra `~` characters per source character (0.0 to 2.0)
    #[serde(default)]
    pub expand_ratio: f32,
}

impl Default for PseudoConfig {
    fn default() -> Self {
        Self {
            prefix: default_pseudo_prefix(),
            suffix: default_pseudo_suffix(),
            expand_ratio: 0.0,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_target_locale() -> String {
    "fr".to_string()
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_referent_copies() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_pseudo_prefix() -> String {
    "[".to_string()
}

fn default_pseudo_suffix() -> String {
    "]".to_string()
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let source = self.source_locale_id()?;
        source.validate()?;
        let target = self.target_locale_id()?;
        target.validate()?;

        FileManager::encoding_for_label(&self.default_encoding)
            .context("Invalid default_encoding")?;
        if let Some(encoding) = &self.output_encoding {
            FileManager::encoding_for_label(encoding).context("Invalid output_encoding")?;
        }

        if let Some(line_break) = &self.line_break {
            if !matches!(line_break.as_str(), "\n" | "\r\n" | "\r") {
                return Err(anyhow!("line_break must be \\n, \\r\\n or \\r, got {:?}", line_break));
            }
        }

        if self.writer.referent_copies == 0 {
            return Err(anyhow!("writer.referent_copies must be at least 1"));
        }

        if !(0.0..=2.0).contains(&self.pseudo.expand_ratio) {
            return Err(anyhow!(
                "pseudo.expand_ratio must be between 0.0 and 2.0, got {}",
                self.pseudo.expand_ratio
            ));
        }

        Ok(())
    }

    pub fn source_locale_id(&self) -> Result<LocaleId> {
        LocaleId::new(&self.source_locale)
            .with_context(|| format!("Invalid source_locale '{}'", self.source_locale))
    }

    pub fn target_locale_id(&self) -> Result<LocaleId> {
        LocaleId::new(&self.target_locale)
            .with_context(|| format!("Invalid target_locale '{}'", self.target_locale))
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            referent_copies: self.writer.referent_copies,
            multilingual: self.writer.multilingual,
        }
    }

    /// Plain-text filter parameters, writer settings included
    pub fn plaintext_parameters(&self) -> PlainTextParameters {
        PlainTextParameters {
            extract_inline_codes: self.filters.plaintext.extract_inline_codes,
            trim_whitespace: self.filters.plaintext.trim_whitespace,
            writer: self.writer_options(),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_locale: default_source_locale(),
            target_locale: default_target_locale(),
            default_encoding: default_encoding(),
            output_encoding: None,
            line_break: None,
            log_level: LogLevel::default(),
            writer: WriterConfig::default(),
            segmentation: SegmentationConfig::default(),
            filters: FiltersConfig::default(),
            pseudo: PseudoConfig::default(),
        }
    }
}
