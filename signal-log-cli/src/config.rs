//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use signal_log_decoder::{DecoderConfig, PlotStyle};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write here instead of stdout
    pub file: Option<PathBuf>,
    /// Include every x/y point in JSON output, not just the statistics
    #[serde(default = "default_true")]
    pub include_points: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            file: None,
            include_points: default_true(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub maximum: Option<f64>,
    pub line_mode: bool,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

impl AppConfig {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(maximum) = overrides.maximum {
            self.decoder.maximum = maximum;
        }
        // The flag can only switch line mode on
        if overrides.line_mode {
            self.decoder.plot_style = PlotStyle::Lines;
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if overrides.output.is_some() {
            self.output.file = overrides.output;
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Reject settings the decoder cannot work with
pub fn validate(config: &AppConfig) -> Result<()> {
    let decoder = &config.decoder;

    if decoder.maximum.is_nan() {
        bail!("maximum must be a number");
    }
    if decoder.wildcard.is_empty() || decoder.wildcard.contains(char::is_whitespace) {
        bail!("wildcard must be a single non-empty token, got {:?}", decoder.wildcard);
    }
    if decoder.wildcard.contains(decoder.comment_marker) {
        bail!(
            "wildcard {:?} contains the comment marker {:?}",
            decoder.wildcard,
            decoder.comment_marker
        );
    }
    if decoder.terminator.trim().is_empty() || decoder.terminator.contains(decoder.comment_marker) {
        bail!("invalid terminator {:?}", decoder.terminator);
    }
    if decoder.terminator.trim() != decoder.terminator {
        bail!("terminator {:?} has surrounding whitespace", decoder.terminator);
    }

    Ok(())
}
