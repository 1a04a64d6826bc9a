//! Configuration management

pub mod commands;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::languages::AUTO_DETECT;
use crate::translate::endpoint::DEFAULT_ENDPOINT;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "polyglotsync";

pub const DEFAULT_BATCH_CHAR_BUDGET: usize = 600;
pub const DEFAULT_MERGE_MIN_LENGTH: usize = 7;
pub const DEFAULT_RETRY_LENGTH_RATIO: f64 = 0.4;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub book: BookConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    /// Preferred language for messages and book labels
    #[serde(default)]
    pub ui_language: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum packed characters per request
    #[serde(default = "default_batch_char_budget")]
    pub batch_char_budget: usize,

    /// Fragments shorter than this are folded into the previous sentence
    #[serde(default = "default_merge_min_length")]
    pub merge_min_length: usize,

    /// Results shorter than this fraction of the request are fetched again
    #[serde(default = "default_retry_length_ratio")]
    pub retry_length_ratio: f64,

    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Maximum concurrent endpoint requests
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_batch_char_budget() -> usize {
    DEFAULT_BATCH_CHAR_BUDGET
}

fn default_merge_min_length() -> usize {
    DEFAULT_MERGE_MIN_LENGTH
}

fn default_retry_length_ratio() -> f64 {
    DEFAULT_RETRY_LENGTH_RATIO
}

fn default_delay_min_ms() -> u64 {
    100
}

fn default_delay_max_ms() -> u64 {
    300
}

fn default_max_in_flight() -> usize {
    8
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_char_budget: default_batch_char_budget(),
            merge_min_length: default_merge_min_length(),
            retry_length_ratio: default_retry_length_ratio(),
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Source language code, or "auto" to detect it
    #[serde(default = "default_source_language")]
    pub source_language: String,

    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Used when detection fails
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_source_language() -> String {
    AUTO_DETECT.to_string()
}

fn default_target_languages() -> Vec<String> {
    vec!["fr".to_string()]
}

fn default_fallback_language() -> String {
    "en".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_languages: default_target_languages(),
            fallback_language: default_fallback_language(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Book title; the localized "Bilingual Book" when unset
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default = "default_author")]
    pub author: String,
}

fn default_author() -> String {
    "PolyglotSync".to_string()
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: None,
            author: default_author(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Load config from default location
    pub fn load() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config path")?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save config to default location
    pub fn save(&self) -> Result<PathBuf> {
        let dir = Self::config_dir().context("Could not determine config directory")?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content).context("Failed to write config file")?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pipeline.batch_char_budget, 600);
        assert_eq!(config.pipeline.merge_min_length, 7);
        assert_eq!(config.pipeline.retry_length_ratio, 0.4);
        assert_eq!(
            (config.pipeline.delay_min_ms, config.pipeline.delay_max_ms),
            (100, 300)
        );
        assert_eq!(config.translation.source_language, "auto");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            "[pipeline]\nbatch_char_budget = 250\n\n[translation]\ntarget_languages = [\"de\", \"ja\"]\n",
        )
        .unwrap();
        assert_eq!(config.pipeline.batch_char_budget, 250);
        assert_eq!(config.pipeline.max_in_flight, 8);
        assert_eq!(config.translation.target_languages, vec!["de", "ja"]);
        assert_eq!(config.translation.fallback_language, "en");
        assert_eq!(config.book.author, "PolyglotSync");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.general.ui_language = Some("es".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.general.ui_language.as_deref(), Some("es"));
    }
}
