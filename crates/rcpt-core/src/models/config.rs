//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Line stitching configuration.
    pub stitch: StitchConfig,

    /// Rule-based extraction configuration.
    pub extraction: ExtractionConfig,

    /// Generative assistant configuration.
    pub assistant: AssistantConfig,
}

/// Line stitching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    /// Fraction of the mean fragment height within which two fragments share a row.
    pub row_threshold_ratio: f32,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            row_threshold_ratio: 0.5,
        }
    }
}

/// Rule-based extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of leading non-empty lines searched for the store name.
    pub store_name_window: usize,

    /// Minimum store name length in characters.
    pub min_store_name_len: usize,

    /// Item names this short are replaced by the previous line.
    pub short_name_max_len: usize,

    /// How many lines an orphaned price looks back for its name.
    pub name_lookback: usize,

    /// How many lines a tax label looks ahead for its amount.
    pub tax_lookahead: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            store_name_window: 5,
            min_store_name_len: 3,
            short_name_max_len: 4,
            name_lookback: 3,
            tax_lookahead: 2,
        }
    }
}

/// Generative assistant configuration.
///
/// API keys are never stored here; `cloud_api_key_env` only names the variable
/// the caller should read before building the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Consult the on-device model when the host provides one.
    pub on_device_enabled: bool,

    /// Consult the cloud endpoint when a key is supplied.
    pub cloud_enabled: bool,

    /// Base URL of the OpenAI-compatible endpoint.
    pub cloud_base_url: String,

    /// Model requested from the endpoint.
    pub cloud_model: String,

    /// Transport timeout for one cloud request.
    pub cloud_timeout_secs: u64,

    /// Environment variable holding the API key.
    pub cloud_api_key_env: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            on_device_enabled: true,
            cloud_enabled: true,
            cloud_base_url: "https://api.openai.com/v1".to_string(),
            cloud_model: "gpt-4o-mini".to_string(),
            cloud_timeout_secs: 30,
            cloud_api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
