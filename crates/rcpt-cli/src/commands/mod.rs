//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod stitch;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use rcpt_core::models::config::RcptConfig;
use rcpt_core::{HybridReceiptParser, LineStitcher, OcrInput};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

/// Load configuration from `--config`, the default file, or built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RcptConfig> {
    if let Some(path) = config_path {
        return Ok(RcptConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(RcptConfig::from_file(&default_path)?)
    } else {
        Ok(RcptConfig::default())
    }
}

/// Read a receipt file: `.txt` is plain lines, `.json` an OCR document.
pub fn read_input(path: &Path) -> anyhow::Result<OcrInput> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "txt" => Ok(OcrInput::from_text(&fs::read_to_string(path)?)),
        "json" => serde_json::from_str(&fs::read_to_string(path)?)
            .map_err(|e| anyhow::anyhow!("Invalid OCR document {}: {}", path.display(), e)),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Check if a path has an extension `read_input` understands.
pub fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "txt" | "json")
}

/// Stitcher configured from `stitch.*`.
pub fn build_stitcher(config: &RcptConfig) -> LineStitcher {
    LineStitcher::new().with_row_threshold_ratio(config.stitch.row_threshold_ratio)
}

/// Hybrid parser configured from `assistant.*` and `extraction.*`.
///
/// The cloud key is read from the environment variable named in the config.
/// No on-device model exists on the command line.
pub fn build_parser(config: &RcptConfig, offline: bool) -> anyhow::Result<HybridReceiptParser> {
    let mut config = config.clone();
    if offline {
        config.assistant.on_device_enabled = false;
        config.assistant.cloud_enabled = false;
    }

    let api_key = std::env::var(&config.assistant.cloud_api_key_env).ok();
    if config.assistant.cloud_enabled && api_key.is_none() {
        debug!(
            "{} not set, cloud assistant disabled",
            config.assistant.cloud_api_key_env
        );
    }

    Ok(HybridReceiptParser::from_config(&config, None, api_key)?)
}
