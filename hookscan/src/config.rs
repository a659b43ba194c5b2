//! TOML-based configuration for the scanner.

use crate::maps::{DEFAULT_MAX_LINE_LEN, SELF_MAPS_PATH};
use crate::signature::{SignatureSet, DEFAULT_SIGNATURES};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn to_string_vec(arr: &[&str]) -> Vec<String> {
    arr.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Mapping listing to read
    #[serde(default = "default_maps_path")]
    pub maps_path: PathBuf,
    /// Lines longer than this (terminator excluded) never match
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Artifact names that identify the hooking framework
    #[serde(default = "default_signatures")]
    pub signatures: Vec<String>,
}

fn default_maps_path() -> PathBuf {
    PathBuf::from(SELF_MAPS_PATH)
}

fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}

fn default_signatures() -> Vec<String> {
    to_string_vec(DEFAULT_SIGNATURES)
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            maps_path: default_maps_path(),
            max_line_len: default_max_line_len(),
            signatures: default_signatures(),
        }
    }
}

impl ScannerConfig {
    pub fn signature_set(&self) -> SignatureSet {
        SignatureSet::new(self.signatures.iter().cloned())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_line_len > 0, "scanner.max_line_len must be positive");
        ensure!(
            !self.signature_set().is_empty(),
            "scanner.signatures must contain at least one non-empty name"
        );
        Ok(())
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.scanner.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
