//! Detection results.

use crate::maps::MappedRegion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The listing line that qualified as evidence of the hooking framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub signature: String,
    /// 1-based line number within the listing
    pub line_number: usize,
    pub line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<MappedRegion>,
}

impl Detection {
    pub fn new(signature: impl Into<String>, line_number: usize, line: impl Into<String>) -> Self {
        let line = line.into();
        let region = MappedRegion::parse(&line);

        Self {
            signature: signature.into(),
            line_number,
            line,
            region,
        }
    }

    /// Mapped file path, falling back to the raw line when it did not parse.
    pub fn pathname(&self) -> &str {
        match &self.region {
            Some(region) if !region.pathname.is_empty() => &region.pathname,
            _ => &self.line,
        }
    }
}

/// Outcome of a single check, suitable for printing or shipping as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub timestamp: DateTime<Utc>,
    pub maps_path: PathBuf,
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
    /// Why the listing could not be read; the check then reports not detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionReport {
    pub fn new(maps_path: impl Into<PathBuf>, detection: Option<Detection>) -> Self {
        Self {
            timestamp: Utc::now(),
            maps_path: maps_path.into(),
            detected: detection.is_some(),
            detection,
            error: None,
        }
    }

    pub fn unavailable(maps_path: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
        Self {
            timestamp: Utc::now(),
            maps_path: maps_path.into(),
            detected: false,
            detection: None,
            error: Some(format!("{:#}", error)),
        }
    }
}
