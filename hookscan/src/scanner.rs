//! Maps Scanner
//!
//! Scans a process's memory-mapping listing for a line naming one of the
//! hooking framework's artifacts. A line qualifies only when it also contains
//! a `/`, so a signature appearing outside a mapped file path is ignored.
//!
//! The listing is opened fresh on every call and closed on every exit path.
//! A listing that cannot be opened or read counts as "not detected".

use crate::config::ScannerConfig;
use crate::detection::{Detection, DetectionReport};
use crate::maps::{maps_path_for_pid, MapsLine, MapsReader};
use crate::signature::SignatureSet;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, trace};

const PATH_SEPARATOR: u8 = b'/';

#[derive(Debug, Clone)]
pub struct MapsScanner {
    config: ScannerConfig,
    signatures: SignatureSet,
}

impl Default for MapsScanner {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl MapsScanner {
    pub fn new(config: ScannerConfig) -> Self {
        let signatures = config.signature_set();
        Self { config, signatures }
    }

    /// Scanner for the listing of another process.
    pub fn for_pid(pid: u32) -> Self {
        Self::new(ScannerConfig {
            maps_path: maps_path_for_pid(pid),
            ..ScannerConfig::default()
        })
    }

    /// Replace the signature set.
    pub fn with_signatures(mut self, signatures: SignatureSet) -> Self {
        self.config.signatures = signatures.iter().map(String::from).collect();
        self.signatures = signatures;
        self
    }

    pub fn maps_path(&self) -> &Path {
        &self.config.maps_path
    }

    pub fn signatures(&self) -> &SignatureSet {
        &self.signatures
    }

    /// Whether the hooking framework is mapped into the scanned process.
    ///
    /// Never fails: an unavailable listing is reported as `false`.
    pub fn is_hooking_framework_present(&self) -> bool {
        match self.try_scan() {
            Ok(Some(detection)) => {
                info!(
                    signature = %detection.signature,
                    line = detection.line_number,
                    path = %detection.pathname(),
                    "Hooking framework artifact mapped"
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                debug!(error = format!("{:#}", e), "Mapping listing unavailable");
                false
            }
        }
    }

    /// Scan the configured listing, surfacing why it could not be read.
    pub fn try_scan(&self) -> Result<Option<Detection>> {
        let path = &self.config.maps_path;
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        self.scan_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Run the check and package the outcome, including any read failure.
    pub fn report(&self) -> DetectionReport {
        match self.try_scan() {
            Ok(detection) => DetectionReport::new(self.maps_path(), detection),
            Err(e) => DetectionReport::unavailable(self.maps_path(), &e),
        }
    }

    /// Scan an already opened listing. Stops at the first qualifying line.
    pub fn scan_reader<R: BufRead>(&self, reader: R) -> Result<Option<Detection>> {
        let mut lines = MapsReader::new(reader, self.config.max_line_len);

        while let Some(line) = lines.next_line()? {
            let (number, bytes) = match line {
                MapsLine::Entry { number, bytes } => (number, bytes),
                MapsLine::Overlong { number } => {
                    trace!(line = number, "Skipping overlong mapping line");
                    continue;
                }
            };

            let Some(signature) = self.signatures.find_in(bytes) else {
                continue;
            };

            if !bytes.contains(&PATH_SEPARATOR) {
                debug!(line = number, signature, "Signature without a path, ignoring");
                continue;
            }

            let text = String::from_utf8_lossy(bytes);
            return Ok(Some(Detection::new(signature, number, text)));
        }

        Ok(None)
    }
}
