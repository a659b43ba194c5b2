//! hookscan - hooking framework self-check
//!
//! Answers one question: is the hooking framework's bridge library mapped
//! into this process? The answer comes from scanning `/proc/self/maps` for a
//! known artifact name on a line that names a file path.
//!
//! The library is built both as an rlib and as a cdylib; with the `jni`
//! feature the cdylib exports the check as a JNI native method.

pub mod config;
pub mod detection;
pub mod maps;
pub mod scanner;
pub mod signature;

#[cfg(feature = "jni")]
pub mod ffi;

// Re-export commonly used types
pub use config::{Config, ScannerConfig};
pub use detection::{Detection, DetectionReport};
pub use scanner::MapsScanner;
pub use signature::{SignatureSet, XPOSED_BRIDGE_JAR};

/// Whether the hooking framework is mapped into the calling process.
///
/// Reads `/proc/self/maps` afresh on every call. Returns `false` when the
/// listing cannot be read.
pub fn is_hooking_framework_present() -> bool {
    MapsScanner::default().is_hooking_framework_present()
}
