//! Artifact signatures
//!
//! Names of files the hooking framework is known to map into a process.
//! A mapping listing line matches when it contains one of these names as a
//! contiguous substring.

/// Bridge library the framework injects into every process it hooks.
pub const XPOSED_BRIDGE_JAR: &str = "XposedBridge.jar";

/// Signatures checked when no configuration overrides them.
pub const DEFAULT_SIGNATURES: &[&str] = &[XPOSED_BRIDGE_JAR];

/// An ordered, immutable set of artifact signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSet {
    signatures: Vec<String>,
}

impl Default for SignatureSet {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURES.iter().copied())
    }
}

impl SignatureSet {
    /// Build a set from signature names. Empty names are dropped, since an
    /// empty needle would match every line.
    pub fn new<I, S>(signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let signatures = signatures
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty())
            .collect();

        Self { signatures }
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.signatures.iter().map(String::as_str)
    }

    /// Return the first signature contained in `line`, if any.
    pub fn find_in(&self, line: &[u8]) -> Option<&str> {
        self.iter()
            .find(|signature| find_pattern(line, signature.as_bytes()).is_some())
    }
}

/// Find a byte pattern in a buffer
pub fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
