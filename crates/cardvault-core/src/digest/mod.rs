//! Digest engines: bytes → fixed-length hex identity

mod builtin;
mod pluggable;

pub use builtin::BuiltinDigest;
pub use pluggable::{DigestFn, PROBE_VALUE, PluggableDigest};

use crate::error::{CoreError, CoreResult};

/// A deterministic, unsalted content digest
pub trait DigestEngine: Send + Sync {
    /// Canonical algorithm name, e.g. `"sha256"`
    fn name(&self) -> &str;

    /// Length of the hex digest in characters
    fn output_length(&self) -> usize;

    /// Hash without input checks; callers go through [`DigestEngine::digest`]
    fn hash_hex(&self, bytes: &[u8]) -> String;

    /// Digest non-empty input
    fn digest(&self, bytes: &[u8]) -> CoreResult<String> {
        if bytes.is_empty() {
            return Err(CoreError::EmptyInput);
        }
        Ok(self.hash_hex(bytes))
    }

    /// Check that `candidate` has this algorithm's length and is hex
    fn validate(&self, candidate: &str) -> bool {
        is_hex_of_length(candidate, self.output_length())
    }
}

pub(crate) fn is_hex_of_length(candidate: &str, length: usize) -> bool {
    candidate.len() == length && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Built-in algorithms, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Blake3,
}

impl DigestAlgorithm {
    /// Every built-in algorithm in ladder order
    pub const ALL: [DigestAlgorithm; 5] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Blake3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    /// Hex characters produced
    pub fn output_length(&self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 32,
            DigestAlgorithm::Sha1 => 40,
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
            DigestAlgorithm::Blake3 => 64,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            "blake3" | "b3" => Ok(DigestAlgorithm::Blake3),
            _ => Err(CoreError::UnknownAlgorithm(s.to_string())),
        }
    }
}
