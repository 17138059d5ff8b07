use std::fmt;
use std::sync::Arc;

use super::{DigestEngine, is_hex_of_length};
use crate::error::{CoreError, CoreResult};

/// A user-supplied hash function producing hex text
pub type DigestFn = Arc<dyn Fn(&[u8]) -> String + Send + Sync>;

/// Input hashed once at construction to validate a pluggable function
pub const PROBE_VALUE: &[u8] = b"cardvault-probe";

/// Externally supplied digest function with a declared output length
///
/// Validated once in [`PluggableDigest::new`]: the probe value must hash to
/// exactly `output_length` hex characters.
#[derive(Clone)]
pub struct PluggableDigest {
    name: String,
    output_length: usize,
    func: DigestFn,
}

impl PluggableDigest {
    pub fn new(name: impl Into<String>, output_length: usize, func: DigestFn) -> CoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidPluggableDigest(
                "name must not be empty".into(),
            ));
        }
        if output_length == 0 {
            return Err(CoreError::InvalidPluggableDigest(format!(
                "{name}: output length must be non-zero"
            )));
        }

        let probe = func(PROBE_VALUE);
        if !is_hex_of_length(&probe, output_length) {
            return Err(CoreError::InvalidPluggableDigest(format!(
                "{name}: probe produced {probe:?}, expected {output_length} hex characters"
            )));
        }

        Ok(Self {
            name,
            output_length,
            func,
        })
    }

    /// Convenience for plain closures
    pub fn from_fn<F>(name: impl Into<String>, output_length: usize, func: F) -> CoreResult<Self>
    where
        F: Fn(&[u8]) -> String + Send + Sync + 'static,
    {
        Self::new(name, output_length, Arc::new(func))
    }
}

impl fmt::Debug for PluggableDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluggableDigest")
            .field("name", &self.name)
            .field("output_length", &self.output_length)
            .finish_non_exhaustive()
    }
}

impl DigestEngine for PluggableDigest {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_length(&self) -> usize {
        self.output_length
    }

    fn hash_hex(&self, bytes: &[u8]) -> String {
        (self.func)(bytes)
    }
}
