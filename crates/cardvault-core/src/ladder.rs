//! Escalation ladder: a fixed weakest→strongest order of digest engines

use std::fmt;
use std::sync::Arc;

use crate::digest::{BuiltinDigest, DigestAlgorithm, DigestEngine, PluggableDigest};
use crate::error::{CoreError, CoreResult};

/// Immutable ladder position
///
/// Rungs are shared between ladders; `promote` returns a new value one rung
/// up and leaves `self` untouched, so swapping in the promoted ladder is a
/// single reference swap.
#[derive(Clone)]
pub struct EscalationLadder {
    rungs: Arc<[Arc<dyn DigestEngine>]>,
    position: usize,
}

impl EscalationLadder {
    /// Build from explicit rungs, weakest first
    pub fn new(rungs: Vec<Arc<dyn DigestEngine>>, position: usize) -> CoreResult<Self> {
        if rungs.is_empty() {
            return Err(CoreError::InvalidLadder("needs at least one rung".into()));
        }
        if position >= rungs.len() {
            return Err(CoreError::InvalidLadder(format!(
                "ladder position {position} out of range (0..{})",
                rungs.len()
            )));
        }
        Ok(Self {
            rungs: rungs.into(),
            position,
        })
    }

    /// `md5 → sha1 → sha256 → sha512 → blake3`, starting at `md5`
    pub fn standard() -> Self {
        Self {
            rungs: builtin_rungs().into(),
            position: 0,
        }
    }

    /// The standard ladder positioned at `algorithm`
    pub fn starting_at(algorithm: DigestAlgorithm) -> Self {
        let position = DigestAlgorithm::ALL
            .iter()
            .position(|a| *a == algorithm)
            .unwrap_or(0);
        Self {
            rungs: builtin_rungs().into(),
            position,
        }
    }

    /// The standard ladder with `pluggable` as the final rung
    pub fn with_pluggable_top(algorithm: DigestAlgorithm, pluggable: PluggableDigest) -> Self {
        let mut rungs = builtin_rungs();
        rungs.push(Arc::new(pluggable));
        let position = DigestAlgorithm::ALL
            .iter()
            .position(|a| *a == algorithm)
            .unwrap_or(0);
        Self {
            rungs: rungs.into(),
            position,
        }
    }

    /// Engine for the active rung
    pub fn current(&self) -> &dyn DigestEngine {
        self.rungs[self.position].as_ref()
    }

    pub fn algorithm_name(&self) -> &str {
        self.current().name()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    pub fn is_top(&self) -> bool {
        self.position + 1 == self.rungs.len()
    }

    /// Names of every rung, weakest first
    pub fn rung_names(&self) -> Vec<String> {
        self.rungs.iter().map(|r| r.name().to_string()).collect()
    }

    /// The ladder one rung stronger
    pub fn promote(&self) -> CoreResult<Self> {
        if self.is_top() {
            return Err(CoreError::NoStrongerAlgorithm {
                algorithm: self.algorithm_name().to_string(),
            });
        }
        Ok(Self {
            rungs: Arc::clone(&self.rungs),
            position: self.position + 1,
        })
    }
}

fn builtin_rungs() -> Vec<Arc<dyn DigestEngine>> {
    DigestAlgorithm::ALL
        .into_iter()
        .map(|alg| Arc::new(BuiltinDigest::new(alg)) as Arc<dyn DigestEngine>)
        .collect()
}

impl fmt::Debug for EscalationLadder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscalationLadder")
            .field("rungs", &self.rung_names())
            .field("position", &self.position)
            .finish()
    }
}
