//! Process-wide escalation state, owned by a provisioning engine

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::CoreResult;
use crate::ladder::EscalationLadder;

/// The currently active ladder, swapped atomically on promotion
///
/// Injectable rather than global: each engine (or test) owns its own state.
/// The mutex covers read → promote → swap and nothing else; no I/O or
/// content hashing happens while it is held.
#[derive(Debug)]
pub struct EscalationState {
    ladder: Mutex<Arc<EscalationLadder>>,
}

impl EscalationState {
    pub fn new(ladder: EscalationLadder) -> Self {
        Self {
            ladder: Mutex::new(Arc::new(ladder)),
        }
    }

    /// Snapshot of the active ladder
    pub fn current(&self) -> Arc<EscalationLadder> {
        Arc::clone(&self.ladder.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Promote past `observed`, the ladder a collision was detected under
    ///
    /// If another caller already moved the state beyond `observed`, their
    /// ladder is returned unchanged so concurrent collisions on one rung
    /// advance the state exactly once.
    pub fn escalate_from(&self, observed: &EscalationLadder) -> CoreResult<Arc<EscalationLadder>> {
        let mut active = self.ladder.lock().unwrap_or_else(PoisonError::into_inner);
        if active.position() > observed.position() {
            return Ok(Arc::clone(&active));
        }

        let promoted = Arc::new(active.promote()?);
        tracing::warn!(
            from = active.algorithm_name(),
            to = promoted.algorithm_name(),
            position = promoted.position(),
            "digest algorithm escalated"
        );
        *active = Arc::clone(&promoted);
        Ok(promoted)
    }
}

impl Default for EscalationState {
    fn default() -> Self {
        Self::new(EscalationLadder::standard())
    }
}
