use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

/// Wall clock that never runs backwards within one process
///
/// Consecutive readings are strictly increasing (by at least one
/// microsecond), so newest-first listings have a stable order.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Microsecond precision to match stored text
    pub fn now(&self) -> DateTime<Utc> {
        let now = truncate_micros(Utc::now());
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let stamp = match *last {
            Some(prev) if prev >= now => prev + TimeDelta::microseconds(1),
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}

fn truncate_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    use chrono::SubsecRound;
    ts.trunc_subsecs(6)
}
