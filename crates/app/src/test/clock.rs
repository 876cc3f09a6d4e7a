//! Manually advanced clock.

use std::sync::{Mutex, PoisonError};

use jiff::{SignedDuration, Timestamp};

use crate::clock::Clock;

#[derive(Debug)]
pub(crate) struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// 2026-01-01T00:00:00Z
    pub(crate) const START: Timestamp = Timestamp::constant(1_767_225_600, 0);

    pub(crate) fn at(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, by: SignedDuration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);

        *now = now.checked_add(by).expect("clock overflow");
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at(Self::START)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
