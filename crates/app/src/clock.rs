//! Wall clock

use std::fmt::Debug;

use jiff::Timestamp;

/// Source of the current time. Everything that stamps or compares times goes
/// through this so tests can move time deliberately.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
