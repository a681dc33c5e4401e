//! Host clock adapter.
//!
//! - monotonic time from `std::time::Instant`, measured from construction
//! - wall-clock time from `std::time::SystemTime`

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::TimePort;

pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimePort for SystemClock {
    fn monotonic_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// A clock set before 1970 reads as zero.
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
