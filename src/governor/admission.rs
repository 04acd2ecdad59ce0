//! Per-type admission limiting (spec.md §4.6).

use crate::core::DEFAULT_ADMISSION_PER_SECOND;

/// A fixed-window rate limiter over a caller-supplied millisecond clock.
///
/// Deliberately takes `now_ms` as a parameter instead of reading a wall
/// clock: per spec.md §5 the core advances time only via scheduler
/// callbacks, so the FSM is expected to maintain its own millisecond
/// counter (the same one that gives the STARTING delay its "100 ms worth
/// of history" before the limiter can be reset by a power cycle).
#[derive(Debug, Clone)]
pub struct AdmissionLimiter {
    max_per_second: u32,
    window_start_ms: u64,
    count_in_window: u32,
}

impl AdmissionLimiter {
    /// Build a limiter admitting up to `max_per_second` messages.
    pub fn new(max_per_second: u32) -> Self {
        Self {
            max_per_second,
            window_start_ms: 0,
            count_in_window: 0,
        }
    }

    /// The suggested default for human-initiated message types.
    pub fn default_for_human_initiated() -> Self {
        Self::new(DEFAULT_ADMISSION_PER_SECOND)
    }

    /// Ask whether a message may be admitted at `now_ms`, consuming one
    /// slot from the current window if so.
    pub fn try_admit(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.window_start_ms) >= 1000 {
            self.window_start_ms = now_ms;
            self.count_in_window = 0;
        }
        if self.count_in_window < self.max_per_second {
            self.count_in_window += 1;
            true
        } else {
            false
        }
    }
}
