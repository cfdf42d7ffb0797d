//! Delta-time countdowns.
//!
//! Cooldowns, stuns, animations and ability windows are all measured in
//! accumulated frame delta, never wall-clock time.

use serde::{Serialize, Deserialize};

/// Slack absorbed when comparing accumulated `f32` deltas against a duration.
const COMPLETION_EPSILON: f32 = 1e-4;

/// Timer lasting a fixed amount of in-game time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeltaTimer {
    duration: f32,
    elapsed: f32,
}

impl DeltaTimer {
    /// Create a timer with the given duration in seconds.
    pub const fn new(duration: f32) -> Self {
        Self { duration, elapsed: 0.0 }
    }

    /// Advance the timer. Returns true if it is now complete.
    pub fn update(&mut self, delta: f32) -> bool {
        self.elapsed += delta;
        self.is_complete()
    }

    /// Whether the full duration has elapsed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.elapsed + COMPLETION_EPSILON >= self.duration
    }

    /// Seconds left until completion (0 once complete).
    pub fn remaining(&self) -> f32 {
        if self.is_complete() {
            0.0
        } else {
            self.duration - self.elapsed
        }
    }

    /// Seconds accumulated so far.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Total duration.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Advance an optional timer, clearing it once it completes.
///
/// Returns true while the timer is still running after this update.
pub fn tick_optional(timer: &mut Option<DeltaTimer>, delta: f32) -> bool {
    match timer {
        Some(t) => {
            if t.update(delta) {
                *timer = None;
                false
            } else {
                true
            }
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_completes_after_duration() {
        let mut t = DeltaTimer::new(1.0);
        assert!(!t.update(0.4));
        assert!(!t.is_complete());
        assert!(t.update(0.6));
        assert_eq!(t.remaining(), 0.0);
    }

    #[test]
    fn test_timer_tolerates_summed_frame_deltas() {
        // 0.9 + 2.1 in f32 lands just below 3.0
        let mut t = DeltaTimer::new(3.0);
        t.update(0.9);
        assert!(t.update(2.1));
    }

    #[test]
    fn test_timer_reset() {
        let mut t = DeltaTimer::new(0.5);
        t.update(0.5);
        assert!(t.is_complete());
        t.reset();
        assert!(!t.is_complete());
        assert!((t.remaining() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tick_optional_clears_on_completion() {
        let mut timer = Some(DeltaTimer::new(1.0));
        assert!(tick_optional(&mut timer, 0.5));
        assert!(timer.is_some());
        assert!(!tick_optional(&mut timer, 0.5));
        assert!(timer.is_none());
        assert!(!tick_optional(&mut timer, 0.5));
    }
}
