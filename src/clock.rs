//! Countdown clock: maps wall-clock time against a fixed start and target to a
//! remaining duration and a completion fraction.
//!
//! All instants are milliseconds since the Unix epoch as `f64`, the unit the
//! browser hands out (`Date.now()`), so the clock can be driven identically from
//! the host loop and from tests.

use crate::error::CountdownError;

/// Derived view of a [`CountdownTimer`] at one instant. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub remaining_ms: f64,
    /// Fraction of the total duration elapsed, clamped to `[0, 1]`.
    pub percent_complete: f64,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownTimer {
    target_ms: f64,
    start_ms: f64,
    // Fixed at construction; resume() moves the target, never this.
    total_duration_ms: f64,
    paused_at: Option<f64>,
}

impl CountdownTimer {
    /// Start a countdown towards `target_ms`. Past targets are accepted and simply
    /// report complete on the first sample.
    pub fn start(target_ms: f64, start_ms: f64) -> Result<Self, CountdownError> {
        if !target_ms.is_finite() {
            return Err(CountdownError::InvalidTarget(target_ms.to_string()));
        }
        if !start_ms.is_finite() {
            return Err(CountdownError::InvalidTarget(start_ms.to_string()));
        }
        Ok(Self {
            target_ms,
            start_ms,
            total_duration_ms: target_ms - start_ms,
            paused_at: None,
        })
    }

    pub fn pause(&mut self, now_ms: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now_ms);
        }
    }

    /// Shift the target forward by the paused interval so the remaining time is
    /// exactly what it was when `pause` was called.
    pub fn resume(&mut self, now_ms: f64) {
        if let Some(paused_at) = self.paused_at.take() {
            self.target_ms += now_ms - paused_at;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn target_ms(&self) -> f64 {
        self.target_ms
    }

    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.total_duration_ms
    }

    /// Pure function of the timer state and `now_ms`. While paused the clock is
    /// read at the pause instant, so progress is frozen.
    pub fn sample(&self, now_ms: f64) -> ProgressSample {
        let effective_now = self.paused_at.unwrap_or(now_ms);
        let remaining_ms = (self.target_ms - effective_now).max(0.0);
        let percent_complete = if self.total_duration_ms <= 0.0 {
            1.0
        } else {
            ((effective_now - self.start_ms) / self.total_duration_ms).clamp(0.0, 1.0)
        };
        ProgressSample {
            remaining_ms,
            percent_complete,
            is_complete: !self.is_paused() && now_ms >= self.target_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sample_at_start_and_target() {
        let t = CountdownTimer::start(11_000.0, 1_000.0).unwrap();
        let s = t.sample(1_000.0);
        assert!(approx(s.percent_complete, 0.0));
        assert!(!s.is_complete);
        assert!(approx(s.remaining_ms, 10_000.0));

        let s = t.sample(11_000.0);
        assert!(approx(s.percent_complete, 1.0));
        assert!(s.is_complete);
        assert!(approx(s.remaining_ms, 0.0));
    }

    #[test]
    fn percent_is_clamped_outside_the_window() {
        let t = CountdownTimer::start(2_000.0, 1_000.0).unwrap();
        assert!(approx(t.sample(0.0).percent_complete, 0.0));
        assert!(approx(t.sample(50_000.0).percent_complete, 1.0));
    }

    #[test]
    fn zero_or_negative_duration_is_immediately_complete() {
        let t = CountdownTimer::start(1_000.0, 1_000.0).unwrap();
        assert!(approx(t.sample(1_000.0).percent_complete, 1.0));
        let past = CountdownTimer::start(500.0, 1_000.0).unwrap();
        let s = past.sample(1_000.0);
        assert!(approx(s.percent_complete, 1.0));
        assert!(s.is_complete);
        assert!(!s.percent_complete.is_nan());
    }

    #[test]
    fn non_finite_target_is_rejected() {
        assert!(matches!(
            CountdownTimer::start(f64::NAN, 0.0),
            Err(CountdownError::InvalidTarget(_))
        ));
        assert!(CountdownTimer::start(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn pause_resume_preserves_remaining() {
        let mut t = CountdownTimer::start(10_000.0, 0.0).unwrap();
        let before = t.sample(3_000.0).remaining_ms;
        t.pause(3_000.0);
        // Long real-world pause.
        let during = t.sample(500_000.0);
        assert!(approx(during.remaining_ms, before));
        assert!(!during.is_complete);
        t.resume(500_000.0);
        assert!(approx(t.sample(500_000.0).remaining_ms, before));
        assert!(approx(t.total_duration_ms(), 10_000.0));
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut t = CountdownTimer::start(10_000.0, 0.0).unwrap();
        t.pause(2_000.0);
        t.pause(4_000.0);
        assert!(t.is_paused());
        t.resume(6_000.0);
        t.resume(9_000.0);
        assert!(!t.is_paused());
        assert!(approx(t.target_ms(), 14_000.0));
    }

    #[test]
    fn paused_timer_is_never_complete() {
        let mut t = CountdownTimer::start(1_000.0, 0.0).unwrap();
        t.pause(500.0);
        assert!(!t.sample(5_000.0).is_complete);
    }
}
