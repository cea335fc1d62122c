//! One-shot timers driven by the owner's clock.
//!
//! A [`Timer`] is only a deadline. Whoever owns it decides when to check it
//! (a test with hand-made instants, or the session task sleeping until
//! [`Timer::deadline`]). Rescheduling replaces the previous deadline, which
//! is how the text-input debounce restarts on every keystroke.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return true if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of several optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fires_once_after_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, 500 * MS);

        assert!(!timer.fire_if_due(t0 + 499 * MS));
        assert!(timer.fire_if_due(t0 + 500 * MS));
        assert!(!timer.fire_if_due(t0 + 600 * MS));
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn test_reschedule_pushes_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, 500 * MS);
        timer.schedule(t0 + 300 * MS, 500 * MS);

        assert!(!timer.fire_if_due(t0 + 600 * MS));
        assert!(timer.fire_if_due(t0 + 800 * MS));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, MS);
        timer.cancel();
        assert!(!timer.fire_if_due(t0 + 10 * MS));
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn test_earliest() {
        let t0 = Instant::now();
        assert_eq!(earliest([None, Some(t0 + MS), Some(t0)]), Some(t0));
        assert_eq!(earliest([None, None]), None);
    }
}
