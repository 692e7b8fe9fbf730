use std::time::{Duration, Instant};

/// Default quiet period before a scheduled save fires
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// A single pending write with cancel-and-reschedule semantics
///
/// The event loop calls [`SaveDebouncer::take_due`] on every tick; each new
/// `schedule` pushes the deadline out, so a burst of input produces one write.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedule (or reschedule) the write for `now + delay`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending write, if any
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| now >= deadline)
    }

    /// Returns true once when the deadline has passed, clearing it
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_pending_initially() {
        let mut debouncer = SaveDebouncer::default();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_due(Instant::now()));
    }

    #[test]
    fn test_fires_once_after_quiet_period() {
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(500));
        let start = Instant::now();
        debouncer.schedule(start);

        assert!(!debouncer.take_due(start + Duration::from_millis(499)));
        assert!(debouncer.take_due(start + Duration::from_millis(500)));
        assert!(!debouncer.take_due(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_reschedule_pushes_deadline_out() {
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(500));
        let start = Instant::now();
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(300));

        assert!(!debouncer.is_due(start + Duration::from_millis(600)));
        assert!(debouncer.is_due(start + Duration::from_millis(800)));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(10));
        let start = Instant::now();
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.take_due(start + Duration::from_secs(1)));
    }
}
