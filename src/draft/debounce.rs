use std::time::{Duration, Instant};

/// Collapses bursts of changes into one action after a quiet period.
///
/// Time is passed in explicitly: every `touch` pushes the deadline out, and
/// `poll` fires once the deadline has passed, then disarms.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Cancels any pending deadline and schedules a new one `quiet` after `now`.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once per armed deadline, when `now` has reached it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        assert!(!debouncer.poll(start));

        debouncer.touch(start);
        assert!(!debouncer.poll(start + Duration::from_millis(1999)));
        assert!(debouncer.poll(start + Duration::from_secs(2)));
        assert!(!debouncer.poll(start + Duration::from_secs(5)));
    }

    #[test]
    fn touch_reschedules() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(1500));
        assert!(!debouncer.poll(start + Duration::from_millis(2500)));
        assert!(debouncer.poll(start + Duration::from_millis(3500)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.touch(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(start + Duration::from_secs(3)));
    }
}
