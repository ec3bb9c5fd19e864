use tokio::time::{Duration, Instant};

/// Cancellable quiet-period timer.
///
/// Scheduling replaces any deadline that has not fired yet, so only the most
/// recent trigger survives. The owner polls [`Debouncer::wait`] inside its
/// select loop and calls [`Debouncer::take_due`] once the deadline passes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
    generation: u64,
}

impl Debouncer {
    /// Disarmed timer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
            generation: 0,
        }
    }

    /// Arms the timer from `now`, cancelling whatever was pending.
    ///
    /// Returns the generation of the new timer.
    pub fn schedule(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.deadline = Some(now + self.quiet);
        self.generation
    }

    /// Disarms the timer; returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// True while a deadline is armed.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires the timer if its deadline has passed, disarming it.
    pub fn take_due(&mut self, now: Instant) -> Option<u64> {
        match self.deadline {
            Some(at) if at <= now => {
                self.deadline = None;
                Some(self.generation)
            }
            _ => None,
        }
    }

    /// Sleeps until the pending deadline; pends forever when disarmed.
    pub async fn wait(&self) {
        match self.deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reschedule_pushes_deadline_and_fires_once() {
        let start = Instant::now();
        let mut timer = Debouncer::new(Duration::from_millis(300));

        timer.schedule(start);
        let latest = timer.schedule(start + Duration::from_millis(200));

        assert_eq!(timer.take_due(start + Duration::from_millis(300)), None);
        assert_eq!(timer.take_due(start + Duration::from_millis(500)), Some(latest));
        assert_eq!(timer.take_due(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut timer = Debouncer::new(Duration::from_millis(300));
        timer.schedule(start);
        assert!(timer.cancel());
        assert!(!timer.is_pending());
        assert_eq!(timer.take_due(start + Duration::from_secs(1)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_resolves_at_deadline() {
        let mut timer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        timer.schedule(start);
        timer.wait().await;
        assert!(Instant::now() >= start + Duration::from_millis(300));
        assert!(timer.take_due(Instant::now()).is_some());
    }
}
