//! One-shot deferred actions on a virtual timeline.
//!
//! Time only moves when the owner calls [`Scheduler::advance`], so callers can
//! drive it from wall-clock ticks while tests step it deterministically.
//! Scheduled actions cannot be cancelled.

use std::time::Duration;

pub const ROW_REMOVAL_DELAY: Duration = Duration::from_millis(300);
pub const NOTICE_DISMISS_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug)]
struct Scheduled<A> {
    due: Duration,
    seq: u64,
    action: A,
}

#[derive(Debug)]
pub struct Scheduler<A> {
    elapsed: Duration,
    next_seq: u64,
    queue: Vec<Scheduled<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            next_seq: 0,
            queue: Vec::new(),
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due: self.elapsed + delay,
            seq,
            action,
        });
    }

    /// Moves time forward and returns every action that came due, earliest
    /// first; actions due at the same instant keep scheduling order.
    pub fn advance(&mut self, by: Duration) -> Vec<A> {
        self.elapsed += by;
        let now = self.elapsed;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|entry| entry.due <= now);
        self.queue = pending;

        due.sort_by_key(|entry| (entry.due, entry.seq));
        due.into_iter().map(|entry| entry.action).collect()
    }

    /// Advances exactly far enough for everything outstanding to come due.
    pub fn settle(&mut self) -> Vec<A> {
        let remaining = self
            .queue
            .iter()
            .map(|entry| entry.due.saturating_sub(self.elapsed))
            .max()
            .unwrap_or(Duration::ZERO);
        self.advance(remaining)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::Scheduler;
    use std::time::Duration;

    #[test]
    fn fires_only_once_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(300), "remove");

        assert!(scheduler.advance(Duration::from_millis(299)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), vec!["remove"]);
        assert!(scheduler.advance(Duration::from_secs(10)).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn orders_by_due_time_then_insertion() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(3000), "dismiss");
        scheduler.schedule(Duration::from_millis(300), "first");
        scheduler.schedule(Duration::from_millis(300), "second");

        let fired = scheduler.advance(Duration::from_secs(5));
        assert_eq!(fired, vec!["first", "second", "dismiss"]);
    }

    #[test]
    fn delays_are_relative_to_schedule_time() {
        let mut scheduler = Scheduler::new();
        scheduler.advance(Duration::from_millis(1000));
        scheduler.schedule(Duration::from_millis(300), 1);

        assert!(scheduler.advance(Duration::from_millis(200)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(100)), vec![1]);
    }

    #[test]
    fn settle_runs_everything_outstanding() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(300), 'a');
        scheduler.schedule(Duration::from_millis(3000), 'b');

        assert_eq!(scheduler.settle(), vec!['a', 'b']);
        assert_eq!(scheduler.elapsed(), Duration::from_millis(3000));
        assert!(scheduler.settle().is_empty());
    }
}
