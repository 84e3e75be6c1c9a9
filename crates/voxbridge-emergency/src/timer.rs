//! Single-threaded deferred callback queue.
//!
//! Time is virtual: the queue only moves forward when the owner drains it.
//! Entries come out in deadline order, ties in registration order. A cancelled
//! entry is removed immediately and can never be returned.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use voxbridge_core::error::{Result, VoxbridgeError};

/// Handle to a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deadline-ordered queue of one-shot events.
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_seq: u64,
    /// Keyed by `(deadline, registration sequence)`.
    pending: BTreeMap<(Duration, u64), E>,
    deadlines: HashMap<u64, Duration>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `event` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, event: E) -> Result<TimerId> {
        let deadline = self.now.checked_add(delay).ok_or_else(|| {
            VoxbridgeError::Timer(format!(
                "deadline overflow scheduling {:?} after {:?}",
                delay, self.now
            ))
        })?;
        let seq = self.next_seq;
        self.next_seq = self
            .next_seq
            .checked_add(1)
            .ok_or_else(|| VoxbridgeError::Timer("timer ids exhausted".to_string()))?;
        self.pending.insert((deadline, seq), event);
        self.deadlines.insert(seq, deadline);
        Ok(TimerId(seq))
    }

    /// Cancel a pending entry. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(deadline) => self.pending.remove(&(deadline, id.0)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id.0)
    }

    /// Deadline of the earliest pending entry.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Time left until the earliest pending entry is due.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now))
    }

    /// Remove and return the earliest entry due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, E)> {
        let (deadline, _) = *self.pending.keys().next()?;
        if deadline > until {
            return None;
        }
        let ((deadline, seq), event) = self.pending.pop_first()?;
        self.deadlines.remove(&seq);
        self.now = self.now.max(deadline);
        Some((TimerId(seq), event))
    }

    /// Move the clock forward to `until` without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut TimerQueue<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some((_, event)) = queue.pop_due(until) {
            fired.push(event);
        }
        queue.advance_to(until);
        fired
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_secs(3), "c").unwrap();
        queue.schedule(Duration::from_secs(1), "a").unwrap();
        queue.schedule(Duration::from_secs(2), "b").unwrap();

        assert_eq!(drain(&mut queue, Duration::from_secs(10)), vec!["a", "b", "c"]);
        assert!(queue.is_empty());
        assert_eq!(queue.now(), Duration::from_secs(10));
    }

    #[test]
    fn test_ties_break_in_registration_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_secs(1), "first").unwrap();
        queue.schedule(Duration::from_secs(1), "second").unwrap();
        queue.schedule(Duration::from_secs(1), "third").unwrap();

        assert_eq!(
            drain(&mut queue, Duration::from_secs(1)),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_not_due_entries_stay() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(1500), "later").unwrap();

        assert!(drain(&mut queue, Duration::from_secs(1)).is_empty());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.time_until_next(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut queue = TimerQueue::new();
        let keep = queue.schedule(Duration::from_secs(1), "keep").unwrap();
        let drop = queue.schedule(Duration::from_secs(1), "drop").unwrap();

        assert!(queue.cancel(drop));
        assert!(!queue.cancel(drop));
        assert!(queue.is_pending(keep));
        assert!(!queue.is_pending(drop));
        assert_eq!(drain(&mut queue, Duration::from_secs(1)), vec!["keep"]);
        assert!(!queue.cancel(keep));
    }

    #[test]
    fn test_pop_moves_clock_to_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_secs(2), "x").unwrap();
        let (_, event) = queue.pop_due(Duration::from_secs(5)).unwrap();
        assert_eq!(event, "x");
        assert_eq!(queue.now(), Duration::from_secs(2));

        // Relative delays are measured from the new clock.
        queue.schedule(Duration::from_secs(1), "y").unwrap();
        assert_eq!(queue.next_deadline(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut queue: TimerQueue<()> = TimerQueue::new();
        queue.advance_to(Duration::from_secs(5));
        queue.advance_to(Duration::from_secs(2));
        assert_eq!(queue.now(), Duration::from_secs(5));
    }

    #[test]
    fn test_schedule_overflow_is_timer_error() {
        let mut queue = TimerQueue::new();
        queue.advance_to(Duration::MAX);
        let err = queue.schedule(Duration::from_secs(1), "never").unwrap_err();
        assert!(matches!(err, VoxbridgeError::Timer(_)));
        assert!(queue.is_empty());
    }
}
