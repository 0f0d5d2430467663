//! Cancellable deferred work.
//!
//! A session schedules follow-up spawns ("another ripple 150 ms after the
//! click") here instead of handing closures to a global timer. Because the
//! scheduler is owned by the session, dropping or disposing the session
//! cancels everything still pending.

use tracing::trace;

#[derive(Debug)]
struct Entry<T> {
    /// Scheduling order, for ties on `due`.
    seq: u64,
    due: f32,
    payload: T,
}

/// Pending payloads keyed by due time in seconds.
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `payload` to come due at `due` seconds.
    pub fn schedule(&mut self, due: f32, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { seq, due, payload });
    }

    /// Drop everything pending. Returns how many entries were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        if n > 0 {
            trace!(cancelled = n, "deferred spawns cancelled");
        }
        self.entries.clear();
        n
    }

    /// Remove and return every payload due at or before `now`, earliest first.
    ///
    /// Entries with the same due time come out in scheduling order.
    pub fn take_due(&mut self, now: f32) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.payload).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_in_order() {
        let mut s = Scheduler::new();
        s.schedule(0.3, "c");
        s.schedule(0.1, "a");
        s.schedule(0.1, "b");
        s.schedule(1.0, "later");

        assert!(s.take_due(0.05).is_empty());
        assert_eq!(s.take_due(0.5), vec!["a", "b", "c"]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.take_due(1.0), vec!["later"]);
    }

    #[test]
    fn test_cancel_all() {
        let mut s = Scheduler::new();
        s.schedule(0.1, ());
        s.schedule(0.2, ());
        assert_eq!(s.cancel_all(), 2);
        assert!(s.is_empty());
        assert!(s.take_due(10.0).is_empty());
    }
}
