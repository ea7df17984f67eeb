//! Cooperative timer queue.
//!
//! The single-threaded replacement for host `setTimeout`/`setInterval`: the
//! owner drives [`TimerQueue::advance`] as host time passes and receives due
//! payloads back in deadline order. Cancellation is synchronous; a cleared
//! timer can never fire afterwards.

/// Handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct TimerEntry<T> {
    id: TimerId,
    deadline: f64,
    period: Option<f64>,
    payload: T,
}

#[derive(Debug)]
pub(crate) struct TimerQueue<T> {
    now: f64,
    next_id: u64,
    entries: Vec<TimerEntry<T>>,
}

impl<T: Copy> TimerQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Current host time in seconds, as of the last `advance`.
    pub(crate) fn now(&self) -> f64 {
        self.now
    }

    /// Schedule a one-shot timer `delay` seconds from now.
    pub(crate) fn set_timeout(&mut self, delay: f64, payload: T) -> TimerId {
        self.push(delay.max(0.0), None, payload)
    }

    /// Schedule a repeating timer with the given period in seconds.
    pub(crate) fn set_interval(&mut self, period: f64, payload: T) -> TimerId {
        let period = period.max(f64::EPSILON);
        self.push(period, Some(period), payload)
    }

    fn push(&mut self, delay: f64, period: Option<f64>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimerEntry {
            id,
            deadline: self.now + delay,
            period,
            payload,
        });
        id
    }

    /// Synchronously cancel a timer. A no-op for unknown or already-fired ids.
    pub(crate) fn clear(&mut self, id: TimerId) {
        self.entries.retain(|e| e.id != id);
    }

    /// Advance host time to `to`, appending `(id, payload)` for every timer
    /// due on the way, in deadline order (insertion order breaks ties).
    /// Intervals re-arm themselves; one-shots are consumed. Time never moves
    /// backwards.
    pub(crate) fn advance(&mut self, to: f64, fired: &mut Vec<(TimerId, T)>) {
        let to = to.max(self.now);
        loop {
            let mut due: Option<usize> = None;
            for (i, e) in self.entries.iter().enumerate() {
                if e.deadline > to {
                    continue;
                }
                match due {
                    Some(j) if self.entries[j].deadline <= e.deadline => {}
                    _ => due = Some(i),
                }
            }
            let Some(i) = due else {
                break;
            };

            self.now = self.entries[i].deadline.max(self.now);
            let entry = &mut self.entries[i];
            fired.push((entry.id, entry.payload));
            match entry.period {
                Some(period) => entry.deadline += period,
                None => {
                    self.entries.swap_remove(i);
                }
            }
        }
        self.now = to;
    }
}
