//! Deferred-flush watcher registry.
//!
//! Watchers are registered with a payload and re-run by the owner whenever
//! they are invalidated; invalidations accumulate into a pending queue that
//! the owner drains once per flush batch ("after the current update batch"
//! semantics). The registry is owned by its runtime, never process-wide, so
//! concurrent presentations cannot cross-contaminate.

/// Handle to a registered watcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatcherId(u32);

/// Watcher registry with deferred flush and atomic teardown.
#[derive(Debug)]
pub struct Reactivity<P> {
    entries: Vec<Option<P>>,
    pending: Vec<WatcherId>,
}

impl<P> Reactivity<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Number of live watchers.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Whether no watchers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a watcher. Its first run is deferred to the next flush.
    pub fn watch(&mut self, payload: P) -> WatcherId {
        let id = WatcherId(self.entries.len() as u32);
        self.entries.push(Some(payload));
        self.pending.push(id);
        id
    }

    /// Remove one watcher; any queued invalidation for it is dropped.
    pub fn remove(&mut self, id: WatcherId) {
        if let Some(entry) = self.entries.get_mut(id.0 as usize) {
            *entry = None;
        }
        self.pending.retain(|p| *p != id);
    }

    /// Queue one watcher for the next flush.
    pub fn invalidate(&mut self, id: WatcherId) {
        if self
            .entries
            .get(id.0 as usize)
            .is_some_and(Option::is_some)
            && !self.pending.contains(&id)
        {
            self.pending.push(id);
        }
    }

    /// Queue every live watcher for the next flush, in registration order.
    pub fn invalidate_all(&mut self) {
        self.pending.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.is_some() {
                self.pending.push(WatcherId(i as u32));
            }
        }
    }

    /// Drain the pending queue for one flush batch.
    pub fn take_pending(&mut self) -> Vec<WatcherId> {
        std::mem::take(&mut self.pending)
    }

    /// Mutable access to a watcher's payload.
    pub fn payload_mut(&mut self, id: WatcherId) -> Option<&mut P> {
        self.entries.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Tear down every registered watcher atomically.
    ///
    /// Idempotent; safe to call with zero watchers.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.pending.clear();
    }
}

impl<P> Default for Reactivity<P> {
    fn default() -> Self {
        Self::new()
    }
}
