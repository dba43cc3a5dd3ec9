/// Deferred work owned by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// Enable the incoming instance and start its reveal.
    StartReveal,
    /// Finish a transition: release the old instance and promote `next`.
    Promote,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scheduled {
    pub id: TimerId,
    /// Director clock seconds.
    pub due: f64,
    /// Transition generation the entry was scheduled under.
    pub generation: u64,
    pub task: Continuation,
}

/// Cancellable one-shot timers driven by an explicit clock.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn schedule(&mut self, due: f64, generation: u64, task: Continuation) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due,
            generation,
            task,
        });
        id
    }

    /// Drop every entry of `generation`; returns how many were removed.
    pub fn cancel_generation(&mut self, generation: u64) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.generation != generation);
        before - self.pending.len()
    }

    /// Remove and return entries due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: f64) -> Vec<Scheduled> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = rest;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest pending entry.
    pub fn next_due(&self) -> Option<f64> {
        self.pending.iter().map(|s| s.due).min_by(f64::total_cmp)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/orchestrator/scheduler.rs"]
mod tests;
