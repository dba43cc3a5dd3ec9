/// Receiver of change notifications.
///
/// Observers run synchronously on the thread that mutates the observed value. They receive a
/// shared reference only, so they cannot call back into the owner while it is mid-update.
pub trait Observer<E>: Send {
    /// Called once per emitted event, in subscription order.
    fn notify(&mut self, event: &E);
}

impl<E, F> Observer<E> for F
where
    F: FnMut(&E) + Send,
{
    fn notify(&mut self, event: &E) {
        self(event)
    }
}

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered observer registry.
pub struct Subscribers<E> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn Observer<E>>)>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<E> Subscribers<E> {
    pub fn subscribe(&mut self, observer: impl Observer<E> + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` when the id was unknown (already removed).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, observer) in &mut self.entries {
            observer.notify(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/observe.rs"]
mod tests;
