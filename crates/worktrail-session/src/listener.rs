//! Listener registry for session observers.

use std::sync::Arc;

use crate::state::{SessionEvent, SessionView};

/// Callback invoked after every session mutation.
///
/// Listeners run synchronously on the mutating thread and must stay cheap.
/// They may read the session but should not block on external work.
pub type Listener = Arc<dyn Fn(&SessionEvent, &SessionView) + Send + Sync>;

/// Handle returned by [`Session::subscribe`](crate::Session::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of listeners.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Listeners in subscription order.
    pub(crate) fn listeners(&self) -> Vec<Listener> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
