//! Listener registry.
//!
//! Listeners are kept per [`EventKind`] in subscription order and invoked
//! synchronously. A listener that fails or panics is logged and skipped; the
//! remaining listeners still run and the caller never observes the failure.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::events::{Event, EventKind};

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

pub type Listener = Box<dyn FnMut(&Event) -> Result<(), ListenerError>>;

/// Handle returned by [`Notifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
pub struct Notifier {
    next_id: u64,
    listeners: BTreeMap<EventKind, Vec<(SubscriptionId, Listener)>>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self
            .listeners
            .iter()
            .map(|(kind, list)| (kind.name(), list.len()))
            .collect();
        f.debug_struct("Notifier").field("listeners", &counts).finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> Result<(), ListenerError> + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver `event` to every listener of its kind.
    pub fn emit(&mut self, event: &Event) {
        let kind = event.kind();
        let Some(list) = self.listeners.get_mut(&kind) else {
            return;
        };
        for (id, listener) in list.iter_mut() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(event = %kind, subscription = %id, error = %e, "listener failed");
                }
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic payload".to_string());
                    tracing::error!(event = %kind, subscription = %id, panic = %message, "listener panicked");
                }
            }
        }
    }
}
