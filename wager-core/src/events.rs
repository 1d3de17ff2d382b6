use serde::Serialize;

/// A structured record of one successful mutating call.
pub trait Event: Serialize {
    /// Operation name used by indexers.
    fn name(&self) -> &'static str;
}

/// Append-only log of emitted events. Exactly one entry per successful call.
#[derive(Debug, Clone)]
pub struct EventLog<E> {
    events: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E: Event> EventLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: E) {
        tracing::debug!("Emitting {}", event.name());
        self.events.push(event);
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn last(&self) -> Option<&E> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hands the pending events to an indexer and clears the log.
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }
}
