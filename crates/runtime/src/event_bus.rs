use crate::events::ViewerEvent;

/// An event stamped with its position in the input sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub seq: u64,
    pub event: ViewerEvent,
}

/// FIFO of viewer events.
///
/// UI callbacks only `emit`; a single consumer `drain`s and applies events in
/// order, so every state mutation happens on one logical sequence even when
/// events arrive while a previous one is still being handled.
#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: ViewerEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event { seq, event });
        seq
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
