use crate::tick::Tick;

/// Trace record of something the host observed while handling an event.
///
/// Structured text keyed by a static kind so tests and tools can assert on the
/// order of what happened without depending on log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub tick: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, tick: Tick, kind: &'static str, message: impl Into<String>) {
        self.events.push(Event {
            tick: tick.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of(&self, kind: &str) -> impl Iterator<Item = &Event> + '_ {
        let kind = kind.to_string();
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
