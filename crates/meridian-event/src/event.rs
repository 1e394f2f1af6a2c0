use std::fmt;

use crate::clock::SimTime;
use crate::target::TargetId;

/// Identifier of a scheduled event. Increases with scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A timed event addressed to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Scheduling-order identifier; breaks ties between equal times.
    pub id: EventId,
    /// When the event fires.
    pub time: SimTime,
    /// The receiving target.
    pub target: TargetId,
    /// What the target should do, e.g. `"update"`.
    pub kind: String,
    /// Optional argument interpreted by the target.
    pub payload: Option<String>,
}

impl Event {
    /// Create an event.
    pub fn new(
        id: EventId,
        time: SimTime,
        target: TargetId,
        kind: impl Into<String>,
        payload: Option<String>,
    ) -> Self {
        Self {
            id,
            time,
            target,
            kind: kind.into(),
            payload,
        }
    }
}

/// Records dispatched events, oldest first.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Return all recorded events addressed to `target`.
    pub fn events_for(&self, target: TargetId) -> Vec<&Event> {
        self.events.iter().filter(|e| e.target == target).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u64, time: u64, target: u64) -> Event {
        Event::new(EventId(id), SimTime(time), TargetId(target), "update", None)
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        log.push(event(0, 1, 7));
        log.push(event(1, 1, 8));
        log.push(event(2, 2, 7));
        assert_eq!(log.len(), 3);
        assert_eq!(log.events_for(TargetId(7)).len(), 2);
        assert!(log.events_for(TargetId(9)).is_empty());
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        for i in 0..5 {
            log.push(event(i, i, 1));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].time, SimTime(3));
        assert_eq!(log.events()[1].time, SimTime(4));
    }
}
