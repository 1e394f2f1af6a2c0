use crate::clock::SimTime;
use crate::target::TargetId;

/// An event requested during dispatch, queued once the handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingEvent {
    pub time: SimTime,
    pub target: TargetId,
    pub kind: String,
    pub payload: Option<String>,
}

/// Scheduling handle passed to a target while it handles an event.
pub struct EventContext<'a> {
    now: SimTime,
    target: TargetId,
    pending: &'a mut Vec<PendingEvent>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(now: SimTime, target: TargetId, pending: &'a mut Vec<PendingEvent>) -> Self {
        Self {
            now,
            target,
            pending,
        }
    }

    /// The time of the event being handled.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The id under which the handling target is registered.
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Schedule an event for the handling target `delay` units from now.
    pub fn schedule_in(&mut self, delay: u64, kind: impl Into<String>, payload: Option<String>) {
        let target = self.target;
        self.schedule_at(self.now + delay, target, kind, payload);
    }

    /// Schedule an event for any target. Times in the past fire at `now`.
    pub fn schedule_at(
        &mut self,
        time: SimTime,
        target: TargetId,
        kind: impl Into<String>,
        payload: Option<String>,
    ) {
        self.pending.push(PendingEvent {
            time: time.max(self.now),
            target,
            kind: kind.into(),
            payload,
        });
    }
}
