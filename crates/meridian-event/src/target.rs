use std::fmt;

use crate::context::EventContext;
use crate::error::EventResult;
use crate::event::Event;

/// Identifier of a registered target, unique per event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that receives timed events from the loop.
///
/// Targets are registered as weak references. Follow-up events are
/// scheduled through the [`EventContext`], never by borrowing the loop.
pub trait EventTarget {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Called when an event addressed to this target fires.
    fn handle_event(&mut self, event: &Event, ctx: &mut EventContext<'_>) -> EventResult<()>;
}
