use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use std::rc::{Rc, Weak};

use crate::clock::{LoopClock, SimTime};
use crate::config::LoopConfig;
use crate::context::EventContext;
use crate::error::{EventError, EventResult};
use crate::event::{Event, EventId, EventLog};
use crate::target::{EventTarget, TargetId};

/// An event loop shared between its driver and the sessions bound to it.
pub type SharedEventLoop = Rc<RefCell<EventLoop>>;

/// Queue entry ordered by `(time, id)`.
#[derive(Debug)]
struct Scheduled(Event);

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.time, self.0.id).cmp(&(other.0.time, other.0.id))
    }
}

struct Registration {
    name: String,
    target: Weak<RefCell<dyn EventTarget>>,
}

/// Discrete-event scheduler.
///
/// Owns simulation time, the pending-event queue and a log of dispatched
/// events. Holds only weak references to its targets.
pub struct EventLoop {
    config: LoopConfig,
    clock: LoopClock,
    queue: BinaryHeap<Reverse<Scheduled>>,
    targets: BTreeMap<TargetId, Registration>,
    next_event: u64,
    next_target: u64,
    log: EventLog,
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("now", &self.clock.now())
            .field("pending", &self.queue.len())
            .field("targets", &self.targets.len())
            .field("logged", &self.log.len())
            .finish()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(LoopConfig::default())
    }
}

impl EventLoop {
    /// Create an event loop at time zero.
    pub fn new(config: LoopConfig) -> Self {
        let log = EventLog::new(config.max_log);
        Self {
            config,
            clock: LoopClock::new(),
            queue: BinaryHeap::new(),
            targets: BTreeMap::new(),
            next_event: 0,
            next_target: 0,
            log,
        }
    }

    /// Create an event loop wrapped for sharing.
    pub fn shared(config: LoopConfig) -> SharedEventLoop {
        Rc::new(RefCell::new(Self::new(config)))
    }

    // -----------------------------------------------------------------------
    // Targets
    // -----------------------------------------------------------------------

    /// Register a target. The loop keeps only a weak reference.
    pub fn register<T: EventTarget + 'static>(&mut self, target: &Rc<RefCell<T>>) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target += 1;

        let name = target.borrow().name().to_string();
        let weak: Weak<RefCell<T>> = Rc::downgrade(target);
        let weak: Weak<RefCell<dyn EventTarget>> = weak;
        tracing::debug!(target_id = %id, name = %name, "registered event target");
        self.targets.insert(id, Registration { name, target: weak });
        id
    }

    /// Remove a target and cancel its pending events. Returns how many were cancelled.
    pub fn unregister(&mut self, id: TargetId) -> usize {
        let Some(registration) = self.targets.remove(&id) else {
            return 0;
        };
        let cancelled = self.cancel_pending(id);
        tracing::debug!(
            target_id = %id,
            name = %registration.name,
            cancelled,
            "unregistered event target"
        );
        cancelled
    }

    /// Whether `id` is currently registered.
    pub fn is_registered(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    /// Number of registered targets, including ones whose owner has been dropped
    /// but that have not yet been pruned.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    fn cancel_pending(&mut self, id: TargetId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|Reverse(s)| s.0.target != id);
        before - self.queue.len()
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Schedule an event. Times in the past fire at the current time.
    pub fn schedule(
        &mut self,
        time: SimTime,
        target: TargetId,
        kind: impl Into<String>,
        payload: Option<String>,
    ) -> EventId {
        let id = EventId(self.next_event);
        self.next_event += 1;
        let time = time.max(self.clock.now());
        self.queue
            .push(Reverse(Scheduled(Event::new(id, time, target, kind, payload))));
        id
    }

    /// Number of events waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of pending events addressed to `target`.
    pub fn pending_for(&self, target: TargetId) -> usize {
        self.queue
            .iter()
            .filter(|Reverse(s)| s.0.target == target)
            .count()
    }

    /// Time of the next pending event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|Reverse(s)| s.0.time)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Dispatch every event due at or before `until`, then move the clock to `until`.
    ///
    /// Returns the number of events handed to live targets. Stops at the first
    /// handler error; the clock then stays at the failing event's time.
    pub fn reach(&mut self, until: SimTime) -> EventResult<usize> {
        let mut handled = 0;
        let mut popped = 0;
        while self.next_time().is_some_and(|t| t <= until) {
            if self.config.max_dispatch > 0 && popped >= self.config.max_dispatch {
                return Err(EventError::DispatchLimit {
                    limit: self.config.max_dispatch,
                    time: self.clock.now(),
                });
            }
            popped += 1;
            if self.step()? {
                handled += 1;
            }
        }
        self.clock.advance_to(until);
        Ok(handled)
    }

    /// Dispatch the next pending event, if any.
    ///
    /// Returns `true` if a live target handled it. Events for unregistered or
    /// dropped targets are discarded.
    pub fn step(&mut self) -> EventResult<bool> {
        let Some(Reverse(Scheduled(event))) = self.queue.pop() else {
            return Ok(false);
        };
        self.clock.advance_to(event.time);

        let Some(registration) = self.targets.get(&event.target) else {
            tracing::debug!(event = %event.id, target_id = %event.target, "dropping event for unregistered target");
            return Ok(false);
        };
        let Some(target) = registration.target.upgrade() else {
            tracing::warn!(
                target_id = %event.target,
                name = %registration.name,
                "event target was dropped without unregistering; pruning"
            );
            self.targets.remove(&event.target);
            self.cancel_pending(event.target);
            return Ok(false);
        };

        let mut pending = Vec::new();
        let result = {
            let mut target = target
                .try_borrow_mut()
                .map_err(|_| EventError::TargetBusy(event.target))?;
            let mut ctx = EventContext::new(event.time, event.target, &mut pending);
            target.handle_event(&event, &mut ctx)
        };

        for p in pending {
            self.schedule(p.time, p.target, p.kind, p.payload);
        }

        self.clock.count_dispatch();
        tracing::trace!(event = %event.id, kind = %event.kind, time = %event.time, "dispatched");
        if let Err(e) = &result {
            tracing::warn!(event = %event.id, kind = %event.kind, error = %e, "handler failed");
        }
        self.log.push(event);
        result.map(|()| true)
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// The current simulation time.
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// The loop's clock.
    pub fn clock(&self) -> &LoopClock {
        &self.clock
    }

    /// Recently dispatched events.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// The loop's configuration.
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }
}
