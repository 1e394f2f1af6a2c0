//! Discrete-event simulation loop for Meridian.
//!
//! An [`EventLoop`] owns simulation time and a queue of timed events. Targets
//! register themselves as weak references and receive every event addressed
//! to them, in `(time, insertion order)`. The loop never owns its targets:
//! when a target is dropped its pending events are discarded.

/// Monotonic simulation clock.
pub mod clock;
/// Configuration for the event loop.
pub mod config;
/// Scheduling handle passed to targets during dispatch.
pub mod context;
/// Error types for the event crate.
pub mod error;
/// Event records and the dispatch log.
pub mod event;
/// The scheduler itself.
pub mod event_loop;
/// The trait that all event targets implement.
pub mod target;

/// Re-exports of [`clock::LoopClock`] and [`clock::SimTime`].
pub use clock::{LoopClock, SimTime};
/// Re-export of [`config::LoopConfig`].
pub use config::LoopConfig;
/// Re-export of [`context::EventContext`].
pub use context::EventContext;
/// Re-exports of [`error::EventError`] and [`error::EventResult`].
pub use error::{EventError, EventResult};
/// Re-exports of [`event::Event`], [`event::EventId`] and [`event::EventLog`].
pub use event::{Event, EventId, EventLog};
/// Re-exports of [`event_loop::EventLoop`] and [`event_loop::SharedEventLoop`].
pub use event_loop::{EventLoop, SharedEventLoop};
/// Re-exports of [`target::EventTarget`] and [`target::TargetId`].
pub use target::{EventTarget, TargetId};
