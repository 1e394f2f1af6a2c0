use crate::clock::SimTime;
use crate::target::TargetId;

/// Alias for `Result<T, EventError>`.
pub type EventResult<T> = Result<T, EventError>;

/// Errors raised while dispatching events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A target failed to handle an event.
    #[error("target {target} failed on '{kind}' at {time}: {message}")]
    Handler {
        /// The target that failed.
        target: TargetId,
        /// The kind of the event being handled.
        kind: String,
        /// When the event fired.
        time: SimTime,
        /// Description of the failure.
        message: String,
    },

    /// A target was already borrowed when its event fired.
    #[error("target {0} is busy and cannot receive events")]
    TargetBusy(TargetId),

    /// A single `reach` dispatched more events than allowed.
    #[error("dispatch limit of {limit} events exceeded at {time}")]
    DispatchLimit {
        /// The configured limit.
        limit: usize,
        /// Simulation time when the limit was hit.
        time: SimTime,
    },
}
