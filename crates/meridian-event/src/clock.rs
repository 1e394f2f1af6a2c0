use std::fmt;
use std::ops::Add;

/// A point in simulation time, in abstract time units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimTime(pub u64);

impl SimTime {
    /// The start of every simulation.
    pub const ZERO: Self = Self(0);

    /// Raw time units.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Add<u64> for SimTime {
    type Output = Self;

    fn add(self, rhs: u64) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

impl From<u64> for SimTime {
    fn from(t: u64) -> Self {
        Self(t)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

/// Tracks the current simulation time and how many events have fired.
///
/// Time only moves forward.
#[derive(Debug, Clone, Default)]
pub struct LoopClock {
    now: SimTime,
    dispatched: u64,
}

impl LoopClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to `time` if it lies in the future. Returns the current time.
    pub fn advance_to(&mut self, time: SimTime) -> SimTime {
        if time > self.now {
            self.now = time;
        }
        self.now
    }

    /// Record one dispatched event.
    pub fn count_dispatch(&mut self) {
        self.dispatched += 1;
    }

    /// The current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Total events dispatched since the clock started.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}
