//! General time utility functions
//!
//! The control core never reads the wall clock directly. It is handed a [`Clock`] at construction,
//! which is a [`SessionClock`] in the executable and a [`ManualClock`] in tests and simulations.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::Cell;
use std::rc::Rc;

use crate::session;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of monotonic time.
pub trait Clock {
    /// Current time.
    ///
    /// Units: seconds
    fn now_s(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock reading the time elapsed since the session epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionClock;

/// Clock which only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give another to the code under
/// test.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    time_s: Rc<Cell<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Clock for SessionClock {
    fn now_s(&self) -> f64 {
        session::get_elapsed_seconds()
    }
}

impl ManualClock {
    pub fn new(time_s: f64) -> Self {
        Self {
            time_s: Rc::new(Cell::new(time_s)),
        }
    }

    /// Set the current time.
    pub fn set(&self, time_s: f64) {
        self.time_s.set(time_s);
    }

    /// Move the clock forwards by the given number of seconds.
    pub fn advance(&self, dt_s: f64) {
        self.time_s.set(self.time_s.get() + dt_s);
    }
}

impl Clock for ManualClock {
    fn now_s(&self) -> f64 {
        self.time_s.get()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}
