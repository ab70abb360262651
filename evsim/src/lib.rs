//! Discrete-event simulation engine.
//!
//! A [`Simulator`] keeps a virtual clock and a heap of pending events. Running the simulator
//! repeatedly takes the earliest event, moves the clock to its time, and calls its callback.
//! Callbacks receive the simulator they run on, so they can schedule further events.
//! The clock has no relation to the wall clock: jumping far ahead costs nothing.
//!
//! Events are ordered by `(time, priority, sequence)`. A lower priority runs earlier within the
//! same time moment, and events with equal time and priority run in the order they were scheduled.
//!
//! # Examples
//!
//! ```
//! # use evsim::Simulator;
//! # use std::cell::RefCell;
//! # use std::rc::Rc;
//! # fn main() -> evsim::Result<()> {
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let mut sim = Simulator::new();
//!
//! let l = Rc::clone(&log);
//! sim.schedule(10, move |sim| l.borrow_mut().push(("late", sim.now())))?;
//! let l = Rc::clone(&log);
//! sim.schedule(5, move |sim| {
//!     l.borrow_mut().push(("early", sim.now()));
//!     let l = Rc::clone(&l);
//!     sim.schedule(0, move |sim| l.borrow_mut().push(("nested", sim.now())))
//! })?;
//!
//! assert_eq!(sim.run(None)?, 10);
//! assert_eq!(*log.borrow(), vec![("early", 5), ("nested", 5), ("late", 10)]);
//! assert!(sim.is_finished());
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]
#![deny(unsafe_code)]

mod event;
pub use event::{BoxError, Event, EventId, EventKey, Outcome};

mod heap;
pub use heap::EventHeap;

mod simulator;
pub use simulator::{Simulator, State};

pub mod config;
pub use config::SimulatorConfig;

pub mod logger;
pub mod scenario;

/// Virtual time. The unit is up to the caller (nanoseconds by convention).
pub type Time = i64;

/// Event priority. Among events at the same time, lower values run first.
pub type Priority = i64;

/// Priority used by [`Simulator::schedule`].
pub const DEFAULT_PRIORITY: Priority = 0;

/// Error type encompassing all simulator errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A negative delay was passed to a scheduling function.
    #[error("delay must be non-negative: {0}")]
    InvalidDelay(Time),
    /// The operation is not permitted in the current lifecycle state.
    #[error("cannot {operation} when the simulator is {state}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State of the simulator at the time of the call.
        state: State,
    },
    /// Attempted to take an event out of an empty heap.
    #[error("event heap is empty")]
    EmptyHeap,
    /// Requested a run cutoff that lies before the current time.
    #[error("time {time} is before the current time {now}")]
    TimeInPast {
        /// The requested time.
        time: Time,
        /// Current simulation time.
        now: Time,
    },
    /// The target time of an event does not fit in [`Time`].
    #[error("delay {delay} from time {now} overflows the clock")]
    TimeOverflow {
        /// Current simulation time.
        now: Time,
        /// The requested delay.
        delay: Time,
    },
    /// A callback returned an error. The simulator is left as it was at the time of failure.
    #[error("callback of event {event} failed at time {time}")]
    Callback {
        /// The event whose callback failed.
        event: EventId,
        /// Time of the failed event.
        time: Time,
        /// Error returned by the callback.
        #[source]
        source: BoxError,
    },
}

/// Result alias using [`Error`](enum.Error.html).
pub type Result<T> = std::result::Result<T, Error>;
