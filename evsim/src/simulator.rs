use std::cmp::min;

use crate::{
    Error, Event, EventHeap, EventId, EventKey, Outcome, Priority, Result, SimulatorConfig, Time,
    DEFAULT_PRIORITY,
};

/// Lifecycle state of a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum State {
    /// Constructed or reset; nothing has been scheduled yet.
    #[strum(serialize = "INIT")]
    Init,
    /// Events have been scheduled, but the run has not started.
    #[strum(serialize = "READY")]
    Ready,
    /// Inside of the run loop.
    #[strum(serialize = "RUNNING")]
    Running,
    /// The run loop has exited.
    #[strum(serialize = "FINISHED")]
    Finished,
}

/// Discrete-event simulator.
///
/// Owns the virtual clock and the heap of pending events.
/// Scheduling is permitted in [`State::Init`], [`State::Ready`] and [`State::Running`] (that is,
/// also from inside callbacks). Once [`Simulator::run`] returns, the simulator is
/// [`State::Finished`] and must be [`reset`](Simulator::reset) before it can be used again.
#[derive(Debug)]
pub struct Simulator {
    config: SimulatorConfig,
    state: State,
    now: Time,
    end_time: Option<Time>,
    next_sequence: u64,
    current: Option<EventKey>,
    events: EventHeap,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::with_config(SimulatorConfig::default())
    }
}

impl From<SimulatorConfig> for Simulator {
    fn from(config: SimulatorConfig) -> Self {
        Self::with_config(config)
    }
}

impl Simulator {
    /// Constructs a simulator starting at time 0, without an end time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a simulator whose clock starts at `start_time`.
    #[must_use]
    pub fn starting_at(start_time: Time) -> Self {
        Self::with_config(SimulatorConfig {
            start_time,
            end_time: None,
        })
    }

    /// Constructs a simulator from the given configuration.
    ///
    /// If the configured end time precedes the start time, it is moved to the start time.
    #[must_use]
    pub fn with_config(config: SimulatorConfig) -> Self {
        let config = SimulatorConfig {
            end_time: config.end_time.map(|end| end.max(config.start_time)),
            ..config
        };
        Self {
            config,
            state: State::Init,
            now: config.start_time,
            end_time: config.end_time,
            next_sequence: 0,
            current: None,
            events: EventHeap::new(),
        }
    }

    /// Schedules `callback` to be executed at `self.now() + delay` with the default priority.
    ///
    /// Returns the handle of the new event.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDelay`] if `delay` is negative,
    /// - [`Error::InvalidState`] if the simulator is finished,
    /// - [`Error::TimeOverflow`] if the target time does not fit in [`Time`].
    pub fn schedule<F, R>(&mut self, delay: Time, callback: F) -> Result<EventId>
    where
        F: FnOnce(&mut Simulator) -> R + 'static,
        R: Outcome,
    {
        self.schedule_with_priority(delay, DEFAULT_PRIORITY, callback)
    }

    /// Schedules `callback` to be executed at `self.now() + delay` with the given priority.
    ///
    /// If there are multiple events in one time moment, the priority determines which goes first:
    /// the lower the priority, the earlier it is executed. If the priorities are equal, the event
    /// that was scheduled first goes first.
    ///
    /// # Errors
    ///
    /// See [`Simulator::schedule`].
    pub fn schedule_with_priority<F, R>(
        &mut self,
        delay: Time,
        priority: Priority,
        callback: F,
    ) -> Result<EventId>
    where
        F: FnOnce(&mut Simulator) -> R + 'static,
        R: Outcome,
    {
        if self.state == State::Finished {
            return Err(self.invalid_state("schedule"));
        }
        let time = self.time_after(delay)?;
        let key = EventKey {
            time,
            priority,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.events.insert(Event::new(key, callback));
        if self.state == State::Init {
            self.state = State::Ready;
        }
        log::trace!(
            "Scheduled event {} at time {} with priority {}",
            key.id(),
            time,
            priority
        );
        Ok(key.id())
    }

    /// Sets the simulation to end at `self.now() + delay` even if there are still events
    /// in the heap. Events at exactly the end time are still executed.
    ///
    /// If there are multiple calls, the earliest end time wins. As such, an end time cannot
    /// be pushed back once it has been set.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDelay`] if `delay` is negative, or if it is zero outside of a run,
    /// - [`Error::InvalidState`] if the simulator is finished,
    /// - [`Error::TimeOverflow`] if the end time does not fit in [`Time`].
    pub fn end_after(&mut self, delay: Time) -> Result<Time> {
        match self.state {
            State::Finished => return Err(self.invalid_state("set end time")),
            State::Init | State::Ready if delay == 0 => return Err(Error::InvalidDelay(delay)),
            _ => {}
        }
        let time = self.time_after(delay)?;
        let end_time = self.end_time.map_or(time, |end| min(end, time));
        self.end_time = Some(end_time);
        log::debug!("End time set to {}", end_time);
        Ok(end_time)
    }

    /// Runs the simulation.
    ///
    /// Events are executed in the order of their keys until either the heap is empty,
    /// or the next event lies past the cutoff, which is the earlier of `until` and the end time.
    /// If there is a cutoff, the clock is then moved to it.
    ///
    /// Returns the final time.
    ///
    /// Running a finished simulator with no pending events does nothing and returns the current
    /// time. If a callback resets the simulator, the run stops right after that callback.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if called from inside a callback of this simulator, or if the
    ///   simulator is finished and still has pending events,
    /// - [`Error::TimeInPast`] if `until` is earlier than the current time,
    /// - [`Error::Callback`] if a callback fails; the simulator is left as it was at that point,
    ///   and must be reset before it can be run again.
    pub fn run(&mut self, until: Option<Time>) -> Result<Time> {
        match self.state {
            State::Running => return Err(self.invalid_state("run")),
            State::Finished if self.events.is_empty() => return Ok(self.now),
            State::Finished => return Err(self.invalid_state("run")),
            State::Init | State::Ready => {}
        }
        if let Some(until) = until {
            if until < self.now {
                return Err(Error::TimeInPast {
                    time: until,
                    now: self.now,
                });
            }
        }
        self.state = State::Running;
        log::debug!(
            "Run started at time {} with {} pending events",
            self.now,
            self.events.size()
        );
        loop {
            if self.events.is_empty() {
                break;
            }
            let next = self.events.peek_min()?.time();
            if self.cutoff(until).map_or(false, |cutoff| next > cutoff) {
                break;
            }
            let event = self.events.extract_min()?;
            let key = event.key();
            self.now = key.time;
            self.current = Some(key);
            log::trace!("Dispatching event {} at time {}", key.id(), key.time);
            if let Err(source) = event.dispatch(self) {
                return Err(Error::Callback {
                    event: key.id(),
                    time: key.time,
                    source,
                });
            }
            if self.state != State::Running {
                log::debug!("Run interrupted by a reset");
                return Ok(self.now);
            }
            self.current = None;
        }
        if let Some(cutoff) = self.cutoff(until) {
            self.now = self.now.max(cutoff);
        }
        self.state = State::Finished;
        log::debug!(
            "Run finished at time {} with {} pending events",
            self.now,
            self.events.size()
        );
        Ok(self.now)
    }

    /// Discards all pending events and brings the simulator back to its initial state:
    /// the clock, the sequence counter and the end time are restored to their initial values.
    pub fn reset(&mut self) {
        self.events.clear();
        self.state = State::Init;
        self.now = self.config.start_time;
        self.end_time = self.config.end_time;
        self.next_sequence = 0;
        self.current = None;
        log::debug!("Simulator reset to time {}", self.now);
    }

    /// Current simulation time. Before the simulation is run, this is the start time.
    /// After the run, it is the time of the last executed event, or the cutoff if there was one.
    #[must_use]
    pub fn now(&self) -> Time {
        self.now
    }

    /// The final time of a finished run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the simulator is not finished.
    pub fn end(&self) -> Result<Time> {
        if self.state == State::Finished {
            Ok(self.now)
        } else {
            Err(self.invalid_state("read the end time"))
        }
    }

    /// The end time set by configuration or by [`Simulator::end_after`], if any.
    #[must_use]
    pub fn end_time(&self) -> Option<Time> {
        self.end_time
    }

    /// Key of the event whose callback is currently executing.
    #[must_use]
    pub fn current_event(&self) -> Option<EventKey> {
        self.current
    }

    /// Time of the earliest pending event.
    #[must_use]
    pub fn next_event_time(&self) -> Option<Time> {
        self.events.peek_min().ok().map(Event::time)
    }

    /// Number of events in the heap. It can be positive after a finished run that was cut off
    /// by an end time.
    #[must_use]
    pub fn event_heap_size(&self) -> usize {
        self.events.size()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Answers whether nothing has been scheduled since construction or the last reset.
    #[must_use]
    pub fn is_init(&self) -> bool {
        self.state == State::Init
    }

    /// Answers whether events have been scheduled but the run has not started.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    /// Answers whether the run loop is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Answers whether the run has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    fn time_after(&self, delay: Time) -> Result<Time> {
        if delay < 0 {
            return Err(Error::InvalidDelay(delay));
        }
        self.now.checked_add(delay).ok_or(Error::TimeOverflow {
            now: self.now,
            delay,
        })
    }

    fn cutoff(&self, until: Option<Time>) -> Option<Time> {
        match (until, self.end_time) {
            (Some(until), Some(end)) => Some(min(until, end)),
            (until, end) => until.or(end),
        }
    }

    fn invalid_state(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state,
        }
    }
}
