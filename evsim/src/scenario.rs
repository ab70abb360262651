//! Declarative scenarios: a configuration and a list of labeled events, loaded from YAML.
//!
//! Running a scenario produces a trace of the executed events in execution order.
//!
//! ```
//! # use evsim::scenario::Scenario;
//! # fn main() -> anyhow::Result<()> {
//! let scenario: Scenario = r#"
//! config:
//!     end_time: 20
//! events:
//!     - label: tick
//!       delay: 0
//!       repeat:
//!           every: 10
//!           times: 5
//!     - label: urgent
//!       delay: 10
//!       priority: -1"#
//!     .parse()?;
//! let report = scenario.run(None)?;
//! let labels: Vec<_> = report.trace.iter().map(|e| (e.time, e.label.as_str())).collect();
//! assert_eq!(labels, vec![(0, "tick"), (10, "urgent"), (10, "tick"), (20, "tick")]);
//! assert_eq!(report.end, 20);
//! assert_eq!(report.pending, 1);
//! # Ok(())
//! # }
//! ```

use std::cell::RefCell;
use std::io::{Cursor, Read};
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::{Priority, Simulator, SimulatorConfig, Time, DEFAULT_PRIORITY};

/// Makes an event happen again after it has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repeat {
    /// Delay between two consecutive occurrences.
    pub every: Time,
    /// How many more times the event is executed after its first occurrence.
    pub times: u32,
}

/// An event defined in a scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEvent {
    /// Name reported in the trace.
    pub label: String,
    /// Delay from the start time.
    pub delay: Time,
    /// Event priority.
    #[serde(default = "default_priority")]
    pub priority: Priority,
    /// Optional repetition.
    #[serde(default)]
    pub repeat: Option<Repeat>,
}

fn default_priority() -> Priority {
    DEFAULT_PRIORITY
}

/// Scenario loaded from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Simulator configuration.
    #[serde(default)]
    pub config: SimulatorConfig,
    /// Initial events.
    pub events: Vec<ScenarioEvent>,
}

/// Single executed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Time of execution.
    pub time: Time,
    /// Priority of the event.
    pub priority: Priority,
    /// Sequence number of the event.
    pub event: u64,
    /// Label of the scenario event.
    pub label: String,
}

/// Result of running a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Executed events in execution order.
    pub trace: Vec<TraceEntry>,
    /// Final simulation time.
    pub end: Time,
    /// Number of events that were left in the heap.
    pub pending: usize,
}

type Trace = Rc<RefCell<Vec<TraceEntry>>>;

/// State carried from one occurrence of a repeated event to the next.
struct Occurrence {
    label: Rc<str>,
    priority: Priority,
    every: Time,
    remaining: u32,
    trace: Trace,
}

impl Occurrence {
    fn fire(self, sim: &mut Simulator) -> crate::Result<()> {
        if let Some(key) = sim.current_event() {
            self.trace.borrow_mut().push(TraceEntry {
                time: key.time,
                priority: key.priority,
                event: key.sequence,
                label: self.label.to_string(),
            });
        }
        if self.remaining > 0 {
            let next = Occurrence {
                remaining: self.remaining - 1,
                ..self
            };
            sim.schedule_with_priority(next.every, next.priority, move |sim| next.fire(sim))?;
        }
        Ok(())
    }
}

impl Scenario {
    /// Load scenario from YAML.
    ///
    /// # Errors
    ///
    /// Error will be returned either if the input cannot be parsed, if the configuration is
    /// invalid, or if any delay is negative.
    pub fn from_yaml<R: Read>(reader: R) -> anyhow::Result<Self> {
        let scenario: Self =
            serde_yaml::from_reader(reader).context("Failed to parse scenario")?;
        scenario.verify()
    }

    fn verify(self) -> anyhow::Result<Self> {
        let config = self.config.verify()?;
        for event in &self.events {
            ensure!(
                event.delay >= 0,
                "Delay of event `{}` must be non-negative ({})",
                event.label,
                event.delay
            );
            if let Some(repeat) = event.repeat {
                ensure!(
                    repeat.every >= 0,
                    "Repeat interval of event `{}` must be non-negative ({})",
                    event.label,
                    repeat.every
                );
            }
        }
        Ok(Self { config, ..self })
    }

    /// Runs the scenario on a new simulator, optionally stopping at `until`.
    ///
    /// # Errors
    ///
    /// Returns any error reported by the simulator, see [`Simulator::run`].
    pub fn run(&self, until: Option<Time>) -> crate::Result<Report> {
        let trace = Trace::default();
        let mut sim = Simulator::with_config(self.config);
        for event in &self.events {
            let occurrence = Occurrence {
                label: Rc::from(event.label.as_str()),
                priority: event.priority,
                every: event.repeat.map_or(0, |r| r.every),
                remaining: event.repeat.map_or(0, |r| r.times),
                trace: Rc::clone(&trace),
            };
            sim.schedule_with_priority(event.delay, event.priority, move |sim| {
                occurrence.fire(sim)
            })?;
        }
        let end = sim.run(until)?;
        log::info!(
            "Scenario finished at time {} after {} events",
            end,
            trace.borrow().len()
        );
        let trace = trace.replace(Vec::new());
        Ok(Report {
            trace,
            end,
            pending: sim.event_heap_size(),
        })
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;
    fn from_str(scenario: &str) -> Result<Self, Self::Err> {
        Scenario::from_yaml(Cursor::new(scenario))
    }
}
