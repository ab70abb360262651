//! Simulator configuration, typically loaded from a YAML file.

use std::io::{Cursor, Read};
use std::str::FromStr;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::Time;

/// Initial settings of a [`Simulator`](crate::Simulator). These are also the values restored by
/// [`Simulator::reset`](crate::Simulator::reset).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Value of the clock before anything runs.
    #[serde(default)]
    pub start_time: Time,
    /// Inclusive cutoff: no event past this time is executed.
    #[serde(default)]
    pub end_time: Option<Time>,
}

impl SimulatorConfig {
    /// Load config from YAML.
    ///
    /// # Example
    ///
    /// ```
    /// # use evsim::SimulatorConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let input = r#"
    /// start_time: 100
    /// end_time: 5000"#;
    /// let config = SimulatorConfig::from_yaml(std::io::Cursor::new(input))?;
    /// assert_eq!(config.start_time, 100);
    /// assert_eq!(config.end_time, Some(5000));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Error will be returned either if the input cannot be parsed,
    /// or if the end time precedes the start time.
    pub fn from_yaml<R: Read>(reader: R) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_reader(reader).context("Failed to parse config")?;
        config.verify()
    }

    pub(crate) fn verify(self) -> anyhow::Result<Self> {
        if let Some(end_time) = self.end_time {
            ensure!(
                end_time >= self.start_time,
                "End time ({}) cannot precede start time ({})",
                end_time,
                self.start_time
            );
        }
        Ok(self)
    }
}

impl FromStr for SimulatorConfig {
    type Err = anyhow::Error;
    fn from_str(config: &str) -> Result<Self, Self::Err> {
        SimulatorConfig::from_yaml(Cursor::new(config))
    }
}
