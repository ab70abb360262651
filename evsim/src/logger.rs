//! Logger that accumulates messages in a vector buffer instead of printing them.
//! All buffered messages can be taken out at once, e.g., to check what the simulator
//! reported while running.
//!
//! # Examples
//!
//! Calling [`init`](LoggerBuilder::init) more than once will not fail; the following calls are
//! simply no-ops.
//! ```
//! # use evsim::{logger, Simulator};
//! # fn main() -> anyhow::Result<()> {
//! logger::LoggerBuilder::default()
//!     .level(log::LevelFilter::Debug)
//!     .target("evsim")
//!     .init()?;
//! let mut sim = Simulator::new();
//! sim.schedule(5, |_| ())?;
//! sim.run(None)?;
//! assert_eq!(
//!     logger::clear()?,
//!     vec![
//!         String::from("[DEBUG] Run started at time 0 with 1 pending events"),
//!         String::from("[DEBUG] Run finished at time 5 with 0 pending events"),
//!     ]
//! );
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use log::LevelFilter;

lazy_static::lazy_static! {
    static ref LOG_BUFFER: Arc<RwLock<Vec<String>>> = Arc::new(RwLock::new(Vec::new()));
    static ref BUFFER_INITIALIZED: Arc<RwLock<bool>> = Arc::new(RwLock::new(false));
}

/// Builds a vector logger.
pub struct LoggerBuilder {
    level: LevelFilter,
    target: Option<String>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            target: None,
        }
    }
}

impl LoggerBuilder {
    /// Sets level filter.
    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Sets logging target prefix.
    #[must_use]
    pub fn target<S: Into<String>>(mut self, target: S) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Initializes vector logger.
    ///
    /// # Errors
    ///
    /// Fails if the buffer lock is poisoned, or if another logger has already been installed.
    pub fn init(self) -> anyhow::Result<()> {
        let mut initialized = BUFFER_INITIALIZED
            .write()
            .map_err(|err| anyhow!("{:?}", err))?;
        if *initialized {
            return Ok(());
        }
        let buffer = Arc::clone(&LOG_BUFFER);
        let mut dispatch = fern::Dispatch::new()
            .level(self.level)
            .chain(fern::Output::call(move |record| {
                if let Ok(mut buffer) = buffer.write() {
                    buffer.push(format!(
                        "{:7} {}",
                        format!("[{}]", record.level()),
                        record.args()
                    ));
                }
            }));
        if let Some(target) = self.target {
            dispatch = dispatch.filter(move |metadata| metadata.target().starts_with(&target));
        }
        dispatch.apply()?;
        *initialized = true;
        Ok(())
    }
}

/// Clears the current log buffer and returns its contents.
///
/// # Errors
///
/// Fails if the buffer lock is poisoned.
pub fn clear() -> anyhow::Result<Vec<String>> {
    let mut handle = LOG_BUFFER.write().map_err(|err| anyhow!("{:?}", err))?;
    Ok(handle.drain(..).collect())
}
