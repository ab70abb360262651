//! Helpers shared by simulator tests.

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

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

/// Shared, cloneable buffer that callbacks push values to, so that tests can check what was
/// executed and in which order.
///
/// ```
/// # use testing::Recorder;
/// let recorder = Recorder::default();
/// let handle = recorder.clone();
/// let callback = move || handle.push(7);
/// callback();
/// recorder.push(8);
/// assert_eq!(recorder.take(), vec![7, 8]);
/// assert!(recorder.is_empty());
/// ```
#[derive(Debug)]
pub struct Recorder<T> {
    values: Rc<RefCell<Vec<T>>>,
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            values: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Rc::clone(&self.values),
        }
    }
}

impl<T: 'static> Recorder<T> {
    /// Appends a value.
    pub fn push(&self, value: T) {
        self.values.borrow_mut().push(value);
    }

    /// Removes and returns all recorded values.
    #[must_use]
    pub fn take(&self) -> Vec<T> {
        self.values.borrow_mut().drain(..).collect()
    }

    /// Number of recorded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Answers whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

/// One randomly generated scheduling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    /// Delay from the current time.
    pub delay: i64,
    /// Event priority.
    pub priority: i64,
    /// Arbitrary payload to record when the event runs.
    pub value: i64,
}

/// Generates `count` reproducible scheduling requests with delays in `0..=max_delay` and
/// priorities in `priorities`.
#[must_use]
pub fn random_schedule(
    seed: u64,
    max_delay: i64,
    count: usize,
    priorities: RangeInclusive<i64>,
) -> Vec<ScheduleRequest> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    (0..count)
        .map(|_| ScheduleRequest {
            delay: rng.gen_range(0, max_delay + 1),
            priority: rng.gen_range(*priorities.start(), *priorities.end() + 1),
            value: rng.gen_range(-50_000, 100_001),
        })
        .collect()
}

/// The order in which `requests` must be executed when all of them are scheduled at the same
/// time moment, one after another: sorted by delay, then priority, then position.
#[must_use]
pub fn expected_order(requests: &[ScheduleRequest]) -> Vec<ScheduleRequest> {
    let mut sorted: Vec<_> = requests.iter().copied().enumerate().collect();
    sorted.sort_by_key(|(idx, r)| (r.delay, r.priority, *idx));
    sorted.into_iter().map(|(_, r)| r).collect()
}
