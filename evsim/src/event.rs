use std::cmp::Ordering;
use std::fmt;

use derive_more::{Display, From, Into};

use crate::{Priority, Simulator, Time};

/// Error type a callback can fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub(crate) type Callback = Box<dyn FnOnce(&mut Simulator) -> Result<(), BoxError>>;

/// Identifies a scheduled event. It is equal to the insertion sequence number of the event,
/// so it is unique within a single simulator until it is reset.
#[derive(From, Into, Debug, PartialEq, PartialOrd, Eq, Ord, Copy, Clone, Hash, Display)]
#[display(fmt = "#{}", _0)]
pub struct EventId(u64);

/// Ordering key of an event.
///
/// Keys compare lexicographically by time, then priority, then sequence.
/// Since the sequence is unique per simulator, no two keys of one simulator are equal.
#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Copy, Clone, Hash)]
pub struct EventKey {
    /// Time at which the event occurs.
    pub time: Time,
    /// Lower priority goes first within the same time moment.
    pub priority: Priority,
    /// Insertion sequence number.
    pub sequence: u64,
}

impl EventKey {
    /// Handle of the event with this key.
    #[must_use]
    pub fn id(&self) -> EventId {
        EventId(self.sequence)
    }
}

/// Anything a callback can return.
///
/// Callbacks that cannot fail return `()`. Fallible callbacks return a `Result`; its `Ok` value
/// is discarded, and its error stops the run (see [`Error::Callback`](crate::Error::Callback)).
pub trait Outcome {
    /// Converts the returned value into a unit result.
    ///
    /// # Errors
    ///
    /// Returns the error reported by the callback.
    fn into_result(self) -> Result<(), BoxError>;
}

impl Outcome for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T, E> Outcome for Result<T, E>
where
    E: Into<BoxError>,
{
    fn into_result(self) -> Result<(), BoxError> {
        self.map(|_| ()).map_err(Into::into)
    }
}

/// Event record: a key and the callback to invoke once the clock reaches `key.time`.
///
/// Comparisons only look at the key.
pub struct Event {
    key: EventKey,
    callback: Callback,
}

impl Event {
    /// Constructs a new event.
    pub fn new<F, R>(key: EventKey, callback: F) -> Self
    where
        F: FnOnce(&mut Simulator) -> R + 'static,
        R: Outcome,
    {
        Self {
            key,
            callback: Box::new(move |sim| callback(sim).into_result()),
        }
    }

    /// Event's ordering key.
    #[must_use]
    pub fn key(&self) -> EventKey {
        self.key
    }

    /// Event's time.
    #[must_use]
    pub fn time(&self) -> Time {
        self.key.time
    }

    /// Event's priority.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.key.priority
    }

    /// Event's handle.
    #[must_use]
    pub fn id(&self) -> EventId {
        self.key.id()
    }

    /// Consumes the event and runs its callback.
    pub(crate) fn dispatch(self, sim: &mut Simulator) -> Result<(), BoxError> {
        (self.callback)(sim)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(time: Time, priority: Priority, sequence: u64) -> EventKey {
        EventKey {
            time,
            priority,
            sequence,
        }
    }

    #[test]
    fn test_key_cmp() {
        assert!(key(1, 5, 9) < key(2, 0, 0));
        assert!(key(1, -1, 9) < key(1, 0, 0));
        assert!(key(1, 0, 3) < key(1, 0, 4));
        assert_eq!(key(7, 1, 2).cmp(&key(7, 1, 2)), Ordering::Equal);
    }

    #[test]
    fn test_event_cmp_ignores_callback() {
        let a = Event::new(key(1, 0, 0), |_| ());
        let b = Event::new(key(1, 0, 1), |_| -> Result<(), BoxError> {
            Err("never called".into())
        });
        assert!(a < b);
        assert_ne!(a, b);
        assert_eq!(a, Event::new(key(1, 0, 0), |_| ()));
    }

    #[test]
    fn test_event_id() {
        let event = Event::new(key(3, 2, 17), |_| ());
        assert_eq!(event.id(), EventId::from(17));
        assert_eq!(u64::from(event.id()), 17);
        assert_eq!(event.id().to_string(), "#17");
        assert_eq!(event.time(), 3);
        assert_eq!(event.priority(), 2);
    }

    #[test]
    fn test_outcome() {
        assert!(().into_result().is_ok());
        assert!(Ok::<_, BoxError>(5).into_result().is_ok());
        let err = Err::<(), _>(crate::Error::EmptyHeap).into_result().unwrap_err();
        assert_eq!(err.to_string(), "event heap is empty");
    }

    #[test]
    fn test_debug_omits_callback() {
        let event = Event::new(key(1, 2, 3), |_| ());
        assert_eq!(
            format!("{:?}", event),
            "Event { key: EventKey { time: 1, priority: 2, sequence: 3 }, .. }"
        );
    }
}
