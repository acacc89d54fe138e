//! Feeder contract: external data sources reporting entity lifecycles.

use crate::grid::Tag;
use std::fmt;

/// Identity of an external object reported by a feeder (a PID, an index,
/// an address). Two reports with the same key describe the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedKey(pub u64);

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FeedKey {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

impl From<u64> for FeedKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Handle of a feeder connected to a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeederId(pub(crate) u32);

/// Receiver of feeder events.
///
/// Feeders call these once per entity and poll cycle.
pub trait FeedSink<T> {
    /// A new entity appeared.
    fn feed_create_item(&mut self, tag: Tag, key: FeedKey, item: &T);

    /// An entity was seen again; unknown keys are treated as created.
    fn feed_update_item(&mut self, tag: Tag, key: FeedKey, item: &T);

    /// An entity disappeared; unknown keys are ignored.
    fn feed_delete_item(&mut self, tag: Tag, key: FeedKey);
}

/// External data source polled by a [`Monitor`](super::Monitor).
pub trait Feeder<T> {
    /// Name used in debug output.
    fn name(&self) -> &str {
        "feeder"
    }

    /// Called when the feeder is connected to a monitor.
    fn connect_monitor(&mut self, _id: FeederId) {}

    /// Called when the monitor lets go of the feeder (disconnect, clear or drop).
    fn disconnect_monitor(&mut self, _id: FeederId) {}

    /// Reports the current state of the source into `sink`.
    fn feed(&mut self, sink: &mut dyn FeedSink<T>);
}
