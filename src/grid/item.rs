//! State shared by grid columns and rows.

use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Counter value past which [`UpdateCounter`] wraps back to zero.
pub const UPDATE_COUNTER_WRAP: u64 = 1_234_567_890;

/// Non-unique classification of a column or row (e.g. the kind of feeder
/// that produced it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub i32);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic dirty marker that wraps instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UpdateCounter(u64);

impl UpdateCounter {
    /// Advances the counter, wrapping to zero past [`UPDATE_COUNTER_WRAP`].
    pub fn bump(&mut self) {
        self.0 = if self.0 >= UPDATE_COUNTER_WRAP { 0 } else { self.0 + 1 };
    }

    /// Current count.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Pinned position of a fixed column or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPosition {
    /// Distance from the anchored edge.
    pub offset: usize,
    /// Anchored to the end instead of the start.
    pub at_end: bool,
}

impl FixedPosition {
    /// Pinned `offset` items from the start.
    #[must_use]
    pub fn start(offset: usize) -> Self {
        Self { offset, at_end: false }
    }

    /// Pinned `offset` items from the end.
    #[must_use]
    pub fn end(offset: usize) -> Self {
        Self { offset, at_end: true }
    }
}

/// Identity, classification and presentation arguments of a column or row.
#[derive(Debug, Clone, Default)]
pub struct GridItem {
    pub(crate) id: usize,
    pub(crate) tag: Option<Tag>,
    pub(crate) data: Option<u64>,
    pub(crate) args: BTreeMap<u32, Value>,
    pub(crate) fixed: Option<FixedPosition>,
    pub(crate) counter: UpdateCounter,
}

impl GridItem {
    pub(crate) fn new(id: usize, tag: Option<Tag>) -> Self {
        Self { id, tag, ..Self::default() }
    }

    /// Dense position in the model (`0..count`), renumbered on removal.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Classification tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Opaque caller-owned data key (e.g. the feeder object key).
    #[must_use]
    pub fn data(&self) -> Option<u64> {
        self.data
    }

    /// Presentation argument stored under `id`.
    #[must_use]
    pub fn arg(&self, id: u32) -> Option<&Value> {
        self.args.get(&id)
    }

    /// All arguments, ordered by id.
    pub fn args(&self) -> impl Iterator<Item = (u32, &Value)> {
        self.args.iter().map(|(k, v)| (*k, v))
    }

    /// Fixed position, if pinned.
    #[must_use]
    pub fn fixed(&self) -> Option<FixedPosition> {
        self.fixed
    }

    /// Returns true if pinned.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Update count of this item.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.counter.get()
    }

    pub(crate) fn touch(&mut self) {
        self.counter.bump();
    }
}
