//! Grid cells.

use super::item::UpdateCounter;
use super::{ColumnKey, RowKey};
use crate::value::{Value, ValueKind};

/// One value at a (row, column) intersection.
#[derive(Debug, Clone)]
pub struct GridCell {
    row: RowKey,
    column: ColumnKey,
    value: Value,
    counter: UpdateCounter,
}

impl GridCell {
    pub(crate) fn new(row: RowKey, column: ColumnKey, kind: ValueKind) -> Self {
        Self { row, column, value: Value::of_kind(kind), counter: UpdateCounter::default() }
    }

    /// Owning row.
    #[must_use]
    pub fn row(&self) -> RowKey {
        self.row
    }

    /// Owning column.
    #[must_use]
    pub fn column(&self) -> ColumnKey {
        self.column
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Update count of this cell.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.counter.get()
    }

    /// Assigns `value`; returns the previous value when it changed.
    pub(crate) fn assign(&mut self, value: &Value) -> Option<Value> {
        if self.value == *value {
            return None;
        }
        let old = self.value.clone();
        self.value.set(value);
        self.counter.bump();
        Some(old)
    }

    pub(crate) fn change_kind(&mut self, kind: ValueKind) {
        if self.value.kind() != kind {
            self.value.set_kind(kind);
            self.counter.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_same_value_is_noop() {
        let mut cell = GridCell::new(RowKey::default(), ColumnKey::default(), ValueKind::Double);
        assert!(cell.assign(&Value::from(0.0)).is_none());
        assert_eq!(cell.update_count(), 0);

        let old = cell.assign(&Value::from(2.5)).unwrap();
        assert!((old.as_f64()).abs() < f64::EPSILON);
        assert_eq!(cell.update_count(), 1);
        assert_eq!(cell.value().kind(), ValueKind::Double);
    }

    #[test]
    fn test_change_kind_resets_value() {
        let mut cell = GridCell::new(RowKey::default(), ColumnKey::default(), ValueKind::Int);
        cell.assign(&Value::from(4i64));
        cell.change_kind(ValueKind::String);
        assert_eq!(cell.value().as_str(), Some(""));
        assert_eq!(cell.update_count(), 2);
    }
}
