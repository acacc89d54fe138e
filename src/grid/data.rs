//! Read-only side of a grid model: arenas, ordering, tag indices and lookups.
//!
//! Views receive `&GridData` while the model mutates them, so everything a
//! view needs to read lives here.

use super::cell::GridCell;
use super::column::GridColumn;
use super::filter::GridFilter;
use super::item::{Tag, UpdateCounter};
use super::row::GridRow;
use super::{CellKey, ColumnKey, RowKey};
use crate::value::Value;
use slotmap::SlotMap;
use std::collections::BTreeMap;

/// Something that identifies at most one column.
pub trait ColumnLocator {
    /// Resolves to a live column key.
    fn locate_column(&self, data: &GridData) -> Option<ColumnKey>;
}

/// Something that identifies at most one row.
pub trait RowLocator {
    /// Resolves to a live row key.
    fn locate_row(&self, data: &GridData) -> Option<RowKey>;
}

impl ColumnLocator for ColumnKey {
    fn locate_column(&self, data: &GridData) -> Option<ColumnKey> {
        data.columns.contains_key(*self).then_some(*self)
    }
}

impl ColumnLocator for usize {
    fn locate_column(&self, data: &GridData) -> Option<ColumnKey> {
        data.column_order.get(*self).copied()
    }
}

impl ColumnLocator for &str {
    fn locate_column(&self, data: &GridData) -> Option<ColumnKey> {
        data.column_order.iter().copied().find(|key| {
            let name = &data.columns[*key].name;
            if data.case_sensitive {
                name == self
            } else {
                name.eq_ignore_ascii_case(self)
            }
        })
    }
}

impl ColumnLocator for String {
    fn locate_column(&self, data: &GridData) -> Option<ColumnKey> {
        self.as_str().locate_column(data)
    }
}

impl ColumnLocator for Tag {
    fn locate_column(&self, data: &GridData) -> Option<ColumnKey> {
        data.column_tags.get(self).and_then(|keys| keys.first().copied())
    }
}

impl RowLocator for RowKey {
    fn locate_row(&self, data: &GridData) -> Option<RowKey> {
        data.rows.contains_key(*self).then_some(*self)
    }
}

impl RowLocator for usize {
    fn locate_row(&self, data: &GridData) -> Option<RowKey> {
        data.row_order.get(*self).copied()
    }
}

impl RowLocator for Tag {
    fn locate_row(&self, data: &GridData) -> Option<RowKey> {
        data.row_tags.get(self).and_then(|keys| keys.first().copied())
    }
}

/// Arenas, orderings and indices of a grid model.
#[derive(Debug, Default)]
pub struct GridData {
    pub(crate) columns: SlotMap<ColumnKey, GridColumn>,
    pub(crate) rows: SlotMap<RowKey, GridRow>,
    pub(crate) cells: SlotMap<CellKey, GridCell>,
    pub(crate) column_order: Vec<ColumnKey>,
    pub(crate) row_order: Vec<RowKey>,
    pub(crate) column_tags: BTreeMap<Tag, Vec<ColumnKey>>,
    pub(crate) row_tags: BTreeMap<Tag, Vec<RowKey>>,
    pub(crate) filter: GridFilter,
    pub(crate) counter: UpdateCounter,
    pub(crate) case_sensitive: bool,
}

impl GridData {
    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_order.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_order.len()
    }

    /// Number of assigned cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Model update count.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.counter.get()
    }

    /// Whether column names match case-sensitively.
    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Resolves a column locator.
    pub fn column_key(&self, column: impl ColumnLocator) -> Option<ColumnKey> {
        column.locate_column(self)
    }

    /// Resolves a row locator.
    pub fn row_key(&self, row: impl RowLocator) -> Option<RowKey> {
        row.locate_row(self)
    }

    /// Column by locator.
    pub fn column(&self, column: impl ColumnLocator) -> Option<&GridColumn> {
        column.locate_column(self).and_then(|key| self.columns.get(key))
    }

    /// Row by locator.
    pub fn row(&self, row: impl RowLocator) -> Option<&GridRow> {
        row.locate_row(self).and_then(|key| self.rows.get(key))
    }

    /// Returns true if `key` refers to a live column.
    #[must_use]
    pub fn is_valid_column(&self, key: ColumnKey) -> bool {
        self.columns.contains_key(key)
    }

    /// Returns true if `key` refers to a live row.
    #[must_use]
    pub fn is_valid_row(&self, key: RowKey) -> bool {
        self.rows.contains_key(key)
    }

    /// Returns true if `key` refers to a live cell.
    #[must_use]
    pub fn is_valid_cell(&self, key: CellKey) -> bool {
        self.cells.contains_key(key)
    }

    /// Column keys in model order.
    #[must_use]
    pub fn column_keys(&self) -> &[ColumnKey] {
        &self.column_order
    }

    /// Row keys in model order.
    #[must_use]
    pub fn row_keys(&self) -> &[RowKey] {
        &self.row_order
    }

    /// Columns in model order.
    pub fn columns(&self) -> impl Iterator<Item = (ColumnKey, &GridColumn)> {
        self.column_order.iter().map(|key| (*key, &self.columns[*key]))
    }

    /// Rows in model order.
    pub fn rows(&self) -> impl Iterator<Item = (RowKey, &GridRow)> {
        self.row_order.iter().map(|key| (*key, &self.rows[*key]))
    }

    /// Columns sharing `tag`, in insertion order.
    #[must_use]
    pub fn columns_with_tag(&self, tag: Tag) -> &[ColumnKey] {
        self.column_tags.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// Rows sharing `tag`, in insertion order.
    #[must_use]
    pub fn rows_with_tag(&self, tag: Tag) -> &[RowKey] {
        self.row_tags.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// Cell key at (row, column), if that pair was ever assigned.
    pub fn cell_key(&self, row: impl RowLocator, column: impl ColumnLocator) -> Option<CellKey> {
        let row = row.locate_row(self)?;
        let column = column.locate_column(self)?;
        self.rows.get(row)?.cell_key(column)
    }

    /// Cell at (row, column).
    pub fn cell(&self, row: impl RowLocator, column: impl ColumnLocator) -> Option<&GridCell> {
        self.cell_key(row, column).and_then(|key| self.cells.get(key))
    }

    /// Cell by key.
    #[must_use]
    pub fn cell_by_key(&self, key: CellKey) -> Option<&GridCell> {
        self.cells.get(key)
    }

    /// Value at (row, column).
    pub fn value(&self, row: impl RowLocator, column: impl ColumnLocator) -> Option<&Value> {
        self.cell(row, column).map(GridCell::value)
    }

    /// Value at (row, column), or the column kind's default when never assigned.
    ///
    /// Returns `None` only when the row or column does not exist.
    pub fn value_or_default(&self, row: RowKey, column: ColumnKey) -> Option<Value> {
        let col = self.columns.get(column)?;
        let row = self.rows.get(row)?;
        Some(
            row.cell_key(column)
                .and_then(|key| self.cells.get(key))
                .map_or_else(|| Value::of_kind(col.kind), |cell| cell.value().clone()),
        )
    }

    /// Model-level filter.
    #[must_use]
    pub fn filter(&self) -> &GridFilter {
        &self.filter
    }

    /// Returns true if `row` passes the model filter.
    #[must_use]
    pub fn row_passes_filter(&self, row: RowKey) -> bool {
        self.filter.apply(self, row)
    }

    /// Rows accepted by the model filter, in model order.
    pub fn rows_passing_filter(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.row_order.iter().copied().filter(|row| self.filter.apply(self, *row))
    }
}
