//! Grid rows.

use super::item::{GridItem, Tag};
use super::{CellKey, ColumnKey};
use std::collections::BTreeMap;
use std::ops::Deref;

/// A model row: sum participation and the cells it owns.
#[derive(Debug, Clone)]
pub struct GridRow {
    pub(crate) item: GridItem,
    pub(crate) sum_considered: bool,
    pub(crate) cells: BTreeMap<ColumnKey, CellKey>,
}

impl GridRow {
    pub(crate) fn new(id: usize, tag: Option<Tag>) -> Self {
        Self { item: GridItem::new(id, tag), sum_considered: true, cells: BTreeMap::new() }
    }

    /// Whether this row contributes to sum bars.
    #[must_use]
    pub fn is_sum_considered(&self) -> bool {
        self.sum_considered
    }

    /// Cell in `column`, if one was ever assigned.
    #[must_use]
    pub fn cell_key(&self, column: ColumnKey) -> Option<CellKey> {
        self.cells.get(&column).copied()
    }

    /// Number of cells in this row.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl Deref for GridRow {
    type Target = GridItem;

    fn deref(&self) -> &GridItem {
        &self.item
    }
}
